// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod cli;
pub mod config;
pub mod enrich;
pub mod export;
pub mod input;
pub mod logger;
pub mod registry;
pub mod search;
pub mod sector;
pub mod web_sector;

pub use enrich::{Enricher, EnrichmentResult, RowStatus};
pub use sector::{Confidence, SectorCatalog};

//! End-to-end pipeline tests against mocked registry, search, and site servers

mod common;

use common::wiremock_helpers::{
    mock_company_site, mock_search_provider, mock_search_provider_no_results,
    mount_registry_empty, mount_registry_match, registry_record,
};
use sirenrich::enrich::{Enricher, UNIDENTIFIED, UNKNOWN};
use sirenrich::{Confidence, RowStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_email_input_classified_by_naf_code() {
    // "contact@acme.fr" normalizes to "acme"; the registry's 6202Z code is a
    // consulting prefix, so the web fallback never runs.
    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "acme",
        registry_record("ACME CONSEIL", "123456789", Some("62.02Z"), "75008"),
    )
    .await;

    let search = mock_search_provider_no_results().await;
    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("contact@acme.fr").await;

    assert_eq!(row.status, RowStatus::Success);
    assert_eq!(row.input, "contact@acme.fr");
    assert_eq!(row.official_name, "ACME CONSEIL");
    assert_eq!(row.sector, "Consulting / IT Services");
    assert_eq!(row.confidence, Confidence::High);
    assert_eq!(row.region, "Dep. 75");
    assert!(row.directory_link.ends_with("/123456789"));
    assert!(row.error.is_none());
}

#[tokio::test]
async fn test_blacklisted_code_falls_back_to_link_signature() {
    // 6420Z is a holding code: the code path is skipped even though it has a
    // matching Finance prefix, and the github link on the site decides Tech.
    let site = mock_company_site(
        r#"<html><body>
            <h1>HoldCo</h1>
            <a href="https://github.com/holdco/platform">Our code</a>
        </body></html>"#,
    )
    .await;
    let search = mock_search_provider(&site.uri()).await;

    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "HoldCo",
        registry_record("HOLDCO SAS", "987654321", Some("6420Z"), "69001"),
    )
    .await;

    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("HoldCo").await;

    assert_eq!(row.status, RowStatus::Success);
    assert_eq!(row.sector, "Tech / Software");
    assert_eq!(row.confidence, Confidence::Medium);
}

#[tokio::test]
async fn test_missing_code_falls_back_to_keyword_scoring() {
    let site = mock_company_site(
        r#"<html><head>
            <title>Clinique Saint-Jean</title>
            <meta name="description" content="Soins et santé pour tous les patients">
        </head><body><h1>Votre clinique</h1></body></html>"#,
    )
    .await;
    let search = mock_search_provider(&site.uri()).await;

    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "SaintJean",
        registry_record("CLINIQUE SAINT-JEAN", "111222333", None, "34000"),
    )
    .await;

    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("SaintJean").await;

    assert_eq!(row.sector, "Healthcare / Medical Services");
    assert_eq!(row.confidence, Confidence::Medium);
}

#[tokio::test]
async fn test_empty_registry_result_is_row_failure() {
    let registry = MockServer::start().await;
    mount_registry_empty(&registry, "GhostCorp").await;

    let search = mock_search_provider_no_results().await;
    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("GhostCorp").await;

    assert_eq!(row.status, RowStatus::Failure);
    assert_eq!(row.official_name, UNKNOWN);
    assert_eq!(row.sector, UNKNOWN);
    assert_eq!(row.confidence, Confidence::Low);
    assert!(row.error.as_deref().unwrap().contains("GhostCorp"));
}

#[tokio::test]
async fn test_registry_error_status_is_row_failure() {
    let registry = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&registry)
        .await;

    let search = mock_search_provider_no_results().await;
    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("AnyCorp").await;

    assert_eq!(row.status, RowStatus::Failure);
    assert!(row.error.is_some());
}

#[tokio::test]
async fn test_no_web_signal_degrades_to_unidentified() {
    // Registry succeeds with no NAF code; the site has neither recognized
    // links nor scoring keywords. The row stays a success, just low tier.
    let site = mock_company_site(
        "<html><head><title>QuietFirm</title></head><body><p>Bienvenue</p></body></html>",
    )
    .await;
    let search = mock_search_provider(&site.uri()).await;

    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "QuietFirm",
        registry_record("QUIETFIRM", "444555666", None, "33000"),
    )
    .await;

    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("QuietFirm").await;

    assert_eq!(row.status, RowStatus::Success);
    assert_eq!(row.sector, UNIDENTIFIED);
    assert_eq!(row.confidence, Confidence::Low);
    assert!(row.error.is_none());
}

#[tokio::test]
async fn test_search_provider_failure_degrades_not_fails() {
    // A blocked search provider during fallback must not turn a successful
    // registry lookup into a failed row.
    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "BlockedCo",
        registry_record("BLOCKEDCO", "777888999", None, "59000"),
    )
    .await;

    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&search)
        .await;

    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("BlockedCo").await;

    assert_eq!(row.status, RowStatus::Success);
    assert_eq!(row.sector, UNIDENTIFIED);
    assert_eq!(row.confidence, Confidence::Low);
}

#[tokio::test]
async fn test_site_fetch_failure_degrades_not_fails() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;
    let search = mock_search_provider(&site.uri()).await;

    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "DownSite",
        registry_record("DOWNSITE", "101010101", None, "75001"),
    )
    .await;

    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("DownSite").await;

    assert_eq!(row.status, RowStatus::Success);
    assert_eq!(row.sector, UNIDENTIFIED);
    assert_eq!(row.confidence, Confidence::Low);
}

#[tokio::test]
async fn test_partial_status_when_record_incomplete() {
    let registry = MockServer::start().await;
    mount_registry_match(
        &registry,
        "NoName",
        serde_json::json!({ "activite_principale": "6202Z" }),
    )
    .await;

    let search = mock_search_provider_no_results().await;
    let config = common::test_config(&registry.uri(), &search.uri());
    let enricher = Enricher::new(&config).unwrap();

    let row = enricher.enrich_one("NoName").await;

    // Name and SIREN are missing but the code still classifies
    assert_eq!(row.status, RowStatus::Partial);
    assert_eq!(row.official_name, UNKNOWN);
    assert_eq!(row.sector, "Consulting / IT Services");
    assert_eq!(row.confidence, Confidence::High);
}

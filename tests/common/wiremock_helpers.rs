use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a registry search response for a given query on an existing server.
///
/// The registry answers GET /search with `q` matching the query and a JSON
/// body holding zero or one best-match records.
pub async fn mount_registry_match(server: &MockServer, query: &str, record: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [record] })),
        )
        .mount(server)
        .await;
}

/// Mount an empty registry result set for a given query
pub async fn mount_registry_empty(server: &MockServer, query: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .mount(server)
        .await;
}

/// Build a registry record JSON value in the shape the live endpoint returns
pub fn registry_record(
    name: &str,
    siren: &str,
    naf_code: Option<&str>,
    postal_code: &str,
) -> serde_json::Value {
    let mut record = serde_json::json!({
        "nom_complet": name,
        "siren": siren,
        "tranche_effectif_salarie": "12",
        "siege": { "code_postal": postal_code }
    });
    if let Some(code) = naf_code {
        record["activite_principale"] = serde_json::Value::String(code.to_string());
    }
    record
}

/// Creates a mock search provider whose first organic result points at `target_url`
pub async fn mock_search_provider(target_url: &str) -> MockServer {
    let server = MockServer::start().await;

    let body = format!(
        r#"<html><body>
            <div class="result">
                <a class="result__a" href="{}">Site officiel</a>
            </div>
        </body></html>"#,
        target_url
    );

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock search provider returning a result page with no hits
pub async fn mock_search_provider_no_results() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div class='no-results'>Aucun résultat</div></body></html>")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server serving a homepage at /
pub async fn mock_company_site(html: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}

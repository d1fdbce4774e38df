//! Servers composed from loaded configuration.

use folio::prelude::*;
use folio_test::TestClient;
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
struct City {
    name: String,
    population: u64,
}

impl Reportable for City {}

fn client_for(config: &FolioConfig) -> TestClient {
    let repository: Arc<dyn Repository<City>> = Arc::new(InMemoryRepository::new(vec![
        City {
            name: "Cluj".to_string(),
            population: 286_598,
        },
        City {
            name: "Iasi".to_string(),
            population: 271_692,
        },
    ]));
    TestClient::new(build_server(config, repository).unwrap())
}

fn body() -> serde_json::Value {
    json!({ "columns": { "name": "City", "population": "Population" } })
}

#[tokio::test]
async fn test_base_path_from_toml() {
    let config = ConfigLoader::new()
        .with_string(
            r#"
                [reports]
                base_path = "/exports"
                default_title = "Cities"
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();

    let client = client_for(&config);

    let response = client.post("/exports/xls/alternative").json(&body()).send().await;
    response
        .assert_document(ExportType::Xls)
        .assert_body_contains(r#"<Worksheet ss:Name="Cities">"#)
        .assert_body_contains(r#"<Data ss:Type="Number">286598</Data>"#);

    client
        .post("/reports/xls")
        .json(&body())
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_body_limit_from_config() {
    let config = ConfigLoader::new()
        .with_string(r#"{"server": {"max_body_bytes": 32}}"#, "json")
        .unwrap()
        .load()
        .unwrap();

    client_for(&config)
        .post("/reports/pdf")
        .json(&body())
        .send()
        .await
        .assert_error(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_default_title_names_the_file() {
    let config = ConfigLoader::new().with_development().load().unwrap();

    client_for(&config)
        .post("/reports/pdf")
        .json(&body())
        .send()
        .await
        .assert_document(ExportType::Pdf)
        .assert_header("content-disposition", "attachment; filename=\"report.pdf\"");
}

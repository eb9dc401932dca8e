//! Integration tests for the HTTP API.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use geodecode::api::{router, AppState, ErrorResponse, HealthResponse};
use geodecode::codes::CodeTable;
use geodecode::pip::RegionStore;
use geodecode::Decoder;
use serde_json::{json, Value};

fn ready_decoder() -> Decoder {
    let dataset = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "desa": "DESA NANGA EMAU",
                "kabupaten": "SINTANG",
                "provinsi": "KALIMANTAN BARAT"
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[111.0, 0.0], [111.1, 0.0], [111.1, 0.1], [111.0, 0.1], [111.0, 0.0]]]
            }
        }]
    });
    let store = RegionStore::from_slice(dataset.to_string().as_bytes()).unwrap();
    let codes = CodeTable::from_pairs([
        ("61", "KALIMANTAN BARAT"),
        ("61.02", "SINTANG"),
        ("61.02.13.2003", "NANGA EMAU"),
    ]);
    Decoder::new(store, codes)
}

fn server(decoder: Decoder) -> TestServer {
    TestServer::new(router(Arc::new(AppState::new(decoder)))).unwrap()
}

#[tokio::test]
async fn test_convert_found() {
    let server = server(ready_decoder());

    let response = server
        .get("/convert")
        .add_query_param("latitude", 0.05)
        .add_query_param("longitude", 111.05)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["code"], "61.02.13.2003");
    assert_eq!(body["province"], json!({"name": "KALIMANTAN BARAT", "code": "61"}));
    assert_eq!(body["district"], json!({"name": "SINTANG", "code": "61.02"}));
    assert_eq!(body["sub_district"], json!({"name": null, "code": "61.02.13"}));
    assert_eq!(
        body["village"],
        json!({"name": "NANGA EMAU", "code": "61.02.13.2003"})
    );
}

#[tokio::test]
async fn test_convert_not_found() {
    let server = server(ready_decoder());

    let response = server
        .get("/convert")
        .add_query_param("latitude", -6.2)
        .add_query_param("longitude", 106.8)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("not found"));
}

#[tokio::test]
async fn test_convert_unready() {
    let server = server(Decoder::unready("boundary file missing"));

    let response = server
        .get("/convert")
        .add_query_param("latitude", 0.05)
        .add_query_param("longitude", 111.05)
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_convert_rejects_bad_params() {
    let server = server(ready_decoder());

    let response = server
        .get("/convert")
        .add_query_param("latitude", "north")
        .add_query_param("longitude", 111.05)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/convert").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_ready() {
    let server = server(ready_decoder());

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert!(body.data_loaded);
    assert_eq!(body.regions, 1);
    assert_eq!(body.codes, 3);
}

#[tokio::test]
async fn test_health_unready() {
    let server = server(Decoder::unready("boundary file missing"));

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert!(!body.data_loaded);
    assert_eq!(body.regions, 0);
}

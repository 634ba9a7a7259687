use reqwest::{header, StatusCode};
use serde_json::json;

use crate::integration_test_helpers::server;

/// Create, read back and rename a customer over http. All writes to the
/// shared store happen in this test since concurrent read-modify-write
/// cycles against the same file can lose updates.
#[tokio::test]
async fn test_create_get_update() {
    let handle = server::start_server();
    let client = handle.rest_client();

    let resp = client
        .post("/api/values")
        .json(&json!({ "id": 1001, "name": "Alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()[header::LOCATION], "/api/values/1001");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "id": 1001, "name": "Alice" }));

    let resp = client.get("/api/values/1001").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "id": 1001, "name": "Alice" }));

    let resp = client
        .put("/api/values/1001")
        .json(&json!({ "id": 1001, "name": "Alicia" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get("/api/values").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert!(body.contains(&json!({ "id": 1001, "name": "Alicia" })));

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&handle.properties().data_file).unwrap()).unwrap();
    assert!(stored["customers"]
        .as_array()
        .unwrap()
        .contains(&json!({ "id": 1001, "name": "Alicia" })));
}

/// Test that unknown ids are reported as not found
#[tokio::test]
async fn test_unknown_customer() {
    let handle = server::start_server();
    let client = handle.rest_client();

    let resp = client.get("/api/values/424242").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put("/api/values/424242")
        .json(&json!({ "id": 424242, "name": "Nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

/// Test that malformed requests are rejected
#[tokio::test]
async fn test_bad_requests() {
    let handle = server::start_server();
    let client = handle.rest_client();

    let resp = client
        .post("/api/values")
        .header(header::CONTENT_TYPE, "application/json")
        .body("null")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message: String = resp.json().await.unwrap();
    assert_eq!(message, "Customer object is null");

    let resp = client
        .post("/api/values")
        .json(&json!({ "id": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.get("/api/values/not-a-number").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

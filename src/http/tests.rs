//! Tests for the HTTP transport module

use super::*;
use crate::types::Method;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> HttpTransport {
    let config = HttpTransportConfig::builder()
        .base_url(server.uri())
        .build();
    HttpTransport::with_config(config).unwrap()
}

// ============================================================================
// RequestOptions Tests
// ============================================================================

#[test]
fn test_request_options_builder() {
    let options = RequestOptions::new()
        .query("page", 1)
        .query("title", "Dune")
        .header("X-Request-Id", "abc123")
        .json(json!({"key": "value"}))
        .timeout(Duration::from_secs(10));

    assert_eq!(options.query.get("page"), Some(&json!(1)));
    assert_eq!(options.query.get("title"), Some(&json!("Dune")));
    assert_eq!(
        options.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert!(options.json.is_some());
    assert_eq!(options.timeout, Some(Duration::from_secs(10)));
}

#[test]
fn test_merged_with_call_options_win() {
    let defaults = RequestOptions::new()
        .header("Accept", "application/ld+json")
        .header("X-Tenant", "default")
        .query("itemsPerPage", 30)
        .timeout(Duration::from_secs(30));

    let call = RequestOptions::new()
        .header("X-Tenant", "acme")
        .query("page", 2);

    let merged = defaults.merged_with(&call);

    assert_eq!(merged.headers["Accept"], "application/ld+json");
    assert_eq!(merged.headers["X-Tenant"], "acme");
    assert_eq!(merged.query["itemsPerPage"], json!(30));
    assert_eq!(merged.query["page"], json!(2));
    assert_eq!(merged.timeout, Some(Duration::from_secs(30)));
    assert!(merged.json.is_none());
}

#[test]
fn test_merged_with_json_override() {
    let defaults = RequestOptions::new().json(json!({"a": 1}));
    let merged = defaults.merged_with(&RequestOptions::new().json(json!({"b": 2})));
    assert_eq!(merged.json, Some(json!({"b": 2})));

    let merged = defaults.merged_with(&RequestOptions::new());
    assert_eq!(merged.json, Some(json!({"a": 1})));
}

// ============================================================================
// Query Encoding Tests
// ============================================================================

#[test_case(json!({"page": 2}), vec![("page", "2")] ; "number")]
#[test_case(json!({"title": "Dune"}), vec![("title", "Dune")] ; "string")]
#[test_case(json!({"exists": true}), vec![("exists", "1")] ; "true")]
#[test_case(json!({"draft": false}), vec![("draft", "0")] ; "false")]
#[test_case(json!({"deleted": null}), vec![] ; "null is dropped")]
#[test_case(json!({"author": {"name": "Doe"}}), vec![("author[name]", "Doe")] ; "nested object")]
#[test_case(json!({"tags": ["a", "b"]}), vec![("tags[]", "a"), ("tags[]", "b")] ; "scalar list")]
#[test_case(
    json!({"order": [{"title": "asc"}]}),
    vec![("order[0][title]", "asc")] ;
    "list of objects"
)]
fn test_encode_query(query: serde_json::Value, expected: Vec<(&str, &str)>) {
    let query = query.as_object().unwrap().clone();
    let expected: Vec<(String, String)> = expected
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(encode_query(&query), expected);
}

// ============================================================================
// Response Tests
// ============================================================================

#[test]
fn test_response_json() {
    let response = Response::new(200, r#"{"token": "abc"}"#);
    let value: serde_json::Value = response.json().unwrap();
    assert_eq!(value["token"], "abc");
}

#[test]
fn test_response_json_empty_body_is_null() {
    let response = Response::new(204, "");
    let value: serde_json::Value = response.json().unwrap();
    assert!(value.is_null());
}

#[test]
fn test_response_json_error_status() {
    let response = Response::new(404, "not found");
    let err = response.json::<serde_json::Value>().unwrap_err();
    assert!(err.is_request_error());
    assert_eq!(err.status(), Some(404));
}

#[test]
fn test_response_json_invalid_body() {
    let response = Response::new(200, "<html>");
    let err = response.json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, crate::Error::Decode { .. }));
}

#[test]
fn test_response_with_header_lowercases() {
    let response = Response::new(200, "").with_header("Content-Type", "application/json");
    assert_eq!(response.headers["content-type"], "application/json");
}

// ============================================================================
// HttpTransport Tests
// ============================================================================

#[test]
fn test_transport_config_default() {
    let config = HttpTransportConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert!(!config.accept_invalid_certs);
    assert!(config.user_agent.starts_with("hydra-client/"));
}

#[tokio::test]
async fn test_transport_get_with_query_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books"))
        .and(query_param("author[name]", "Doe"))
        .and(query_param("page", "2"))
        .and(header("X-Tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let options = RequestOptions::new()
        .header("X-Tenant", "acme")
        .query("author", json!({"name": "Doe"}))
        .query("page", 2);

    let response = transport
        .send(Method::GET, "/books", &options)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap()["ok"], true);
}

#[tokio::test]
async fn test_transport_post_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/books"))
        .and(body_json(json!({"title": "Dune"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let options = RequestOptions::new().json(json!({"title": "Dune"}));
    let response = transport
        .send(Method::POST, "books", &options)
        .await
        .unwrap();

    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn test_transport_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("Accept", "application/ld+json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpTransportConfig::builder()
        .base_url(format!("{}/", mock_server.uri()))
        .header("Accept", "application/ld+json")
        .build();
    let transport = HttpTransport::with_config(config).unwrap();

    let response = transport
        .send(Method::GET, "/secure", &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_transport_error_status_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/books/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let response = transport
        .send(Method::DELETE, "/books/1", &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "gone");
}

#[tokio::test]
async fn test_transport_connection_failure_is_request_error() {
    let config = HttpTransportConfig::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build();
    let transport = HttpTransport::with_config(config).unwrap();

    let err = transport
        .send(Method::GET, "/books", &RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_request_error());
}

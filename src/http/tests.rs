//! Tests for HTTP module

use super::*;
use crate::error::Error;
use crate::pagination::{KeySource, OffsetSource, PageNumberSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Decode Tests
// ============================================================================

#[test]
fn test_decode_whole_body_array() {
    let page = decode_page(r#"[{"id": 1}, {"id": 2}]"#, None).unwrap().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[1]["id"], 2);
}

#[test]
fn test_decode_with_path() {
    let body = r#"{"data": {"items": [1, 2, 3]}, "next": "abc"}"#;
    let page = decode_page(body, Some("data.items")).unwrap().unwrap();
    assert_eq!(page, vec![json!(1), json!(2), json!(3)]);

    let page = decode_page(body, Some("$.data.items")).unwrap().unwrap();
    assert_eq!(page.len(), 3);
}

#[test]
fn test_decode_array_index_in_path() {
    let body = r#"{"results": [{"rows": [1, 2]}]}"#;
    let page = decode_page(body, Some("results.0.rows")).unwrap().unwrap();
    assert_eq!(page.len(), 2);
}

#[test]
fn test_decode_absent() {
    assert!(decode_page("", None).unwrap().is_none());
    assert!(decode_page("null", None).unwrap().is_none());
    assert!(decode_page(r#"{"data": null}"#, Some("data")).unwrap().is_none());
    assert!(decode_page(r#"{"other": []}"#, Some("data")).unwrap().is_none());
}

#[test]
fn test_decode_errors() {
    let err = decode_page("{not json", None).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));

    let err = decode_page(r#"{"data": 5}"#, Some("data")).unwrap_err();
    assert!(err.to_string().contains("found number"));
}

#[test]
fn test_invalid_url() {
    let err = HttpSource::new(HttpSourceConfig::new("not a url")).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn test_config_defaults_from_yaml() {
    let config: HttpSourceConfig = serde_yaml::from_str("url: http://localhost/items").unwrap();
    assert_eq!(config.offset_param, "offset");
    assert_eq!(config.limit_param, "limit");
    assert_eq!(config.page_param, "page");
    assert_eq!(config.key_param, "cursor");
    assert_eq!(config.timeout_secs, 30);
    assert!(config.page_size.is_none());
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_offset_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("skip", "20"))
        .and(query_param("take", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 21}, {"id": 22}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = HttpSourceConfig::new(format!("{}/items", server.uri())).with_records_path("items");
    config.offset_param = "skip".into();
    config.limit_param = "take".into();
    let source = HttpSource::new(config).unwrap();

    let page = OffsetSource::load_next(&source, 20, 10).await.unwrap().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], 21);
}

#[tokio::test]
async fn test_page_number_request_with_page_size_and_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "3"))
        .and(query_param("limit", "25"))
        .and(header("Authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpSourceConfig::new(format!("{}/items", server.uri()))
        .with_page_size(25)
        .with_header("Authorization", "Bearer token");
    let source = HttpSource::new(config).unwrap();

    let page = PageNumberSource::load_initial(&source, 3).await.unwrap().unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn test_key_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["c", "d"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a", "b"])))
        .mount(&server)
        .await;

    let source = HttpSource::new(HttpSourceConfig::new(format!("{}/feed", server.uri()))).unwrap();

    let first = KeySource::load_initial(&source).await.unwrap().unwrap();
    assert_eq!(first, vec![json!("a"), json!("b")]);

    let next = KeySource::load_next(&source, Some("abc")).await.unwrap().unwrap();
    assert_eq!(next, vec![json!("c"), json!("d")]);

    let again = KeySource::load_next(&source, None).await.unwrap().unwrap();
    assert_eq!(again, first);
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let source = HttpSource::new(HttpSourceConfig::new(format!("{}/items", server.uri()))).unwrap();
    let err = OffsetSource::load_initial(&source, 0, 10).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, ref body } if body == "unavailable"));
}

#[tokio::test]
async fn test_existing_query_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("sort", "asc"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let source =
        HttpSource::new(HttpSourceConfig::new(format!("{}/items?sort=asc", server.uri()))).unwrap();
    let page = OffsetSource::load_initial(&source, 0, 10).await.unwrap();
    assert_eq!(page, Some(vec![]));
}

#[tokio::test]
async fn test_next_key_is_captured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1, 2],
            "meta": {"next": "p2"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [3],
            "meta": {"next": null}
        })))
        .mount(&server)
        .await;

    let config = HttpSourceConfig::new(format!("{}/feed", server.uri()))
        .with_records_path("items")
        .with_next_key_path("meta.next");
    let source = HttpSource::new(config).unwrap();
    assert_eq!(source.last_next_key(), None);

    KeySource::load_initial(&source).await.unwrap();
    assert_eq!(source.last_next_key().as_deref(), Some("p2"));

    let page = KeySource::load_next(&source, Some("p2")).await.unwrap().unwrap();
    assert_eq!(page, vec![json!(3)]);
    assert_eq!(source.last_next_key(), None);
}

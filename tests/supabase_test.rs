//! Integration tests for [`SupabaseClient`] against a mocked PostgREST gateway.
#![cfg(feature = "supabase")]

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hausaufgaben::backend::SupabaseClient;
use hausaufgaben::{DocumentBackend, DocumentRef, FetchOutcome, HausaufgabenError};

fn table() -> DocumentRef {
    DocumentRef::table("Hausaufgaben")
}

#[tokio::test]
async fn fetch_sends_key_and_singular_accept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Hausaufgaben"))
        .and(query_param("select", "*"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "montag": "Mathe S. 12",
            "dienstag": "Kunst: Plakat"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "anon-key").unwrap();
    let outcome = client.fetch_document(&table()).await.unwrap();

    let FetchOutcome::Found(doc) = outcome else {
        panic!("expected a document, got {outcome:?}");
    };
    assert_eq!(doc["montag"], "Mathe S. 12");
    let keys: Vec<_> = doc.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "montag", "dienstag"]);
}

#[tokio::test]
async fn trailing_slash_in_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Hausaufgaben"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = SupabaseClient::new(format!("{}/", server.uri()), "k").unwrap();
    assert!(client.fetch_document(&table()).await.is_ok());
}

#[tokio::test]
async fn zero_rows_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Hausaufgaben"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "k").unwrap();
    let outcome = client.fetch_document(&table()).await.unwrap();
    assert_eq!(outcome, FetchOutcome::NotFound);
}

#[tokio::test]
async fn multiple_rows_is_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Hausaufgaben"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 3 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "k").unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();

    assert_eq!(err.code(), Some("PGRST116"));
    assert!(err.to_string().contains("multiple (or no) rows"));
}

#[tokio::test]
async fn missing_table_keeps_postgrest_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Hausaufgaben"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "42P01",
            "details": null,
            "hint": null,
            "message": "relation \"public.Hausaufgaben\" does not exist"
        })))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "k").unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();

    match err {
        HausaufgabenError::Backend {
            status,
            message,
            code,
        } => {
            assert_eq!(status, 404);
            assert!(message.contains("does not exist"));
            assert_eq!(code.as_deref(), Some("42P01"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn bare_401_is_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "wrong").unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();
    assert!(matches!(err, HausaufgabenError::AuthenticationFailed));
}

#[tokio::test]
async fn server_error_without_body_uses_status_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(server.uri(), "k").unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();

    assert!(err.is_backend());
    assert!(err.code().is_none());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn unreachable_host_is_http_error() {
    // Nothing listens on the discard port
    let client = SupabaseClient::new("http://127.0.0.1:9", "k").unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();
    assert!(matches!(err, HausaufgabenError::Http(_)));
}

#[tokio::test]
async fn slow_gateway_hits_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"a": 1}))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = SupabaseClient::with_timeout(
        server.uri(),
        "k",
        Some(std::time::Duration::from_millis(100)),
    )
    .unwrap();
    let err = client.fetch_document(&table()).await.unwrap_err();
    assert!(matches!(err, HausaufgabenError::Http(_)));
}

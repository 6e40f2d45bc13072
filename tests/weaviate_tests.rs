//! HTTP-level tests for the Weaviate backend against a local mock server.

use ragpipe::weaviate::{WeaviateConfig, WeaviateVectorStore};
use ragpipe::{Document, Query, RagError, VectorStore};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> WeaviateVectorStore {
    WeaviateVectorStore::new(
        WeaviateConfig::builder().base_url(server.uri()).build().unwrap(),
    )
}

fn document() -> Document {
    Document {
        id: "c7f2a1d4-0000-4000-8000-000000000001".to_string(),
        content: "Paris is the capital of France.".to_string(),
        embedding: vec![0.1, 0.2],
        topic: Some("Geography".to_string()),
    }
}

async fn mount_schema_exists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/schema/Document"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "class": "Document" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn bootstrap_creates_class_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/Document"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/schema"))
        .and(body_partial_json(json!({
            "class": "Document",
            "vectorIndexConfig": { "distance": "cosine" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    store_for(&server).upsert(&document()).await.unwrap();
}

#[tokio::test]
async fn bootstrap_skips_creation_when_class_exists() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/schema"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    store_for(&server).upsert(&document()).await.unwrap();
}

#[tokio::test]
async fn bootstrap_swallows_concurrent_creation() {
    // Describe misses, create races with another cold start and returns 422.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/Document"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/schema"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "error": [{ "message": "class already exists" }] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    store_for(&server).upsert(&document()).await.unwrap();
}

#[tokio::test]
async fn bootstrap_runs_once_per_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/Document"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.upsert(&document()).await.unwrap();
    store.upsert(&document()).await.unwrap();
}

#[tokio::test]
async fn upsert_sends_object_with_vector() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .and(body_partial_json(json!({
            "id": "c7f2a1d4-0000-4000-8000-000000000001",
            "class": "Document",
            "properties": {
                "content": "Paris is the capital of France.",
                "metadata": "Geography",
            },
            "vector": [0.1, 0.2],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).upsert(&document()).await.unwrap();
}

#[tokio::test]
async fn query_parses_matches_in_order() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("nearText"))
        .and(body_string_contains("certainty: 0.7"))
        .and(body_string_contains("limit: 3"))
        .and(body_string_contains("valueText: \\\"Geography\\\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Document": [
                { "content": "Paris is the capital of France.",
                  "metadata": "Geography",
                  "_additional": { "certainty": 0.93, "id": "a" } },
                { "content": "France is in Europe.",
                  "metadata": "Geography",
                  "_additional": { "certainty": 0.74, "id": "b" } },
            ] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let matches = store_for(&server)
        .query(&Query::new("What is the capital of France?").with_topic("Geography"), Some(3))
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].content, "Paris is the capital of France.");
    assert_eq!(matches[0].certainty, Some(0.93));
    assert_eq!(matches[1].id.as_deref(), Some("b"));
}

#[tokio::test]
async fn query_without_topic_has_no_filter() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Document": [] } }
        })))
        .mount(&server)
        .await;

    let matches = store_for(&server).query(&Query::new("anything"), None).await.unwrap();

    assert!(matches.is_empty());
    let requests = server.received_requests().await.unwrap();
    let graphql = requests.iter().find(|r| r.url.path() == "/v1/graphql").unwrap();
    let body = String::from_utf8_lossy(&graphql.body);
    assert!(!body.contains("where:"));
    assert!(body.contains("limit: 10"));
}

#[tokio::test]
async fn graphql_errors_become_store_errors() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "no such class" }]
        })))
        .mount(&server)
        .await;

    let err = store_for(&server).query(&Query::new("q"), Some(3)).await.unwrap_err();

    assert!(matches!(err, RagError::VectorStore { .. }));
    assert!(err.to_string().contains("no such class"));
}

#[tokio::test]
async fn clear_all_deletes_every_listed_id() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Document": [
                { "_additional": { "id": "a" } },
                { "_additional": { "id": "b" } },
            ] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/objects/Document/a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/objects/Document/b"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).clear_all().await.unwrap();
}

#[tokio::test]
async fn clear_all_on_empty_store_issues_no_deletes() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Document": [] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.clear_all().await.unwrap();
    store.clear_all().await.unwrap();
}

#[tokio::test]
async fn clear_all_partial_failure_reports_progress() {
    let server = MockServer::start().await;
    mount_schema_exists(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Document": [
                { "_additional": { "id": "a" } },
                { "_additional": { "id": "b" } },
            ] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/objects/Document/a"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/objects/Document/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = store_for(&server).clear_all().await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("2 of 2 deletions"));
    assert!(message.contains("500"));
}

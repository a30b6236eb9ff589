//! HTTP-level tests: routing, auth rejection, CORS, and the process
//! endpoint driven end to end over a real listener.

mod common;

use std::sync::Arc;

use lexlens_backend::app::{create_app, AppState};
use lexlens_backend::auth::JwksCache;
use lexlens_backend::config::{Environment, Settings};

use common::{arc, FakeObjectStore, RecordingCorpus, RecordingStore, Reply, ScriptedModel, INSIGHTS_JSON};

fn test_settings() -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        project_id: "lexlens-test".to_string(),
        region: "us-central1".to_string(),
        // Unreachable on purpose: verification must fail closed.
        identity_jwks_url: "http://127.0.0.1:1/jwks".to_string(),
        identity_issuer: "https://securetoken.example.com/lexlens-test".to_string(),
        identity_audience: "lexlens-test".to_string(),
        jwks_cache_ttl_seconds: 60,
        model_api_url: "http://127.0.0.1:1".to_string(),
        model_api_key: "unused".to_string(),
        model_name: "gemini-2.5-flash".to_string(),
        model_timeout_seconds: 5,
        corpus_api_url: "http://127.0.0.1:1".to_string(),
        corpus_id: "corpus-test".to_string(),
        storage_api_url: "http://127.0.0.1:1".to_string(),
        docstore_api_url: "http://127.0.0.1:1".to_string(),
        google_access_token: "unused".to_string(),
        service_timeout_seconds: 5,
    }
}

fn test_state(
    objects: FakeObjectStore,
    replies: Vec<Reply>,
    corpus: RecordingCorpus,
) -> Arc<AppState> {
    let settings = test_settings();
    let jwks = JwksCache::new(
        settings.identity_jwks_url.clone(),
        settings.identity_issuer.clone(),
        settings.identity_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    );
    AppState::new(
        settings,
        jwks,
        arc(objects),
        arc(RecordingStore::default()),
        arc(ScriptedModel::with_replies(replies)),
        arc(corpus),
    )
}

async fn spawn_app(state: Arc<AppState>) -> String {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_is_public_and_ok() {
    let base = spawn_app(test_state(FakeObjectStore::default(), vec![], RecordingCorpus::default()))
        .await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn query_without_a_token_is_unauthorized() {
    let base = spawn_app(test_state(FakeObjectStore::default(), vec![], RecordingCorpus::default()))
        .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/query"))
        .json(&serde_json::json!({ "query": "what is the notice period?", "docId": "doc-9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn query_with_an_invalid_token_is_unauthorized() {
    let base = spawn_app(test_state(FakeObjectStore::default(), vec![], RecordingCorpus::default()))
        .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/query"))
        .header("Authorization", "Bearer not-a-jwt")
        .json(&serde_json::json!({ "query": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let base = spawn_app(test_state(FakeObjectStore::default(), vec![], RecordingCorpus::default()))
        .await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/query"))
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn process_completes_a_text_upload() {
    let state = test_state(
        FakeObjectStore::with_blob("uploads", "user-1/doc-9/terms.txt", b"This Agreement..."),
        vec![Reply::Text("YES"), Reply::Text(INSIGHTS_JSON)],
        RecordingCorpus::default(),
    );
    let base = spawn_app(state).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .json(&serde_json::json!({
            "bucket": "uploads",
            "filePath": "user-1/doc-9/terms.txt",
            "mimeType": "text/plain",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "COMPLETED");
}

#[tokio::test]
async fn process_rejects_a_malformed_path() {
    let base = spawn_app(test_state(FakeObjectStore::default(), vec![], RecordingCorpus::default()))
        .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .json(&serde_json::json!({
            "bucket": "uploads",
            "filePath": "onlyonepart",
            "mimeType": "text/plain",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn process_refuses_a_document_already_in_flight() {
    let state = test_state(
        FakeObjectStore::with_blob("uploads", "user-1/doc-9/terms.txt", b"text"),
        vec![],
        RecordingCorpus::default(),
    );
    let _held = state.active.try_acquire("user-1", "doc-9").unwrap();
    let base = spawn_app(state.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .json(&serde_json::json!({
            "bucket": "uploads",
            "filePath": "user-1/doc-9/terms.txt",
            "mimeType": "text/plain",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn process_failure_surfaces_a_500_with_the_stage_message() {
    let state = test_state(
        FakeObjectStore::with_blob("uploads", "user-1/doc-9/terms.txt", b"This Agreement..."),
        vec![Reply::Fail("model service returned 503")],
        RecordingCorpus::default(),
    );
    let base = spawn_app(state).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .json(&serde_json::json!({
            "bucket": "uploads",
            "filePath": "user-1/doc-9/terms.txt",
            "mimeType": "text/plain",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "PROCESSING_FAILED");
    assert!(body["message"].as_str().unwrap().contains("model service"));
}

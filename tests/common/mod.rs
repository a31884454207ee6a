//! Shared fixtures: a fake OpenAI-compatible provider and a small dataset.

#![allow(dead_code)]

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const API_KEY_VAR: &str = "UMKM_RAG_IT_API_KEY";
pub const API_KEY: &str = "test-key";

pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        if client.get(&url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("server on port {} did not come up", port);
}

/// Keyword axes: kuliner, kerajinan, jasa, other.
fn embed_one(text: &str) -> Vec<f32> {
    let t = text.to_lowercase();
    if t.contains("kuliner") || t.contains("makan") || t.contains("bakso") {
        vec![1.0, 0.0, 0.0, 0.0]
    } else if t.contains("batik") || t.contains("kerajinan") {
        vec![0.0, 1.0, 0.0, 0.0]
    } else if t.contains("jasa") || t.contains("servis") {
        vec![0.0, 0.0, 1.0, 0.0]
    } else {
        vec![0.0, 0.0, 0.0, 1.0]
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

async fn fake_embeddings(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let inputs: Vec<String> = body["input"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let data: Vec<Value> = inputs
        .iter()
        .enumerate()
        .map(|(i, text)| json!({ "index": i, "embedding": embed_one(text) }))
        .collect();
    (StatusCode::OK, Json(json!({ "data": data })))
}

/// Answers with the names found in the prompt's context, so tests can see
/// which records were retrieved.
async fn fake_chat(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or("");
    let names: Vec<&str> = prompt
        .lines()
        .filter_map(|l| l.strip_prefix("name: "))
        .collect();
    let answer = format!("Berdasarkan data: {}", names.join(", "));
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": answer } }]
        })),
    )
}

/// Spawn the fake provider; returns its `/v1` base URL.
pub async fn spawn_fake_provider() -> String {
    let app = Router::new()
        .route("/v1/embeddings", post(fake_embeddings))
        .route("/v1/chat/completions", post(fake_chat));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}/v1", addr)
}

pub fn write_dataset(dir: &Path) -> PathBuf {
    let records = json!([
        { "id": 1, "name": "Warung Bu Sri", "category": "Kuliner", "city": "Surabaya", "province": "Jawa Timur" },
        { "id": 2, "name": "Batik Lestari", "category": "Kerajinan", "city": "Solo", "product": "Batik tulis" },
        { "id": 3, "name": "Bakso Pak Kumis", "category": "Kuliner", "city": "Malang" },
        { "id": 4, "name": "Servis Laptop Jaya", "category": "Jasa", "city": "Bandung" },
        { "omzet_tahunan": 120000000, "pemilik": "Anonim" }
    ]);
    let path = dir.join("umkm.json");
    std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();
    path
}

/// Write a config pointing both providers at `provider_url`.
pub fn write_config(tmp: &TempDir, provider_url: &str, bind: &str) -> PathBuf {
    let dataset = write_dataset(tmp.path());
    let content = format!(
        r#"
[dataset]
path = "{dataset}"

[embedding]
provider = "openai"
model = "fake-embedding"
dims = 4
url = "{url}"
api_key_env = "{key_var}"
batch_size = 2
max_retries = 0

[llm]
provider = "openai"
model = "fake-chat"
url = "{url}"
api_key_env = "{key_var}"
temperature = 0.0

[retrieval]
top_k = 2

[server]
bind = "{bind}"
"#,
        dataset = dataset.display(),
        url = provider_url,
        key_var = API_KEY_VAR,
        bind = bind,
    );
    let path = tmp.path().join("umkm.toml");
    std::fs::write(&path, content).unwrap();
    path
}

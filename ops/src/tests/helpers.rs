use serde_json::Value;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::N8nConfig;
use crate::n8n::{N8nClient, RetryPolicy};

/// Write `value` as pretty JSON to `root/relative`, creating parent directories.
pub fn write_json(root: &Path, relative: &str, value: &Value) -> PathBuf {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&target, serde_json::to_string_pretty(value).expect("serializable"))
        .expect("Failed to write fixture");
    target
}

pub fn write_raw(root: &Path, relative: &str, content: &str) -> PathBuf {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(&target, content).expect("Failed to write fixture");
    target
}

/// Client pointed at the mock server, retrying without delays.
pub fn client_for(server: &MockServer, api_key: Option<&str>) -> N8nClient {
    let config = N8nConfig {
        url: server.uri(),
        api_key: api_key.map(str::to_string),
    };
    N8nClient::new(&config)
        .expect("Failed to build client")
        .with_retry_policy(RetryPolicy::immediate())
}

pub async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(server)
        .await;
}

// Database test helpers
pub async fn count_table_rows(pool: &sqlx::PgPool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) as count FROM {}", table);
    sqlx::query_scalar::<_, i64>(&query)
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

// Common test utilities shared across the binary tests
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init()
            .ok();
    });
}

pub const STATE_MACHINE_NODES: &[&str] = &[
    "Get Conversation State",
    "Transition State",
    "Requires AI?",
    "Get Template Response",
    "Needs Available Options?",
    "Get Available Options",
    "Needs Dynamic Data?",
    "Get Services List",
    "Merge Template + Data",
    "Use Template Directly",
    "Service Selected?",
    "Get Selected Service",
    "Save Service Selection",
    "Get Professionals for Service",
    "Format Professionals List",
    "Normalize Message Text",
];

pub const AI_HANDLER_NODES: &[&str] = &[
    "WhatsApp Webhook",
    "Load Tenant Config",
    "Parse Webhook Data",
    "Message Type Switch",
    "Process Audio",
    "Process Image",
    "Intent Classifier",
    "Check FAQ Cache",
    "Merge FAQ Result",
    "Needs AI?",
    "Build Prompt with Catalog",
    "Patient Assistant Agent",
    "OpenRouter Chat Model",
    "Postgres Chat Memory",
    "No-AI Router",
    "Use FAQ Answer",
    "Resolve Template",
    "Use Template Answer",
    "Format Message (Code)",
    "Send WhatsApp Response",
    "Update FAQ Cache",
    "Human Escalation Tool",
];

pub fn handler(name: &str, prefix: &str, nodes: &[&str]) -> Value {
    let nodes: Vec<Value> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            json!({
                "id": format!("{}-{}", prefix, i),
                "name": node,
                "type": "n8n-nodes-base.code",
                "typeVersion": 2,
                "position": [0, 0],
                "parameters": {"jsCode": "return items;"},
                "credentials": {"postgres": {"id": "XCqM1aDUIHVebSzp", "name": "Postgres"}}
            })
        })
        .collect();
    json!({
        "name": name,
        "nodes": nodes,
        "connections": {},
        "meta": {"instanceId": "test-instance"}
    })
}

pub fn write_json(root: &Path, relative: &str, value: &Value) {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(target, serde_json::to_string_pretty(value).expect("serializable"))
        .expect("Failed to write fixture");
}

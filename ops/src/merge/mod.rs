//! Merge the state-machine and AI WhatsApp handlers into one workflow.
//!
//! The state machine supplies the control-flow backbone and the template
//! branch; the AI handler supplies the entry section, the FAQ/template/agent
//! defence and the output nodes. Nodes are copied by name onto a fixed
//! canvas and rewired from a fixed connection table.

pub mod connections;
pub mod credentials;
pub mod rewrites;

use clinic_shared::{Position, STICKY_NOTE_TYPE, Workflow, WorkflowNode, WorkflowSettings};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OpsError, OpsResult};
use crate::ui;

pub const MERGED_NAME: &str = "01 - WhatsApp Main Handler";
pub const MERGED_ID: &str = "merged-whatsapp-main";
pub const DEFAULT_STATE_MACHINE_FILE: &str = "01-whatsapp-optimized-state-machine.json";
pub const DEFAULT_AI_HANDLER_FILE: &str = "01-whatsapp-patient-handler-optimized.json";
pub const DEFAULT_OUTPUT_FILE: &str = "01-whatsapp-main.json";

const TAGS: &[&str] = &["production", "main", "multi-tenant", "state-machine", "optimized"];

/// Key layout of the written document.
const DOCUMENT_KEYS: &[&str] = &[
    "name",
    "nodes",
    "pinData",
    "connections",
    "active",
    "settings",
    "versionId",
    "meta",
    "id",
    "tags",
];
const SETTINGS_KEYS: &[&str] = &["executionOrder", "availableInMCP", "errorWorkflow"];

/// Which input document a node is copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    StateMachine,
    AiHandler,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Self::StateMachine => "state-machine handler",
            Self::AiHandler => "AI handler",
        }
    }
}

/// Nodes that must exist in each source, in placement order.
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
];

const TOOL_START_X: i64 = 3120;
const TOOL_STEP_X: i64 = 128;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accumulates the merged node list.
struct Canvas<'a> {
    state_machine: &'a Workflow,
    ai_handler: &'a Workflow,
    nodes: Vec<WorkflowNode>,
}

impl<'a> Canvas<'a> {
    fn new(state_machine: &'a Workflow, ai_handler: &'a Workflow) -> Self {
        Self {
            state_machine,
            ai_handler,
            nodes: Vec::new(),
        }
    }

    fn document(&self, source: Source) -> &'a Workflow {
        match source {
            Source::StateMachine => self.state_machine,
            Source::AiHandler => self.ai_handler,
        }
    }

    /// Copy a required node to `(x, y)`.
    fn place(&mut self, source: Source, name: &str, x: i64, y: i64) -> OpsResult<&mut WorkflowNode> {
        self.try_place(source, name, x, y).ok_or_else(|| {
            OpsError::Workflow(format!("node '{}' not found in {}", name, source.label()))
        })
    }

    /// Copy a node to `(x, y)` if the source has it.
    ///
    /// State-machine copies get a fresh id so they cannot collide with ids
    /// from the AI handler.
    fn try_place(&mut self, source: Source, name: &str, x: i64, y: i64) -> Option<&mut WorkflowNode> {
        let mut node = self.document(source).node(name)?.clone();
        if source == Source::StateMachine {
            node.id = Some(new_id());
        }
        node.position = Some(Position::new(x, y));
        debug!(node = name, source = source.label(), x, y, "placing node");

        let index = self.nodes.len();
        self.nodes.push(node);
        Some(&mut self.nodes[index])
    }

    fn push(&mut self, node: WorkflowNode) {
        self.nodes.push(node);
    }
}

/// Report every required node missing from its source at once.
pub fn check_sources(state_machine: &Workflow, ai_handler: &Workflow) -> OpsResult<()> {
    let missing: Vec<String> = [
        (Source::StateMachine, state_machine, STATE_MACHINE_NODES),
        (Source::AiHandler, ai_handler, AI_HANDLER_NODES),
    ]
    .into_iter()
    .flat_map(|(source, doc, names)| {
        names
            .iter()
            .filter(move |name| doc.node(name).is_none())
            .map(move |name| format!("'{}' ({})", name, source.label()))
    })
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(OpsError::Workflow(format!(
            "required nodes missing: {}",
            missing.join(", ")
        )))
    }
}

/// Build the merged workflow document.
pub fn merge_handlers(state_machine: &Workflow, ai_handler: &Workflow) -> OpsResult<Workflow> {
    use Source::{AiHandler as Ai, StateMachine as Sm};

    check_sources(state_machine, ai_handler)?;
    let mut canvas = Canvas::new(state_machine, ai_handler);

    let webhook = canvas.place(Ai, "WhatsApp Webhook", 0, 400)?;
    webhook.set_param("path", rewrites::WEBHOOK_PATH);
    webhook.webhook_id = Some(rewrites::WEBHOOK_ID.to_string());
    canvas.place(Ai, "Load Tenant Config", 240, 400)?;
    canvas.place(Ai, "Parse Webhook Data", 480, 400)?;
    canvas.place(Ai, "Message Type Switch", 720, 400)?;
    canvas.place(Ai, "Process Audio", 960, 600)?;
    canvas.place(Ai, "Process Image", 960, 250)?;

    canvas
        .place(Sm, "Get Conversation State", 1200, 400)?
        .set_param("query", rewrites::GET_CONVERSATION_STATE);
    canvas
        .place(Sm, "Transition State", 1440, 400)?
        .set_param("query", rewrites::TRANSITION_STATE);
    canvas.place(Sm, "Requires AI?", 1680, 300)?;

    canvas.place(Ai, "Intent Classifier", 1920, 100)?;
    canvas.place(Ai, "Check FAQ Cache", 2160, 100)?;
    canvas.place(Ai, "Merge FAQ Result", 2400, 100)?;
    canvas.place(Ai, "Needs AI?", 2640, 100)?;
    canvas.place(Ai, "Build Prompt with Catalog", 2880, -100)?;
    canvas.place(Ai, connections::AGENT, 3360, -100)?;
    canvas.place(Ai, "OpenRouter Chat Model", 2880, 100)?;
    canvas.place(Ai, "Postgres Chat Memory", 3000, 100)?;

    let mut tools = Vec::new();
    let mut tool_x = TOOL_START_X;
    for &tool in connections::AGENT_TOOLS {
        if canvas.try_place(Ai, tool, tool_x, 100).is_some() {
            tool_x += TOOL_STEP_X;
            tools.push(tool);
        }
    }

    canvas.place(Ai, "No-AI Router", 2880, 300)?;
    canvas.place(Ai, "Use FAQ Answer", 3360, 500)?;
    canvas.place(Ai, "Resolve Template", 3120, 400)?;
    canvas.place(Ai, "Use Template Answer", 3360, 400)?;

    canvas
        .place(Sm, "Get Template Response", 1920, 500)?
        .set_param("query", rewrites::GET_TEMPLATE_RESPONSE);
    canvas.place(Sm, "Needs Available Options?", 2160, 500)?;
    canvas.place(Sm, "Get Available Options", 2400, 600)?;
    canvas.place(Sm, "Needs Dynamic Data?", 2640, 500)?;
    canvas
        .place(Sm, "Get Services List", 2880, 500)?
        .set_param("query", rewrites::GET_SERVICES_LIST);
    let merge_data = canvas.place(Sm, "Merge Template + Data", 3120, 700)?;
    if let Some(code) = merge_data.param_str("jsCode") {
        let rewritten = rewrites::rewrite_merge_template_js(code);
        merge_data.set_param("jsCode", rewritten);
    }
    canvas.place(Sm, "Use Template Directly", 3360, 600)?;

    canvas.place(Sm, "Service Selected?", 1680, 700)?;
    canvas
        .place(Sm, "Get Selected Service", 1920, 700)?
        .set_param("query", rewrites::GET_SELECTED_SERVICE);
    canvas
        .place(Sm, "Save Service Selection", 2160, 700)?
        .set_param("query", rewrites::SAVE_SERVICE_SELECTION);
    canvas.place(Sm, "Get Professionals for Service", 2400, 700)?;
    canvas.place(Sm, "Format Professionals List", 2640, 700)?;

    canvas.place(Ai, "Format Message (Code)", 3600, 400)?;
    canvas.place(Sm, "Normalize Message Text", 3840, 400)?;
    canvas.place(Ai, "Send WhatsApp Response", 4080, 300)?;
    canvas.place(Ai, "Update FAQ Cache", 4080, 500)?;

    if let Some(node) = canvas.try_place(Ai, "Get Service by Number", 3120, 300) {
        node.name = "Get Service by Number (AI Path)".to_string();
        node.id = Some(new_id());
    }
    for (name, x, y) in [
        ("Find Professionals (Direct)", 3360, 300),
        ("Process Professionals", 3600, 300),
        ("Single Professional?", 3840, 300),
        ("Check Calendar (Direct)", 4080, 200),
        ("Format Calendar Slots", 4320, 200),
    ] {
        canvas.try_place(Ai, name, x, y);
    }

    canvas.push(documentation_note());

    let nodes = canvas
        .nodes
        .iter()
        .map(credentials::replace_credential_placeholders)
        .collect::<OpsResult<Vec<_>>>()?;

    Ok(Workflow {
        name: Some(MERGED_NAME.to_string()),
        nodes,
        connections: connections::build(tools),
        settings: Some(merged_settings()),
        meta: Some(merged_meta(state_machine)),
        extra: merged_extra(),
    })
}

fn documentation_note() -> WorkflowNode {
    let mut node = WorkflowNode {
        id: Some(new_id()),
        name: "Sticky Note - Documentation".to_string(),
        node_type: STICKY_NOTE_TYPE.to_string(),
        type_version: Some(json!(1)),
        position: Some(Position::new(-400, 100)),
        ..Default::default()
    };
    node.set_param("content", rewrites::DOCUMENTATION_NOTE);
    node.set_param("height", 500);
    node.set_param("width", 450);
    node.set_param("color", 5);
    node
}

fn merged_settings() -> WorkflowSettings {
    let mut extra = Map::new();
    extra.insert("executionOrder".to_string(), json!("v1"));
    extra.insert("availableInMCP".to_string(), json!(false));
    WorkflowSettings {
        error_workflow: Some(rewrites::ERROR_WORKFLOW_EXPRESSION.to_string()),
        extra,
    }
}

fn merged_meta(state_machine: &Workflow) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("templateCredsSetupCompleted".to_string(), json!(true));
    meta.insert(
        "instanceId".to_string(),
        json!(state_machine.instance_id().unwrap_or_default()),
    );
    meta
}

fn merged_extra() -> Map<String, Value> {
    let tags: Vec<Value> = TAGS
        .iter()
        .map(|tag| json!({"name": tag, "id": new_id()}))
        .collect();

    let mut extra = Map::new();
    extra.insert("pinData".to_string(), json!({}));
    extra.insert("active".to_string(), json!(false));
    extra.insert("versionId".to_string(), json!(new_id()));
    extra.insert("id".to_string(), json!(MERGED_ID));
    extra.insert("tags".to_string(), Value::Array(tags));
    extra
}

/// The merged workflow as JSON, with top-level and settings keys in the
/// order n8n exports them.
pub fn document_value(workflow: &Workflow) -> OpsResult<Value> {
    let value = serde_json::to_value(workflow)
        .map_err(|e| OpsError::Workflow(format!("cannot serialize merged workflow: {}", e)))?;
    let Value::Object(map) = value else {
        return Ok(value);
    };

    let mut document = ordered(&map, DOCUMENT_KEYS);
    if let Some(Value::Object(settings)) = document.get("settings") {
        let settings = ordered(settings, SETTINGS_KEYS);
        document.insert("settings".to_string(), Value::Object(settings));
    }
    Ok(Value::Object(document))
}

/// Copy of `map` with `keys` first, in that order, then the rest as they were.
fn ordered(map: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for key in keys {
        if let Some(value) = map.get(*key) {
            out.insert(key.to_string(), value.clone());
        }
    }
    for (key, value) in map {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Input and output locations for a merge run.
#[derive(Debug, Clone)]
pub struct MergePaths {
    pub state_machine: PathBuf,
    pub ai_handler: PathBuf,
    pub output: PathBuf,
}

impl MergePaths {
    /// Default file names inside `workflows_dir`, each overridable.
    pub fn resolve(
        workflows_dir: &Path,
        state_machine: Option<PathBuf>,
        ai_handler: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            state_machine: state_machine
                .unwrap_or_else(|| workflows_dir.join(DEFAULT_STATE_MACHINE_FILE)),
            ai_handler: ai_handler.unwrap_or_else(|| workflows_dir.join(DEFAULT_AI_HANDLER_FILE)),
            output: output.unwrap_or_else(|| workflows_dir.join(DEFAULT_OUTPUT_FILE)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub node_count: usize,
    pub connection_count: usize,
}

pub fn load_workflow(path: &Path) -> OpsResult<Workflow> {
    let raw = fs::read_to_string(path).map_err(|e| OpsError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| OpsError::json(path, e))
}

/// Load both handlers, merge them and write the result.
pub fn run(paths: &MergePaths) -> OpsResult<MergeReport> {
    ui::status("🔄 Merging WhatsApp handlers...");
    ui::status(&format!("   State Machine: {}", paths.state_machine.display()));
    ui::status(&format!("   AI Optimized:  {}", paths.ai_handler.display()));

    let state_machine = load_workflow(&paths.state_machine)?;
    let ai_handler = load_workflow(&paths.ai_handler)?;
    let merged = merge_handlers(&state_machine, &ai_handler)?;

    let rendered = serde_json::to_string_pretty(&document_value(&merged)?)
        .map_err(|e| OpsError::json(&paths.output, e))?;
    fs::write(&paths.output, rendered).map_err(|e| OpsError::io(&paths.output, e))?;

    let report = MergeReport {
        node_count: merged.functional_node_count(),
        connection_count: merged.connections.len(),
    };
    info!(
        output = %paths.output.display(),
        nodes = report.node_count,
        connections = report.connection_count,
        "merged workflow written"
    );

    ui::success(&format!("Created: {}", paths.output.display()));
    ui::status(&format!("   Nodes: {} (excluding sticky notes)", report.node_count));
    ui::status(&format!("   Connections: {}", report.connection_count));
    ui::status("   Error workflow: configured");
    ui::status("   Credential placeholders: ✅");
    println!();
    ui::status("Next steps:");
    ui::status("  1. Import into n8n");
    ui::status("  2. Replace {{PLACEHOLDER}} credential IDs");
    ui::status("  3. Test state transitions");

    Ok(report)
}

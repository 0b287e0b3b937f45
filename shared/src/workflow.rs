//! Typed view of an n8n workflow export.
//!
//! Only the fields the tooling reads or rewrites are typed; everything else
//! is kept in the `extra` maps so a document survives a load/save cycle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const STICKY_NOTE_TYPE: &str = "n8n-nodes-base.stickyNote";

/// `connections` keyed by source node name, then by connection kind
/// (`main`, `ai_tool`, ...), then by output port.
pub type Connections = IndexMap<String, NodeOutputs>;
pub type NodeOutputs = IndexMap<String, Vec<Vec<ConnectionTarget>>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Connections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<WorkflowSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    pub fn node(&self, name: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn error_workflow(&self) -> Option<&str> {
        self.settings
            .as_ref()
            .and_then(|s| s.error_workflow.as_deref())
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.get("instanceId"))
            .and_then(Value::as_str)
    }

    /// Node count ignoring canvas sticky notes.
    pub fn functional_node_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.node_type != STICKY_NOTE_TYPE)
            .count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(
        rename = "errorWorkflow",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_workflow: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed fields serialize in n8n's export order; other keys follow in the
/// order they were read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowNode {
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(rename = "typeVersion", default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(rename = "webhookId", default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<IndexMap<String, CredentialRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowNode {
    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<Value>) {
        self.parameters.insert(key.to_string(), value.into());
    }
}

/// Canvas coordinates, kept as JSON numbers so integer positions stay integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Number, pub Number);

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self(x.into(), y.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub index: u32,
}

impl ConnectionTarget {
    pub fn new(node: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind: kind.into(),
            index: 0,
        }
    }

    pub fn main(node: impl Into<String>) -> Self {
        Self::new(node, "main")
    }
}

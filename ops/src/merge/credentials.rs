use clinic_shared::WorkflowNode;

use crate::error::{OpsError, OpsResult};

pub const POSTGRES_PLACEHOLDER: &str = "{{POSTGRES_CREDENTIAL_ID}}";
pub const OPENROUTER_PLACEHOLDER: &str = "{{OPENROUTER_CREDENTIAL_ID}}";
pub const EVOLUTION_PLACEHOLDER: &str = "{{EVOLUTION_CREDENTIAL_ID}}";

/// Credential ids from the development instance and the placeholder each maps to.
pub const KNOWN_CREDENTIAL_IDS: &[(&str, &str)] = &[
    ("XCqM1aDUIHVebSzp", POSTGRES_PLACEHOLDER),
    ("9Rg0MgrsgZNRKTC0", POSTGRES_PLACEHOLDER),
    ("KuGKBDcL6dsjIWc0", OPENROUTER_PLACEHOLDER),
    ("QfRFeOCfFzxb41Xh", OPENROUTER_PLACEHOLDER),
    ("xQSYKSSdn2xKsrdJ", EVOLUTION_PLACEHOLDER),
];

/// Swap every known raw credential id for its placeholder.
///
/// The replacement runs over the serialized node, so ids embedded in
/// parameters are rewritten as well as those under `credentials`.
pub fn replace_credential_placeholders(node: &WorkflowNode) -> OpsResult<WorkflowNode> {
    let serialized = serde_json::to_string(node)
        .map_err(|e| OpsError::Workflow(format!("cannot serialize node '{}': {}", node.name, e)))?;

    let replaced = KNOWN_CREDENTIAL_IDS
        .iter()
        .fold(serialized, |acc, (raw, placeholder)| acc.replace(raw, placeholder));

    serde_json::from_str(&replaced)
        .map_err(|e| OpsError::Workflow(format!("cannot reparse node '{}': {}", node.name, e)))
}

//! Individual workflow checks.

use clinic_shared::Workflow;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;
use std::path::Path;

use super::report::ValidationReport;
use crate::error::{OpsError, OpsResult};

pub const FORBIDDEN_NODE_TYPES: &[&str] = &[
    "n8n-nodes-base.googleCalendar",
    "n8n-nodes-base.googleCalendarTrigger",
];

/// Queries that are tenant-agnostic by nature.
const SYSTEM_QUERY_MARKERS: &[&str] = &[
    "cleanup_expired",
    "release_conversation",
    "acquire_conversation",
    "enqueue_message",
];

/// Infrastructure-level environment references allowed in tool workflows.
pub const ALLOWED_ENV_REFS: &[&str] = &[
    "$env.FALLBACK_TELEGRAM_CHAT_ID",
    "$env.N8N_WEBHOOK_URL",
    "$env.ERROR_WORKFLOW_ID",
];

const ENV_WINDOW_BEFORE: usize = 50;
const ENV_WINDOW_AFTER: usize = 80;

const CANONICAL_ERROR_HANDLER_PLACEHOLDER: &str = "{{ERROR_HANDLER_WORKFLOW_ID}}";

/// Compiled patterns shared by every file in a run.
pub struct Rules {
    main_name: Regex,
    raw_credential_id: Regex,
    env_reference: Regex,
}

impl Rules {
    pub fn new() -> OpsResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| OpsError::Workflow(format!("invalid pattern {}: {}", pattern, e)))
        };
        Ok(Self {
            main_name: compile(r"^\d{2}-")?,
            raw_credential_id: compile(r"^[A-Za-z0-9]{10,20}$")?,
            env_reference: compile(r"\$env\.[A-Za-z0-9_]*")?,
        })
    }

    /// Main workflows are numbered; tool workflows end in `-tool` or `-client`.
    pub fn check_naming(&self, path: &Path, report: &mut ValidationReport) {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = display_name(path);
        let parent = path
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parent.as_str() {
            "main" => {
                if !self.main_name.is_match(&stem) {
                    report.warn(
                        &file,
                        format!("Main workflow should match XX-name pattern: {}", stem),
                    );
                }
            }
            ".claude" | "sub" => {}
            _ => {
                if !stem.ends_with("-tool") && !stem.ends_with("-client") {
                    report.note(
                        &file,
                        format!("Tool workflow name does not end with '-tool': {}", stem),
                    );
                }
            }
        }
    }

    pub fn check_credentials(&self, workflow: &Workflow, file: &str, report: &mut ValidationReport) {
        for node in &workflow.nodes {
            let Some(credentials) = &node.credentials else {
                continue;
            };
            for (kind, credential) in credentials {
                let id = credential.id.as_deref().unwrap_or_default();
                if id.is_empty() || (id.contains("{{") && id.contains("}}")) {
                    continue;
                }
                if self.raw_credential_id.is_match(id) {
                    report.warn(
                        file,
                        format!(
                            "Credential '{}' in node '{}' has non-placeholder ID: {}",
                            kind, node.name, id
                        ),
                    );
                }
            }
        }
    }

    /// Tool workflows should take configuration from the tenant, not `$env`.
    ///
    /// Each occurrence is judged on the text around it, so an allowed
    /// reference elsewhere in the document does not excuse it.
    pub fn check_env_references(&self, raw: &str, file: &str, report: &mut ValidationReport) {
        for found in self.env_reference.find_iter(raw) {
            let start = floor_char_boundary(raw, found.start().saturating_sub(ENV_WINDOW_BEFORE));
            let end = ceil_char_boundary(raw, found.start() + ENV_WINDOW_AFTER);
            let window = &raw[start..end];

            if ALLOWED_ENV_REFS.iter().any(|allowed| window.contains(allowed)) {
                continue;
            }
            report.warn(file, format!("Found $env reference: ...{}...", found.as_str()));
        }
    }
}

/// Single-line rendering the `$env` window is measured against.
///
/// Items are separated by `", "` and keys by `": "`, and every non-ASCII
/// character is written as a `\uXXXX` escape, so the distance between two
/// references depends only on the document and never on how the file was
/// formatted on disk.
pub fn serialize_document(value: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedAsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

pub fn check_forbidden_nodes(workflow: &Workflow, file: &str, report: &mut ValidationReport) {
    for node in &workflow.nodes {
        if FORBIDDEN_NODE_TYPES.contains(&node.node_type.as_str()) {
            report.error(
                file,
                format!(
                    "Forbidden node type '{}' in node '{}'",
                    node.node_type, node.name
                ),
            );
        }
    }
}

/// Postgres queries must be scoped to a tenant.
pub fn check_tenant_scoping(workflow: &Workflow, file: &str, report: &mut ValidationReport) {
    for node in &workflow.nodes {
        if !node.node_type.to_lowercase().contains("postgres") {
            continue;
        }

        let query = node.param_str("query").unwrap_or_default();
        let runs_query = match node.parameters.get("operation") {
            None | Some(Value::Null) => true,
            Some(Value::String(op)) => op == "executeQuery",
            Some(_) => false,
        };
        if query.is_empty() || !runs_query {
            continue;
        }

        let lowered = query.to_lowercase();
        if lowered.contains("tenant") {
            continue;
        }
        if SYSTEM_QUERY_MARKERS.iter().any(|m| lowered.contains(m)) {
            continue;
        }
        report.warn(
            file,
            format!(
                "Postgres node '{}' query may be missing tenant_id filter",
                node.name
            ),
        );
    }
}

pub fn check_error_workflow(workflow: &Workflow, file: &str, report: &mut ValidationReport) {
    match workflow.error_workflow() {
        None | Some("") => report.error(file, "Missing settings.errorWorkflow"),
        Some(target) if !target.contains(CANONICAL_ERROR_HANDLER_PLACEHOLDER) && !target.contains("04") => {
            report.warn(
                file,
                format!(
                    "errorWorkflow may not point to canonical error handler: {}",
                    target
                ),
            );
        }
        Some(_) => {}
    }
}

pub fn check_disabled_nodes(workflow: &Workflow, file: &str, report: &mut ValidationReport) {
    for node in workflow.nodes.iter().filter(|n| n.is_disabled()) {
        report.note(
            file,
            format!("Disabled node: '{}' (type: {})", node.name, node.node_type),
        );
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

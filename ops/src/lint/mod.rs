//! Static checks on workflow JSON files before deployment.

pub mod checks;
pub mod report;

use clinic_shared::Workflow;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use checks::Rules;
pub use report::{Diagnostic, Severity, ValidationReport};

use crate::error::OpsResult;

/// Where a file sits in the workflows tree; decides which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Main,
    Sub,
    Tool,
}

/// Run every applicable check on one file.
pub fn validate_file(rules: &Rules, path: &Path, kind: WorkflowKind, report: &mut ValidationReport) {
    let file = checks::display_name(path);
    debug!(file = %path.display(), ?kind, "validating workflow");

    let Some(raw) = std::fs::read_to_string(path).ok() else {
        report.error(&file, "Unreadable file");
        return;
    };
    let Ok(value) = serde_json::from_str::<Value>(&raw) else {
        report.error(&file, "Invalid JSON");
        return;
    };
    let document = match checks::serialize_document(&value) {
        Ok(document) => document,
        Err(e) => {
            report.error(&file, format!("Invalid workflow structure: {}", e));
            return;
        }
    };
    let workflow: Workflow = match serde_json::from_value(value) {
        Ok(wf) => wf,
        Err(e) => {
            report.error(&file, format!("Invalid workflow structure: {}", e));
            return;
        }
    };

    rules.check_naming(path, report);
    checks::check_forbidden_nodes(&workflow, &file, report);
    checks::check_tenant_scoping(&workflow, &file, report);
    rules.check_credentials(&workflow, &file, report);
    checks::check_disabled_nodes(&workflow, &file, report);

    if kind == WorkflowKind::Main && !file.contains("error-handler") {
        checks::check_error_workflow(&workflow, &file, report);
    }
    if kind == WorkflowKind::Tool {
        rules.check_env_references(&document, &file, report);
    }
}

/// Files to validate under `workflows_dir`, in check order.
pub fn collect_files(workflows_dir: &Path) -> Vec<(PathBuf, WorkflowKind)> {
    let mut files = Vec::new();

    for (subdir, kind) in [("main", WorkflowKind::Main), ("sub", WorkflowKind::Sub)] {
        let mut found: Vec<PathBuf> = std::fs::read_dir(workflows_dir.join(subdir))
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_json(p))
            .collect();
        found.sort();
        files.extend(found.into_iter().map(|p| (p, kind)));
    }

    let tools_dir = workflows_dir.join("tools");
    if tools_dir.is_dir() {
        let mut tools: Vec<PathBuf> = walkdir::WalkDir::new(&tools_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_json(p) && !p.to_string_lossy().contains(".claude"))
            .collect();
        tools.sort();
        files.extend(tools.into_iter().map(|p| (p, WorkflowKind::Tool)));
    }

    files
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Validate the whole tree and print the report.
pub fn run(workflows_dir: &Path) -> OpsResult<ValidationReport> {
    let rules = Rules::new()?;
    let mut report = ValidationReport::new();

    println!("{}", "=".repeat(60));
    println!("  n8n Workflow Validation");
    println!("{}", "=".repeat(60));
    println!();

    for (path, kind) in collect_files(workflows_dir) {
        validate_file(&rules, &path, kind, &mut report);
        report.files_checked += 1;
    }

    report.print();
    Ok(report)
}

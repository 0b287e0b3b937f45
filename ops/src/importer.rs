//! Push workflow JSON files into a running n8n instance.
//!
//! Workflows are matched by name: an existing workflow is updated in place,
//! anything else is created.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{OpsError, OpsResult};
use crate::n8n::{N8nClient, WorkflowListing};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// All `*.json` files under `dir`, recursively, sorted by path.
///
/// Hidden files and directories are skipped.
pub fn discover_workflow_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

/// Name n8n will know the workflow by: its `name` field, else the file stem.
pub fn workflow_name(workflow: &Value, path: &Path) -> String {
    workflow
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

/// Import one file, returning a short failure reason on error.
pub async fn import_workflow(
    client: &N8nClient,
    path: &Path,
    existing: &HashMap<String, String>,
) -> Result<ImportOutcome, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => "File not found".to_string(),
        _ => e.to_string(),
    })?;
    let workflow: Value =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON: {}", e))?;

    let name = workflow_name(&workflow, path);

    let (response, outcome) = match existing.get(&name) {
        Some(id) => (
            client.update_workflow(id, &workflow).await,
            ImportOutcome::Updated,
        ),
        None => (client.create_workflow(&workflow).await, ImportOutcome::Created),
    };

    let response = response.map_err(|e| e.to_string())?;
    if response.is_accepted() {
        info!(workflow = %name, ?outcome, "workflow pushed");
        Ok(outcome)
    } else {
        Err(response.failure_summary())
    }
}

/// Run the whole import: health check, listing, then every file in `dir`.
pub async fn run(client: &N8nClient, dir: &Path) -> OpsResult<ImportSummary> {
    ui::status("🚀 n8n Workflow Importer");
    ui::status(&format!("n8n URL: {}", client.base_url()));
    println!();

    if let Err(e) = client.health().await {
        ui::error(&e.to_string());
        return Err(OpsError::Unreachable(
            "n8n is not accessible. Make sure it's running.".to_string(),
        ));
    }
    ui::success("n8n is accessible");

    ui::status("📋 Checking existing workflows...");
    let existing = match client.list_workflows().await {
        WorkflowListing::Found(map) => map,
        WorkflowListing::Unauthorized => {
            ui::warning("API requires authentication");
            ui::warning("Could not authenticate. Trying import anyway...");
            HashMap::new()
        }
        WorkflowListing::Unavailable(reason) => {
            ui::warning(&reason);
            HashMap::new()
        }
    };

    let files = discover_workflow_files(dir);
    if files.is_empty() {
        return Err(OpsError::NotFound(format!(
            "No workflow files found in {}/",
            dir.display()
        )));
    }

    ui::status(&format!("📦 Found {} workflows to import", files.len()));
    println!();

    let mut summary = ImportSummary::default();
    for path in &files {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui::status(&format!("Importing {}...", file_name));

        match import_workflow(client, path, &existing).await {
            Ok(ImportOutcome::Updated) => {
                ui::success(&format!("Updated: {}", file_name));
                summary.updated += 1;
            }
            Ok(ImportOutcome::Created) => {
                ui::success(&format!("Imported: {}", file_name));
                summary.imported += 1;
            }
            Err(reason) => {
                ui::error(&format!("Failed: {} - {}", file_name, reason));
                summary.failed += 1;
            }
        }
        println!();
    }

    print_summary(&summary, client.base_url());
    Ok(summary)
}

fn print_summary(summary: &ImportSummary, base_url: &str) {
    ui::banner("Import Summary");
    ui::success(&format!("Imported: {}", summary.imported));
    if summary.updated > 0 {
        ui::highlight(&format!("Updated: {}", summary.updated));
    }
    if summary.failed > 0 {
        ui::error(&format!("Failed: {}", summary.failed));
        return;
    }

    ui::success("All workflows imported successfully!");
    println!();
    ui::status("📝 Next steps:");
    ui::status(&format!("1. Open n8n UI: {}", base_url));
    ui::status("2. Configure credentials (see CONFIGURACAO_POS_IMPORT.md)");
    ui::status("3. Activate main workflows:");
    ui::status("   - 01 - WhatsApp Patient Handler (AI Optimized)");
    ui::status("   - 04 - Error Handler");
}

use serde_json::json;

use crate::lint::{self, Rules, Severity, ValidationReport, WorkflowKind};
use crate::tests::fixtures::clean_main_workflow;
use crate::tests::helpers::{write_json, write_raw};

fn lines(report: &ValidationReport, severity: Severity) -> Vec<String> {
    report.with_severity(severity).map(|d| d.to_string()).collect()
}

#[test]
fn test_collect_files_orders_main_sub_tools() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(root, "tools/calendar/b-tool.json", &json!({}));
    write_json(root, "tools/ai/a-tool.json", &json!({}));
    write_json(root, "tools/.claude/settings.json", &json!({}));
    write_json(root, "sub/tenant-config-loader.json", &json!({}));
    write_json(root, "main/02-b.json", &json!({}));
    write_json(root, "main/01-a.json", &json!({}));
    write_raw(root, "main/notes.md", "not a workflow");
    write_json(root, "main/nested/03-c.json", &json!({}));

    let files: Vec<(String, WorkflowKind)> = lint::collect_files(root)
        .into_iter()
        .map(|(p, kind)| {
            (
                p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"),
                kind,
            )
        })
        .collect();

    assert_eq!(
        files,
        vec![
            ("main/01-a.json".to_string(), WorkflowKind::Main),
            ("main/02-b.json".to_string(), WorkflowKind::Main),
            ("sub/tenant-config-loader.json".to_string(), WorkflowKind::Sub),
            ("tools/ai/a-tool.json".to_string(), WorkflowKind::Tool),
            ("tools/calendar/b-tool.json".to_string(), WorkflowKind::Tool),
        ]
    );
}

#[test]
fn test_clean_tree_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), "main/01-whatsapp-main.json", &clean_main_workflow());
    write_json(
        dir.path(),
        "main/04-error-handler.json",
        &json!({"name": "04 - Error Handler", "nodes": []}),
    );
    write_json(dir.path(), "tools/calendar/list-events-tool.json", &json!({"nodes": []}));

    let report = lint::run(dir.path()).unwrap();
    assert_eq!(report.files_checked, 3);
    assert!(report.is_ok());
    assert!(report.diagnostics().is_empty());
    assert_eq!(report.verdict(), "PASSED (3 files, 0 warnings)");
}

#[test]
fn test_invalid_json_stops_further_checks() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_raw(dir.path(), "main/bad.json", "{ not json");

    let rules = Rules::new().unwrap();
    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Main, &mut report);

    assert_eq!(lines(&report, Severity::Error), vec!["ERROR [bad.json]: Invalid JSON"]);
    assert_eq!(report.diagnostics().len(), 1);
}

#[test]
fn test_structure_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), "sub/loader.json", &json!({"nodes": {"not": "a list"}}));

    let rules = Rules::new().unwrap();
    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Sub, &mut report);

    let errors = lines(&report, Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("ERROR [loader.json]: Invalid workflow structure:"));
}

#[test]
fn test_main_workflow_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "main/whatsapp.json",
        &json!({
            "nodes": [
                {"name": "Calendar", "type": "n8n-nodes-base.googleCalendar"},
                {"name": "Services", "type": "n8n-nodes-base.postgres",
                 "parameters": {"query": "SELECT * FROM services"},
                 "credentials": {"postgres": {"id": "XCqM1aDUIHVebSzp"}}},
                {"name": "OCR", "type": "n8n-nodes-base.httpRequest", "disabled": true,
                 "parameters": {"url": "={{ $env.OCR_URL }}"}}
            ]
        }),
    );

    let rules = Rules::new().unwrap();
    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Main, &mut report);

    assert_eq!(
        lines(&report, Severity::Error),
        vec![
            "ERROR [whatsapp.json]: Forbidden node type 'n8n-nodes-base.googleCalendar' in node 'Calendar'",
            "ERROR [whatsapp.json]: Missing settings.errorWorkflow",
        ]
    );
    assert_eq!(
        lines(&report, Severity::Warning),
        vec![
            "WARN  [whatsapp.json]: Main workflow should match XX-name pattern: whatsapp",
            "WARN  [whatsapp.json]: Postgres node 'Services' query may be missing tenant_id filter",
            "WARN  [whatsapp.json]: Credential 'postgres' in node 'Services' has non-placeholder ID: XCqM1aDUIHVebSzp",
        ]
    );
    // $env is only checked in tool workflows
    assert_eq!(
        lines(&report, Severity::Info),
        vec!["INFO  [whatsapp.json]: Disabled node: 'OCR' (type: n8n-nodes-base.httpRequest)"]
    );
}

#[test]
fn test_error_handler_is_exempt_from_error_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), "main/04-error-handler.json", &json!({"nodes": []}));

    let rules = Rules::new().unwrap();
    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Main, &mut report);
    assert!(report.diagnostics().is_empty());
}

#[test]
fn test_tool_env_references() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "tools/escalation/escalate-tool.json",
        &json!({
            "nodes": [
                {"name": "Notify", "type": "n8n-nodes-base.telegram",
                 "parameters": {"chatId": "={{ $env.FALLBACK_TELEGRAM_CHAT_ID }}"}},
                {"name": "Padding", "type": "n8n-nodes-base.code",
                 "parameters": {"jsCode": "x".repeat(300)}},
                {"name": "Calendar", "type": "n8n-nodes-base.httpRequest",
                 "parameters": {"url": "={{ $env.GOOGLE_CALENDAR_ID }}"}}
            ]
        }),
    );

    let rules = Rules::new().unwrap();
    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Tool, &mut report);

    assert_eq!(
        lines(&report, Severity::Warning),
        vec!["WARN  [escalate-tool.json]: Found $env reference: ...$env.GOOGLE_CALENDAR_ID..."]
    );
}

#[test]
fn test_env_window_ignores_file_indentation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "tools/notify/notify-tool.json",
        &json!({
            "nodes": [
                {"name": "Notify", "type": "n8n-nodes-base.httpRequest",
                 "parameters": {"options": {
                     "hook": "={{ $env.N8N_WEBHOOK_URL }}",
                     "clinicPhone": "={{ $env.CLINIC_PHONE }}"
                 }}}
            ]
        }),
    );
    let rules = Rules::new().unwrap();

    // on disk the indentation pushes the allowed reference out of reach
    let raw = std::fs::read_to_string(&path).unwrap();
    let mut on_disk = ValidationReport::new();
    rules.check_env_references(&raw, "notify-tool.json", &mut on_disk);
    assert_eq!(on_disk.count(Severity::Warning), 1);

    let mut report = ValidationReport::new();
    lint::validate_file(&rules, &path, WorkflowKind::Tool, &mut report);
    assert!(lines(&report, Severity::Warning).is_empty());
}

#[test]
fn test_failed_run_verdict() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), "main/01-broken.json", "[");
    write_json(dir.path(), "sub/loader.json", &json!({"nodes": []}));

    let report = lint::run(dir.path()).unwrap();
    assert!(!report.is_ok());
    assert_eq!(report.verdict(), "FAILED (1 errors, 0 warnings)");
}

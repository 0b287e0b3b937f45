//! Expressions rewritten while merging.
//!
//! In the merged handler all tenant and contact data comes from the
//! `Parse Webhook Data` node, so SQL and code that read the raw webhook or
//! the tenant loader are repointed there.

pub const WEBHOOK_PATH: &str = "whatsapp-main";
pub const WEBHOOK_ID: &str = "whatsapp-main-handler";

pub const GET_CONVERSATION_STATE: &str = "SELECT * FROM get_or_create_conversation_state('{{ $('Parse Webhook Data').item.json.tenant_id }}'::uuid, '{{ $('Parse Webhook Data').item.json.remote_jid }}'::varchar);";

pub const TRANSITION_STATE: &str = r#"SELECT * FROM transition_conversation_state(
  '{{ $('Parse Webhook Data').item.json.tenant_id }}'::uuid,
  '{{ $('Parse Webhook Data').item.json.remote_jid }}',
  '{{ $('Parse Webhook Data').item.json.message_text }}'
);"#;

pub const GET_TEMPLATE_RESPONSE: &str = r#"SELECT get_template_response(
  CAST('{{ $('Parse Webhook Data').item.json.tenant_id }}' AS uuid),
  CAST('{{ $('Transition State').item.json.template_key || "" }}' AS varchar(100)),
  CAST('{{ JSON.stringify({
    "patient_name": $('Parse Webhook Data').item.json.push_name || "Cliente",
    "clinic_name": $('Parse Webhook Data').item.json.tenant_config.clinic_name
  }) }}' AS jsonb)
) as response_text;"#;

pub const GET_SERVICES_LIST: &str = "SELECT get_services_catalog_for_prompt('{{ $('Parse Webhook Data').item.json.tenant_id }}'::uuid) as service_list;";

pub const GET_SELECTED_SERVICE: &str = r#"SELECT
  service_id AS id,
  service_name AS name,
  service_code,
  service_category,
  service_number
FROM get_service_by_number(
  '{{ $('Parse Webhook Data').item.json.tenant_id }}'::uuid,
  {{ $('Parse Webhook Data').item.json.message_text }}::integer
);"#;

pub const SAVE_SERVICE_SELECTION: &str = r#"SELECT update_conversation_state_data(
  '{{ $('Parse Webhook Data').item.json.tenant_id }}'::uuid,
  '{{ $('Parse Webhook Data').item.json.remote_jid }}',
  '{{ $json.id }}'::uuid,
  NULL,
  NULL,
  '{"selected_service_name": "{{ $json.name }}"}'
);"#;

/// Replacements applied to the `Merge Template + Data` code node, in order.
pub const MERGE_TEMPLATE_JS: &[(&str, &str)] = &[
    (
        "$('WhatsApp Webhook').item.json.body.data.key.remoteJid",
        "$('Parse Webhook Data').item.json.remote_jid",
    ),
    (
        "$('WhatsApp Webhook').item.json.body.pushName",
        "$('Parse Webhook Data').item.json.push_name",
    ),
    (
        "$('Load Tenant Config').item.json.tenant_id",
        "$('Parse Webhook Data').item.json.tenant_id",
    ),
    (
        "$('Load Tenant Config').item.json.clinic_name",
        "$('Parse Webhook Data').item.json.tenant_config.clinic_name",
    ),
];

pub fn rewrite_merge_template_js(code: &str) -> String {
    MERGE_TEMPLATE_JS
        .iter()
        .fold(code.to_string(), |acc, (from, to)| acc.replace(from, to))
}

pub const ERROR_WORKFLOW_EXPRESSION: &str = "={{ $env.ERROR_WORKFLOW_ID || '04 - Error Handler' }}";

pub const DOCUMENTATION_NOTE: &str = "## 📋 01 - WhatsApp Main Handler (Merged)

**Version**: 5.0 — State Machine + 3-Layer Defense

### Architecture
- **Backbone**: DB-driven conversation state machine (12 states)
- **AI Defense**: FAQ Cache → Template → AI Agent (3-layer)
- **Media**: Audio transcription + Image OCR (gated by feature flags)
- **Multi-tenant**: All queries scoped by tenant_id

### Flow
1. Webhook → Tenant Config Loader (sub-workflow)
2. Parse → Message Type Switch
3. State Machine: get/create state → transition
4. If requires_ai → 3-layer defense (FAQ → Template → AI)
5. If !requires_ai → DB template response with dynamic data
6. Format → Normalize → Send WhatsApp

### Credential Placeholders
- `{{POSTGRES_CREDENTIAL_ID}}`
- `{{OPENROUTER_CREDENTIAL_ID}}`
- `{{EVOLUTION_CREDENTIAL_ID}}`";

//! Wiring of the merged handler.

use clinic_shared::{ConnectionTarget, Connections, NodeOutputs};

pub const AGENT: &str = "Patient Assistant Agent";

/// Agent tools copied when present in the AI handler, in canvas order.
pub const AGENT_TOOLS: &[&str] = &[
    "Find Professionals Tool",
    "List Calendar Events",
    "Check Calendar Availability",
    "Create Calendar Event",
    "Human Escalation Tool",
    "Update Calendar Event",
    "Delete Calendar Event",
];

/// Source node and the targets of each of its `main` outputs.
type Route = (&'static str, &'static [&'static [&'static str]]);

const MAIN_ROUTES: &[Route] = &[
    // entry
    ("WhatsApp Webhook", &[&["Load Tenant Config"]]),
    ("Load Tenant Config", &[&["Parse Webhook Data"]]),
    ("Parse Webhook Data", &[&["Message Type Switch"]]),
    (
        "Message Type Switch",
        &[
            &["Get Conversation State"],
            &["Process Image"],
            &["Process Audio"],
        ],
    ),
    ("Process Audio", &[&["Get Conversation State"]]),
    ("Process Image", &[&["Get Conversation State"]]),
    // state machine
    ("Get Conversation State", &[&["Transition State"]]),
    ("Transition State", &[&["Requires AI?", "Service Selected?"]]),
    (
        "Requires AI?",
        &[&["Intent Classifier"], &["Get Template Response"]],
    ),
    // FAQ -> template -> agent
    ("Intent Classifier", &[&["Check FAQ Cache"]]),
    ("Check FAQ Cache", &[&["Merge FAQ Result"]]),
    ("Merge FAQ Result", &[&["Needs AI?"]]),
    (
        "Needs AI?",
        &[&["Build Prompt with Catalog"], &["No-AI Router"]],
    ),
    ("Build Prompt with Catalog", &[&[AGENT]]),
    (AGENT, &[&["Format Message (Code)"]]),
    (
        "No-AI Router",
        &[
            &["Get Service by Number (AI Path)"],
            &["Resolve Template"],
            &["Use FAQ Answer"],
            &["Build Prompt with Catalog"],
        ],
    ),
    ("Resolve Template", &[&["Use Template Answer"]]),
    ("Use Template Answer", &[&["Format Message (Code)"]]),
    ("Use FAQ Answer", &[&["Format Message (Code)"]]),
    // direct service path
    (
        "Get Service by Number (AI Path)",
        &[&["Find Professionals (Direct)"]],
    ),
    ("Find Professionals (Direct)", &[&["Process Professionals"]]),
    ("Process Professionals", &[&["Single Professional?"]]),
    (
        "Single Professional?",
        &[&["Check Calendar (Direct)"], &["Check Calendar (Direct)"]],
    ),
    ("Check Calendar (Direct)", &[&["Format Calendar Slots"]]),
    ("Format Calendar Slots", &[&["Format Message (Code)"]]),
    // template branch
    ("Get Template Response", &[&["Needs Available Options?"]]),
    (
        "Needs Available Options?",
        &[&["Get Available Options"], &["Needs Dynamic Data?"]],
    ),
    ("Get Available Options", &[&["Needs Dynamic Data?"]]),
    (
        "Needs Dynamic Data?",
        &[&["Get Services List"], &["Use Template Directly"]],
    ),
    ("Get Services List", &[&["Merge Template + Data"]]),
    // state machine service path
    ("Service Selected?", &[&["Get Selected Service"]]),
    ("Get Selected Service", &[&["Save Service Selection"]]),
    (
        "Save Service Selection",
        &[&["Get Professionals for Service"]],
    ),
    (
        "Get Professionals for Service",
        &[&["Format Professionals List"]],
    ),
    ("Format Professionals List", &[&["Merge Template + Data"]]),
    // output
    ("Merge Template + Data", &[&["Normalize Message Text"]]),
    ("Use Template Directly", &[&["Normalize Message Text"]]),
    ("Format Message (Code)", &[&["Normalize Message Text"]]),
    (
        "Normalize Message Text",
        &[&["Send WhatsApp Response", "Update FAQ Cache"]],
    ),
];

/// Sub-node connections into the agent.
const AGENT_INPUTS: &[(&str, &str)] = &[
    ("OpenRouter Chat Model", "ai_languageModel"),
    ("Postgres Chat Memory", "ai_memory"),
];

fn single_output(target: &str, kind: &str) -> NodeOutputs {
    let mut outputs = NodeOutputs::new();
    outputs.insert(
        kind.to_string(),
        vec![vec![ConnectionTarget::new(target, kind)]],
    );
    outputs
}

/// Build the connection map; `tools` are the agent tools actually placed.
pub fn build<'t>(tools: impl IntoIterator<Item = &'t str>) -> Connections {
    let mut connections = Connections::new();

    for (source, outputs) in MAIN_ROUTES {
        let ports = outputs
            .iter()
            .map(|targets| targets.iter().map(|t| ConnectionTarget::main(*t)).collect())
            .collect();
        let mut node_outputs = NodeOutputs::new();
        node_outputs.insert("main".to_string(), ports);
        connections.insert(source.to_string(), node_outputs);
    }

    for (source, kind) in AGENT_INPUTS {
        connections.insert(source.to_string(), single_output(AGENT, kind));
    }

    for tool in tools {
        connections.insert(tool.to_string(), single_output(AGENT, "ai_tool"));
    }

    connections
}

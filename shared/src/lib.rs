//! Domain types shared by the clinic operations tooling.

pub mod tenant;
pub mod workflow;

pub use tenant::{
    ClinicRef, ClinicType, NewProfessional, NewTenant, ProfessionalSummary, TenantSummary,
    DEFAULT_SLOT_MINUTES, DEFAULT_SPECIALTY, DEFAULT_TIMEZONE,
};
pub use workflow::{
    ConnectionTarget, Connections, CredentialRef, NodeOutputs, Position, Workflow, WorkflowNode,
    WorkflowSettings, STICKY_NOTE_TYPE,
};

//! n8n REST API access.

pub mod client;
pub mod retry;

pub use client::{ApiResponse, N8nClient, WorkflowListing};
pub use retry::RetryPolicy;

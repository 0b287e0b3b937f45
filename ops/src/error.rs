//! Error handling for the clinic operations CLI
//!
//! Every command fails fast: the first error aborts the run and is reported
//! once by `main` before exiting with status 1.

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {}", format_details(.details))]
    Validation { details: BTreeMap<String, Vec<String>> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Unreachable(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Workflow error: {0}")]
    Workflow(String),
}

impl OpsError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn json(path: impl AsRef<std::path::Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Unreachable(_) => "SERVICE_UNREACHABLE",
            Self::Io { .. } => "IO_ERROR",
            Self::Json { .. } => "INVALID_JSON",
            Self::Workflow(_) => "WORKFLOW_ERROR",
        }
    }
}

fn format_details(details: &BTreeMap<String, Vec<String>>) -> String {
    details
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type OpsResult<T> = Result<T, OpsError>;

/// Helper to collect several field errors before failing
pub struct ValidationBuilder {
    details: BTreeMap<String, Vec<String>>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self {
            details: BTreeMap::new(),
        }
    }

    pub fn error(mut self, field: &str, message: &str) -> Self {
        self.push(field, message);
        self
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.details
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn build(self) -> Option<OpsError> {
        if self.details.is_empty() {
            None
        } else {
            Some(OpsError::Validation {
                details: self.details,
            })
        }
    }

    pub fn finish(self) -> OpsResult<()> {
        match self.build() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.details.is_empty()
    }
}

impl Default for ValidationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

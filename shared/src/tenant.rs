use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_SPECIALTY: &str = "Geral";
pub const DEFAULT_SLOT_MINUTES: i32 = 30;

/// Kind of practice a tenant runs; stored lowercase in `tenant_config.clinic_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicType {
    Medical,
    Aesthetic,
    #[default]
    Mixed,
    Dental,
    Other,
}

impl ClinicType {
    pub const ALL: [ClinicType; 5] = [
        Self::Medical,
        Self::Aesthetic,
        Self::Mixed,
        Self::Dental,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Aesthetic => "aesthetic",
            Self::Mixed => "mixed",
            Self::Dental => "dental",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ClinicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClinicTypeError(pub String);

impl fmt::Display for ParseClinicTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid clinic type '{}' (expected one of: medical, aesthetic, mixed, dental, other)",
            self.0
        )
    }
}

impl std::error::Error for ParseClinicTypeError {}

impl FromStr for ClinicType {
    type Err = ParseClinicTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseClinicTypeError(s.to_string()))
    }
}

/// A tenant row ready to be inserted into `tenant_config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenant {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub tenant_slug: String,
    pub evolution_instance_name: String,
    pub clinic_name: String,
    pub clinic_type: ClinicType,
    pub timezone: String,
    pub system_prompt_patient: String,
    pub system_prompt_internal: String,
    pub system_prompt_confirmation: String,
    pub whatsapp_number: Option<String>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSummary {
    pub tenant_name: String,
    pub tenant_slug: String,
    pub evolution_instance_name: String,
    pub clinic_type: Option<String>,
    pub is_active: bool,
    pub subscription_tier: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of resolving `--clinic` against name, slug or instance.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicRef {
    pub tenant_id: Uuid,
    pub clinic_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfessional {
    pub professional_id: Uuid,
    pub tenant_id: Uuid,
    pub professional_name: String,
    pub professional_slug: String,
    pub specialty: String,
    pub google_calendar_id: Option<String>,
    pub slot_interval_minutes: i32,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalSummary {
    pub professional_name: String,
    pub professional_slug: String,
    pub specialty: Option<String>,
    pub google_calendar_id: Option<String>,
    pub is_active: bool,
    pub slot_interval_minutes: i32,
}

//! Input validation and identifier derivation for provisioning commands.

use crate::error::{OpsResult, ValidationBuilder};

pub const TENANT_SLUG_MAX: usize = 50;
pub const PROFESSIONAL_SLUG_MAX: usize = 100;
pub const SLOT_MINUTES_RANGE: std::ops::RangeInclusive<i32> = 5..=480;

/// URL-safe slug: lowercase, spaces become dashes, dots are dropped.
///
/// Truncation counts characters, not bytes, so accented names stay valid.
pub fn slugify(name: &str, max_chars: usize) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .replace('.', "")
        .chars()
        .take(max_chars)
        .collect()
}

/// Default Evolution API instance name for a clinic.
pub fn evolution_instance_name(name: &str) -> String {
    format!("{}_instance", name.to_lowercase().replace([' ', '-'], "_"))
}

pub fn validate_tenant(name: &str, slug: &str, instance: &str) -> OpsResult<()> {
    let mut v = ValidationBuilder::new();
    if name.trim().is_empty() {
        v.push("name", "name cannot be empty");
    }
    if slug.is_empty() {
        v.push("slug", "slug cannot be empty");
    } else if slug.chars().count() > TENANT_SLUG_MAX {
        v.push("slug", "slug must be 50 characters or less");
    }
    if instance.trim().is_empty() {
        v.push("evolution_instance", "evolution instance cannot be empty");
    }
    v.finish()
}

pub fn validate_professional(name: &str, slug: &str, slot_minutes: i32) -> OpsResult<()> {
    let mut v = ValidationBuilder::new();
    if name.trim().is_empty() {
        v.push("name", "name cannot be empty");
    }
    if slug.is_empty() {
        v.push("slug", "slug cannot be empty");
    } else if slug.chars().count() > PROFESSIONAL_SLUG_MAX {
        v.push("slug", "slug must be 100 characters or less");
    }
    if !SLOT_MINUTES_RANGE.contains(&slot_minutes) {
        v.push("slot_minutes", "slot_minutes must be between 5 and 480");
    }
    v.finish()
}

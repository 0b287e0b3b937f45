use clinic_shared::{ProfessionalSummary, TenantSummary};

use crate::ui::{cell, check_mark, rule};

pub fn tenant_table(tenants: &[TenantSummary]) -> Vec<String> {
    let mut lines = Vec::with_capacity(tenants.len() + 2);
    lines.push(format!(
        "{} {} {} {} {} {}",
        cell("Name", 30),
        cell("Slug", 20),
        cell("Instance", 25),
        cell("Type", 10),
        cell("Active", 8),
        cell("Tier", 12)
    ));
    lines.push(rule(115));

    for t in tenants {
        lines.push(format!(
            "{} {} {} {} {} {}",
            cell(&t.tenant_name, 30),
            cell(&t.tenant_slug, 20),
            cell(&t.evolution_instance_name, 25),
            cell(t.clinic_type.as_deref().unwrap_or("-"), 10),
            cell(check_mark(t.is_active), 8),
            cell(t.subscription_tier.as_deref().unwrap_or("-"), 12)
        ));
    }
    lines
}

pub fn professional_table(professionals: &[ProfessionalSummary]) -> Vec<String> {
    let mut lines = Vec::with_capacity(professionals.len() + 2);
    lines.push(format!(
        "{} {} {} {} {} {}",
        cell("Name", 25),
        cell("Slug", 20),
        cell("Specialty", 25),
        cell("Calendar", 10),
        cell("Active", 8),
        cell("Slot", 6)
    ));
    lines.push(rule(100));

    for p in professionals {
        let has_calendar = p
            .google_calendar_id
            .as_deref()
            .is_some_and(|c| !c.is_empty());
        lines.push(format!(
            "{} {} {} {} {} {}",
            cell(&p.professional_name, 25),
            cell(&p.professional_slug, 20),
            cell(p.specialty.as_deref().unwrap_or("-"), 25),
            cell(check_mark(has_calendar), 10),
            cell(check_mark(p.is_active), 8),
            cell(&p.slot_interval_minutes.to_string(), 6)
        ));
    }
    lines
}

use chrono::Utc;
use clinic_shared::{ProfessionalSummary, TenantSummary};
use uuid::Uuid;

use crate::provisioning::{self, build_professional, build_tenant, display, TenantStore};
use crate::tests::fixtures::{ProfessionalFixture, TenantFixture};
use crate::validation::TENANT_SLUG_MAX;

#[test]
fn test_fake_tenants_build_valid_rows() {
    for _ in 0..20 {
        let args = TenantFixture::args();
        let tenant = build_tenant(&args).unwrap();

        assert_eq!(tenant.tenant_name, args.name.trim());
        assert!(!tenant.tenant_slug.contains(' '));
        assert!(tenant.tenant_slug.chars().count() <= TENANT_SLUG_MAX);
        assert!(tenant.evolution_instance_name.ends_with("_instance"));
        assert!(tenant.system_prompt_internal.contains(&tenant.tenant_name));
    }
}

#[test]
fn test_long_names_truncate_slug_but_not_instance() {
    let mut args = TenantFixture::args();
    args.name = "Centro Integrado de Saúde e Estética Avançada do Litoral Norte".to_string();

    let tenant = build_tenant(&args).unwrap();
    assert_eq!(tenant.tenant_slug.chars().count(), TENANT_SLUG_MAX);
    assert_eq!(
        tenant.evolution_instance_name,
        "centro_integrado_de_saúde_e_estética_avançada_do_litoral_norte_instance"
    );
}

#[test]
fn test_slot_minutes_out_of_range_is_rejected() {
    let mut args = ProfessionalFixture::args("clinic");
    args.slot_minutes = 0;
    let err = build_professional(&args, Uuid::new_v4()).unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("slot_minutes"));
}

#[test]
fn test_explicit_professional_fields_are_kept() {
    let mut args = ProfessionalFixture::args("clinic");
    args.slug = Some("dra-ana".into());
    args.specialty = Some("Dermatologia".into());
    args.calendar_id = Some("ana@group.calendar.google.com".into());
    args.slot_minutes = 45;

    let professional = build_professional(&args, Uuid::new_v4()).unwrap();
    assert_eq!(professional.professional_slug, "dra-ana");
    assert_eq!(professional.specialty, "Dermatologia");
    assert_eq!(
        professional.google_calendar_id.as_deref(),
        Some("ana@group.calendar.google.com")
    );
    assert_eq!(professional.slot_interval_minutes, 45);
}

#[test]
fn test_tenant_table_shows_placeholders_for_missing_values() {
    let tenants = vec![TenantSummary {
        tenant_name: "Clinica Aurora".into(),
        tenant_slug: "clinica-aurora".into(),
        evolution_instance_name: "clinica_aurora_instance".into(),
        clinic_type: None,
        is_active: false,
        subscription_tier: None,
        created_at: Utc::now(),
    }];

    let lines = display::tenant_table(&tenants);
    let row = lines.last().unwrap();
    assert_eq!(
        row.split_whitespace().collect::<Vec<_>>(),
        vec!["Clinica", "Aurora", "clinica-aurora", "clinica_aurora_instance", "-", "❌", "-"]
    );
}

#[test]
fn test_professional_table_lists_every_row() {
    let professionals: Vec<ProfessionalSummary> = ["Ana", "Bruno"]
        .iter()
        .map(|name| ProfessionalSummary {
            professional_name: name.to_string(),
            professional_slug: name.to_lowercase(),
            specialty: Some("Geral".into()),
            google_calendar_id: None,
            is_active: true,
            slot_interval_minutes: 30,
        })
        .collect();

    let lines = display::professional_table(&professionals);
    assert!(lines.iter().any(|l| l.starts_with("Ana")));
    assert!(lines.iter().any(|l| l.starts_with("Bruno")));
}

/// Store whose pool never connects until a query runs.
fn offline_store() -> TenantStore {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://clinic@127.0.0.1:1/clinic")
        .unwrap();
    TenantStore::new(pool)
}

#[tokio::test]
async fn test_invalid_tenant_fails_before_any_query() {
    let mut args = TenantFixture::args();
    args.name = "   ".into();

    let err = provisioning::add_tenant(&offline_store(), &args).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_professional_fails_before_clinic_lookup() {
    let mut args = ProfessionalFixture::args("unknown-clinic");
    args.slot_minutes = 0;

    let err = provisioning::add_professional(&offline_store(), &args)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("slot_minutes"));
}

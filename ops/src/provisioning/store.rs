//! SQL access for tenants and professionals.
//!
//! Every statement is parameterized, and professional lookups are always
//! scoped by `tenant_id`.

use clinic_shared::{ClinicRef, NewProfessional, NewTenant, ProfessionalSummary, TenantSummary};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::OpsResult;

pub const EVOLUTION_API_KEY_SECRET: &str = "evolution_api_key";

pub struct TenantStore {
    pool: PgPool,
}

impl TenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether any tenant already uses this name, instance or slug.
    pub async fn tenant_conflict_exists(
        &self,
        name: &str,
        evolution_instance: &str,
        slug: &str,
    ) -> OpsResult<bool> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT tenant_id FROM tenant_config
            WHERE tenant_name = $1 OR evolution_instance_name = $2 OR tenant_slug = $3
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(evolution_instance)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing.is_some())
    }

    /// Insert the tenant and, when given, its Evolution API key in one transaction.
    pub async fn create_tenant(&self, tenant: &NewTenant, api_key: Option<&str>) -> OpsResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_tenant(&mut tx, tenant).await?;

        if let Some(key) = api_key {
            sqlx::query(
                r#"
                INSERT INTO tenant_secrets (tenant_id, secret_key, secret_value_encrypted, secret_type)
                VALUES ($1, $2, $3, 'api_key')
                "#,
            )
            .bind(tenant.tenant_id)
            .bind(EVOLUTION_API_KEY_SECRET)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant.tenant_id,
            slug = %tenant.tenant_slug,
            with_api_key = api_key.is_some(),
            "tenant created"
        );
        Ok(())
    }

    /// Resolve `--clinic` against tenant name, slug or Evolution instance.
    pub async fn find_clinic(&self, clinic: &str, active_only: bool) -> OpsResult<Option<ClinicRef>> {
        let sql = if active_only {
            r#"
            SELECT tenant_id, clinic_name FROM tenant_config
            WHERE is_active AND (tenant_name = $1 OR tenant_slug = $1 OR evolution_instance_name = $1)
            LIMIT 1
            "#
        } else {
            r#"
            SELECT tenant_id, clinic_name FROM tenant_config
            WHERE tenant_name = $1 OR tenant_slug = $1 OR evolution_instance_name = $1
            LIMIT 1
            "#
        };

        let clinic = sqlx::query_as::<_, ClinicRef>(sql)
            .bind(clinic)
            .fetch_optional(&self.pool)
            .await?;

        Ok(clinic)
    }

    pub async fn professional_slug_exists(&self, tenant_id: Uuid, slug: &str) -> OpsResult<bool> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT professional_id FROM professionals WHERE tenant_id = $1 AND professional_slug = $2",
        )
        .bind(tenant_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing.is_some())
    }

    pub async fn create_professional(&self, professional: &NewProfessional) -> OpsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO professionals (
                professional_id, tenant_id, professional_name, professional_slug,
                specialty, google_calendar_id, slot_interval_minutes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(professional.professional_id)
        .bind(professional.tenant_id)
        .bind(&professional.professional_name)
        .bind(&professional.professional_slug)
        .bind(&professional.specialty)
        .bind(&professional.google_calendar_id)
        .bind(professional.slot_interval_minutes)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            professional_id = %professional.professional_id,
            tenant_id = %professional.tenant_id,
            slug = %professional.professional_slug,
            "professional created"
        );
        Ok(())
    }

    pub async fn list_tenants(&self) -> OpsResult<Vec<TenantSummary>> {
        let tenants = sqlx::query_as::<_, TenantSummary>(
            r#"
            SELECT tenant_name, tenant_slug, evolution_instance_name,
                   clinic_type, is_active, subscription_tier, created_at
            FROM tenant_config
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    pub async fn list_professionals(&self, tenant_id: Uuid) -> OpsResult<Vec<ProfessionalSummary>> {
        let professionals = sqlx::query_as::<_, ProfessionalSummary>(
            r#"
            SELECT professional_name, professional_slug, specialty,
                   google_calendar_id, is_active, slot_interval_minutes
            FROM professionals
            WHERE tenant_id = $1
            ORDER BY display_order, professional_name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(professionals)
    }
}

async fn insert_tenant(tx: &mut Transaction<'_, Postgres>, tenant: &NewTenant) -> OpsResult<()> {
    sqlx::query(
        r#"
        INSERT INTO tenant_config (
            tenant_id, tenant_name, tenant_slug, evolution_instance_name,
            clinic_name, clinic_type, timezone,
            system_prompt_patient, system_prompt_internal, system_prompt_confirmation,
            whatsapp_number
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7,
            $8, $9, $10, $11
        )
        "#,
    )
    .bind(tenant.tenant_id)
    .bind(&tenant.tenant_name)
    .bind(&tenant.tenant_slug)
    .bind(&tenant.evolution_instance_name)
    .bind(&tenant.clinic_name)
    .bind(tenant.clinic_type.as_str())
    .bind(&tenant.timezone)
    .bind(&tenant.system_prompt_patient)
    .bind(&tenant.system_prompt_internal)
    .bind(&tenant.system_prompt_confirmation)
    .bind(&tenant.whatsapp_number)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

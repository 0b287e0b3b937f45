//! Tenant and professional provisioning commands.

pub mod display;
pub mod store;

use clinic_shared::{ClinicType, NewProfessional, NewTenant, DEFAULT_SPECIALTY};
use uuid::Uuid;

use crate::error::{OpsError, OpsResult};
use crate::ui;
use crate::validation::{self, PROFESSIONAL_SLUG_MAX, TENANT_SLUG_MAX};

pub use store::TenantStore;

#[derive(Debug, Clone)]
pub struct AddTenantArgs {
    pub name: String,
    pub evolution_instance: Option<String>,
    pub slug: Option<String>,
    pub whatsapp: Option<String>,
    pub apikey: Option<String>,
    pub timezone: String,
    pub clinic_type: ClinicType,
}

#[derive(Debug, Clone)]
pub struct AddProfessionalArgs {
    pub clinic: String,
    pub name: String,
    pub slug: Option<String>,
    pub specialty: Option<String>,
    pub calendar_id: Option<String>,
    pub slot_minutes: i32,
}

impl AddTenantArgs {
    fn identifiers(&self) -> (String, String, String) {
        let name = self.name.trim().to_string();
        let evolution_instance = non_empty(&self.evolution_instance)
            .unwrap_or_else(|| validation::evolution_instance_name(&name));
        let slug =
            non_empty(&self.slug).unwrap_or_else(|| validation::slugify(&name, TENANT_SLUG_MAX));
        (name, slug, evolution_instance)
    }

    /// Field checks that need no database.
    pub fn validate(&self) -> OpsResult<()> {
        let (name, slug, evolution_instance) = self.identifiers();
        validation::validate_tenant(&name, &slug, &evolution_instance)
    }
}

impl AddProfessionalArgs {
    fn identifiers(&self) -> (String, String) {
        let name = self.name.trim().to_string();
        let slug = non_empty(&self.slug)
            .unwrap_or_else(|| validation::slugify(&name, PROFESSIONAL_SLUG_MAX));
        (name, slug)
    }

    /// Field checks that need no database.
    pub fn validate(&self) -> OpsResult<()> {
        let (name, slug) = self.identifiers();
        validation::validate_professional(&name, &slug, self.slot_minutes)
    }
}

/// Build the tenant row from command arguments, deriving slug, instance and prompts.
pub fn build_tenant(args: &AddTenantArgs) -> OpsResult<NewTenant> {
    args.validate()?;
    let (name, slug, evolution_instance) = args.identifiers();

    Ok(NewTenant {
        tenant_id: Uuid::new_v4(),
        tenant_slug: slug,
        evolution_instance_name: evolution_instance,
        clinic_name: name.clone(),
        clinic_type: args.clinic_type,
        timezone: args.timezone.clone(),
        system_prompt_patient: format!(
            "Você é a atendente virtual da {}. Responda de forma objetiva e profissional.",
            name
        ),
        system_prompt_internal: format!("Você é o assistente interno da {} para a equipe.", name),
        system_prompt_confirmation: format!("Você envia lembretes de consulta da {}.", name),
        whatsapp_number: non_empty(&args.whatsapp),
        tenant_name: name,
    })
}

pub fn build_professional(args: &AddProfessionalArgs, tenant_id: Uuid) -> OpsResult<NewProfessional> {
    args.validate()?;
    let (name, slug) = args.identifiers();

    Ok(NewProfessional {
        professional_id: Uuid::new_v4(),
        tenant_id,
        professional_name: name,
        professional_slug: slug,
        specialty: non_empty(&args.specialty).unwrap_or_else(|| DEFAULT_SPECIALTY.to_string()),
        google_calendar_id: non_empty(&args.calendar_id),
        slot_interval_minutes: args.slot_minutes,
    })
}

pub async fn add_tenant(store: &TenantStore, args: &AddTenantArgs) -> OpsResult<NewTenant> {
    let tenant = build_tenant(args)?;

    if store
        .tenant_conflict_exists(
            &tenant.tenant_name,
            &tenant.evolution_instance_name,
            &tenant.tenant_slug,
        )
        .await?
    {
        return Err(OpsError::Conflict(
            "Tenant with that name, instance or slug already exists.".to_string(),
        ));
    }

    store
        .create_tenant(&tenant, non_empty(&args.apikey).as_deref())
        .await?;

    ui::success(&format!("Created tenant: {}", tenant.tenant_name));
    println!("   Slug: {}", tenant.tenant_slug);
    println!("   Evolution Instance: {}", tenant.evolution_instance_name);
    println!("   Tenant ID: {}", tenant.tenant_id);

    Ok(tenant)
}

pub async fn add_professional(
    store: &TenantStore,
    args: &AddProfessionalArgs,
) -> OpsResult<NewProfessional> {
    args.validate()?;

    let clinic = store
        .find_clinic(&args.clinic, true)
        .await?
        .ok_or_else(|| OpsError::NotFound(format!("Clinic '{}' not found.", args.clinic)))?;

    let professional = build_professional(args, clinic.tenant_id)?;

    if store
        .professional_slug_exists(clinic.tenant_id, &professional.professional_slug)
        .await?
    {
        return Err(OpsError::Conflict(format!(
            "Professional with slug '{}' already exists in this clinic.",
            professional.professional_slug
        )));
    }

    store.create_professional(&professional).await?;

    ui::success(&format!(
        "Created professional: {}",
        professional.professional_name
    ));
    println!("   Clinic: {}", clinic.clinic_name);
    println!("   Slug: {}", professional.professional_slug);
    println!("   Specialty: {}", professional.specialty);
    println!("   Professional ID: {}", professional.professional_id);

    Ok(professional)
}

pub async fn list_tenants(store: &TenantStore) -> OpsResult<()> {
    let tenants = store.list_tenants().await?;

    if tenants.is_empty() {
        println!("No tenants found.");
        return Ok(());
    }

    for line in display::tenant_table(&tenants) {
        println!("{}", line);
    }
    Ok(())
}

pub async fn list_professionals(store: &TenantStore, clinic: &str) -> OpsResult<()> {
    // Listing also shows inactive clinics.
    let clinic_ref = store
        .find_clinic(clinic, false)
        .await?
        .ok_or_else(|| OpsError::NotFound(format!("Clinic '{}' not found.", clinic)))?;

    let professionals = store.list_professionals(clinic_ref.tenant_id).await?;

    println!("\n📋 Professionals at {}\n", clinic_ref.clinic_name);
    if professionals.is_empty() {
        println!("No professionals found.");
        return Ok(());
    }

    for line in display::professional_table(&professionals) {
        println!("{}", line);
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

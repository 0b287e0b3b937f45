use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use clinic_shared::{ClinicType, DEFAULT_SLOT_MINUTES, DEFAULT_TIMEZONE};

mod config;
mod database;
mod error;
mod importer;
mod lint;
mod merge;
mod n8n;
mod provisioning;
mod ui;
mod validation;

use error::{OpsError, OpsResult};


#[derive(Parser, Debug)]
#[command(name = "clinic-ops", version, about = "Operational tooling for the multi-tenant clinic WhatsApp automation")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new tenant (clinic)
    AddTenant {
        /// Tenant display name
        #[arg(long)]
        name: String,
        /// Evolution API instance name (default: derived from name)
        #[arg(long)]
        evolution_instance: Option<String>,
        /// URL-safe slug (default: derived from name)
        #[arg(long)]
        slug: Option<String>,
        /// WhatsApp number
        #[arg(long)]
        whatsapp: Option<String>,
        /// API key, stored in tenant_secrets
        #[arg(long)]
        apikey: Option<String>,
        #[arg(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
        /// medical, aesthetic, mixed, dental or other
        #[arg(long, default_value = "mixed")]
        clinic_type: ClinicType,
    },
    /// Add a professional to a clinic
    AddProfessional {
        /// Clinic name, slug, or evolution instance name
        #[arg(long)]
        clinic: String,
        /// Professional full name
        #[arg(long)]
        name: String,
        /// URL-safe slug (default: derived from name)
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        /// Google Calendar ID
        #[arg(long)]
        calendar_id: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SLOT_MINUTES)]
        slot_minutes: i32,
    },
    /// List all tenants
    ListTenants,
    /// List professionals for a clinic
    ListProfessionals {
        /// Clinic name, slug, or evolution instance name
        #[arg(long)]
        clinic: String,
    },
    /// Push workflow JSON files into n8n
    ImportWorkflows {
        #[arg(long, default_value = "workflows")]
        dir: PathBuf,
        /// n8n base URL (default: N8N_URL)
        #[arg(long)]
        url: Option<String>,
        /// n8n API key (default: N8N_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Merge the state-machine and AI WhatsApp handlers into one workflow
    MergeHandlers {
        #[arg(long, default_value = "workflows/main")]
        workflows_dir: PathBuf,
        #[arg(long)]
        state_machine: Option<PathBuf>,
        #[arg(long)]
        ai: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Lint workflow JSON files against house conventions
    ValidateWorkflows {
        #[arg(long, default_value = "workflows")]
        workflows_dir: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect_store() -> OpsResult<provisioning::TenantStore> {
    let db = config::DatabaseConfig::from_env()?;
    let pool = database::create_pool(&db).await?;
    Ok(provisioning::TenantStore::new(pool))
}

/// Run a command; `Ok(false)` means it completed but reported failures.
async fn execute(command: Command) -> anyhow::Result<bool> {
    match command {
        Command::AddTenant {
            name,
            evolution_instance,
            slug,
            whatsapp,
            apikey,
            timezone,
            clinic_type,
        } => {
            let args = provisioning::AddTenantArgs {
                name,
                evolution_instance,
                slug,
                whatsapp,
                apikey,
                timezone,
                clinic_type,
            };
            args.validate()?;
            let store = connect_store().await?;
            provisioning::add_tenant(&store, &args).await?;
        }
        Command::AddProfessional {
            clinic,
            name,
            slug,
            specialty,
            calendar_id,
            slot_minutes,
        } => {
            let args = provisioning::AddProfessionalArgs {
                clinic,
                name,
                slug,
                specialty,
                calendar_id,
                slot_minutes,
            };
            args.validate()?;
            let store = connect_store().await?;
            provisioning::add_professional(&store, &args).await?;
        }
        Command::ListTenants => {
            let store = connect_store().await?;
            provisioning::list_tenants(&store).await?;
        }
        Command::ListProfessionals { clinic } => {
            let store = connect_store().await?;
            provisioning::list_professionals(&store, &clinic).await?;
        }
        Command::ImportWorkflows { dir, url, api_key } => {
            let n8n_config = config::N8nConfig::from_env().with_overrides(url, api_key);
            let client = n8n::N8nClient::new(&n8n_config)?;
            let summary = importer::run(&client, &dir).await?;
            return Ok(summary.is_success());
        }
        Command::MergeHandlers {
            workflows_dir,
            state_machine,
            ai,
            output,
        } => {
            let paths = merge::MergePaths::resolve(&workflows_dir, state_machine, ai, output);
            merge::run(&paths)?;
        }
        Command::ValidateWorkflows { workflows_dir } => {
            let report = lint::run(&workflows_dir)?;
            return Ok(report.is_ok());
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            if let Some(ops) = err.downcast_ref::<OpsError>() {
                tracing::error!(code = ops.error_code(), "command failed");
            }
            eprintln!("{} {}", "ERROR:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

use std::env;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::error::{OpsError, OpsResult};

pub const DEFAULT_N8N_URL: &str = "http://localhost:5678";

/// PostgreSQL connection settings.
///
/// `DATABASE_URL` wins when set; otherwise the libpq-style `PG*` variables are
/// read, falling back to the docker-compose `POSTGRES_*` names.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub connect_timeout: Duration,
}

/// n8n REST API settings
#[derive(Debug, Clone)]
pub struct N8nConfig {
    pub url: String,
    /// Sent as `X-N8N-API-KEY` when non-empty
    pub api_key: Option<String>,
}

impl DatabaseConfig {
    pub fn from_env() -> OpsResult<Self> {
        let url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let port = match env::var("PGPORT") {
            // PGPORT is ignored when DATABASE_URL is set
            Ok(port) if url.is_none() => port
                .parse()
                .map_err(|_| OpsError::Config(format!("PGPORT is not a valid port: {}", port)))?,
            _ => 5432,
        };

        Ok(DatabaseConfig {
            url,
            host: env::var("PGHOST").unwrap_or_else(|_| "localhost".to_string()),
            port,
            dbname: first_env(&["PGDATABASE", "POSTGRES_DB"])
                .unwrap_or_else(|| "n8n_clinic_db".to_string()),
            user: first_env(&["PGUSER", "POSTGRES_USER"])
                .unwrap_or_else(|| "n8n_clinic".to_string()),
            password: first_env(&["PGPASSWORD", "POSTGRES_PASSWORD"]).unwrap_or_default(),
            connect_timeout: Duration::from_secs(5),
        })
    }

    pub fn connect_options(&self) -> OpsResult<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse()
                .map_err(|e| OpsError::Config(format!("invalid DATABASE_URL: {}", e)));
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password))
    }

    /// Target description that is safe to log (no password).
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(url) => match url::Url::parse(url) {
                Ok(parsed) => format!(
                    "{}:{}{}",
                    parsed.host_str().unwrap_or("localhost"),
                    parsed.port().unwrap_or(5432),
                    parsed.path()
                ),
                Err(_) => "DATABASE_URL".to_string(),
            },
            None => format!("{}:{}/{}", self.host, self.port, self.dbname),
        }
    }
}

impl N8nConfig {
    pub fn from_env() -> Self {
        N8nConfig {
            url: env::var("N8N_URL").unwrap_or_else(|_| DEFAULT_N8N_URL.to_string()),
            api_key: env::var("N8N_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = url {
            self.url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self.url = self.url.trim_end_matches('/').to_string();
        self
    }
}

/// Value of the first variable in `names` that is set.
fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

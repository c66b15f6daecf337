use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// Which identity provider backs signup, login and token checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityConfig {
    Local {
        jwt_secret: String,
    },
    Hosted {
        url: String,
        anon_key: String,
        service_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub identity: IdentityConfig,
    pub gemini_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub heartbeat: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = var("SKILLS_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("SKILLS_PORT must be a port number")?;
        let heartbeat_secs: u64 = var("SKILLS_HEARTBEAT_SECS")
            .unwrap_or_else(|| "25".into())
            .parse()
            .context("SKILLS_HEARTBEAT_SECS must be a whole number of seconds")?;
        if heartbeat_secs == 0 {
            bail!("SKILLS_HEARTBEAT_SECS must be at least 1");
        }

        let identity = match var("SKILLS_AUTH_URL") {
            Some(url) => IdentityConfig::Hosted {
                url,
                anon_key: var("SKILLS_AUTH_KEY")
                    .context("SKILLS_AUTH_KEY is required when SKILLS_AUTH_URL is set")?,
                service_key: var("SKILLS_AUTH_SERVICE_KEY"),
            },
            None => {
                let jwt_secret = var("SKILLS_JWT_SECRET").unwrap_or_default();
                if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
                    bail!("SKILLS_JWT_SECRET is unset or still a placeholder");
                }
                IdentityConfig::Local { jwt_secret }
            }
        };

        Ok(Self {
            host: var("SKILLS_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("SKILLS_DB_PATH").unwrap_or_else(|| "skills.db".into()).into(),
            identity,
            gemini_api_key: var("GEMINI_API_KEY"),
            ai_model: var("SKILLS_AI_MODEL"),
            heartbeat: Duration::from_secs(heartbeat_secs),
        })
    }
}

use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Environment, File, FileFormat};
pub use duration::Duration;
use folio_models::email_address::EmailAddressWithName;
use serde::Deserialize;
use url::Url;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files, applied in order on top of the
/// defaults.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

/// Owner address used when `contact.email` is not configured.
pub const DEFAULT_CONTACT_EMAIL: &str = "wamandinumaneth@gmail.com";

/// Load the default config, the files listed in `FOLIO_CONFIG` and finally
/// any `FOLIO_*` environment variables.
pub fn load() -> anyhow::Result<Config> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Ok(extra) = std::env::var(CONFIG_PATH_ENV) {
        paths.extend(std::env::split_paths(&extra));
    }
    load_paths(&paths, Some(env_source()))
}

/// Environment overrides, e.g. `FOLIO_EMAIL__SMTP_URL` for `email.smtp_url`.
/// Empty variables count as unset.
pub fn env_source() -> Environment {
    Environment::with_prefix("FOLIO")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .ignore_empty(true)
}

pub fn load_paths(
    paths: &[impl AsRef<Path>],
    env: Option<Environment>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    match env {
        Some(env) => builder.add_source(env),
        None => builder,
    }
    .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed to call the API from a browser. CORS is disabled if
    /// this is empty.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub email: Option<EmailAddressWithName>,
    pub send_timeout: Duration,
}

impl ContactConfig {
    /// The address contact notifications are delivered to.
    pub fn recipient(&self) -> anyhow::Result<EmailAddressWithName> {
        match &self.email {
            Some(email) => Ok(email.clone()),
            None => DEFAULT_CONTACT_EMAIL
                .parse()
                .context("Invalid default contact email"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
    /// Upper bound for a single SMTP ping.
    pub ping_timeout: Duration,
}

/// Settings for `folio submit`, which talks to a running server.
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

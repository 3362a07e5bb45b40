//! Application-level configuration: the gate's route table, the missing-configuration
//! policy and the identity provider / database credentials.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::gate::{MissingConfigPolicy, RouteTable};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RACHA_BACK_CONFIG_PATH";
/// Environment variable selecting the [`MissingConfigPolicy`].
const MISSING_CONFIG_POLICY_ENV: &str = "GATE_MISSING_CONFIG";

const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
const SUPABASE_SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Path classification used by the request gate.
    pub routes: RouteTable,
    /// What the gate does when the identity provider is not configured.
    pub on_missing_config: MissingConfigPolicy,
}

impl AppConfig {
    /// Load the route table from disk, falling back to the built-in table, and read the
    /// gate policy from the environment.
    pub fn load() -> Self {
        let routes = load_route_table();
        let on_missing_config = match env::var(MISSING_CONFIG_POLICY_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|err: ConfigError| {
                warn!(error = %err, "ignoring gate policy override");
                MissingConfigPolicy::default()
            }),
            Err(_) => MissingConfigPolicy::default(),
        };

        Self {
            routes,
            on_missing_config,
        }
    }
}

/// Errors raised while reading configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The project URL is not an http(s) URL.
    #[error("`{var}` must be an http(s) URL, got `{value}`")]
    InvalidUrl { var: &'static str, value: String },
    /// Unknown value for [`MissingConfigPolicy`].
    #[error("unknown gate policy `{0}` (expected `allow` or `reject`)")]
    UnknownPolicy(String),
}

/// Credentials for the managed backend (auth + REST endpoints share the project URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project base URL without trailing slash.
    pub url: String,
    /// Public key sent as `apikey` on every request.
    pub anon_key: String,
    /// Server-side key used for table access when present.
    pub service_key: Option<String>,
}

impl SupabaseConfig {
    /// Build and validate a configuration from explicit values.
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_owned();
        if url.is_empty() {
            return Err(ConfigError::MissingEnvVar {
                var: SUPABASE_URL_ENV,
            });
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl {
                var: SUPABASE_URL_ENV,
                value: url,
            });
        }

        let anon_key = anon_key.into().trim().to_owned();
        if anon_key.is_empty() {
            return Err(ConfigError::MissingEnvVar {
                var: SUPABASE_ANON_KEY_ENV,
            });
        }

        Ok(Self {
            url,
            anon_key,
            service_key: service_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var(SUPABASE_URL_ENV).map_err(|_| ConfigError::MissingEnvVar {
            var: SUPABASE_URL_ENV,
        })?;
        let anon_key = env::var(SUPABASE_ANON_KEY_ENV).map_err(|_| ConfigError::MissingEnvVar {
            var: SUPABASE_ANON_KEY_ENV,
        })?;
        Self::new(url, anon_key, env::var(SUPABASE_SERVICE_KEY_ENV).ok())
    }

    /// Key used as bearer token for table access.
    pub fn data_key(&self) -> &str {
        self.service_key.as_deref().unwrap_or(&self.anon_key)
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    public_prefixes: Option<Vec<String>>,
    #[serde(default)]
    admin_root: Option<String>,
    #[serde(default)]
    admin_exempt: Option<String>,
    #[serde(default)]
    login_path: Option<String>,
    #[serde(default)]
    home_path: Option<String>,
    #[serde(default)]
    secure_cookies: Option<bool>,
}

impl From<RawConfig> for RouteTable {
    fn from(value: RawConfig) -> Self {
        let defaults = RouteTable::default();
        Self {
            public_prefixes: value.public_prefixes.unwrap_or(defaults.public_prefixes),
            admin_root: value.admin_root.unwrap_or(defaults.admin_root),
            admin_exempt: value.admin_exempt.unwrap_or(defaults.admin_exempt),
            login_path: value.login_path.unwrap_or(defaults.login_path),
            home_path: value.home_path.unwrap_or(defaults.home_path),
            secure_cookies: value.secure_cookies.unwrap_or(defaults.secure_cookies),
        }
    }
}

fn load_route_table() -> RouteTable {
    let path = resolve_config_path();
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                let routes: RouteTable = raw.into();
                info!(
                    path = %path.display(),
                    public = routes.public_prefixes.len(),
                    "loaded route table from config"
                );
                routes
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                RouteTable::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            RouteTable::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            RouteTable::default()
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

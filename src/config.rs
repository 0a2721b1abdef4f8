use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub firebase: FirebaseSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseSettings {
    pub database_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_alerts_path")]
    pub alerts: String,
    #[serde(default = "default_users_path")]
    pub users: String,
    #[serde(default = "default_notifications_path")]
    pub notifications: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            alerts: default_alerts_path(),
            users: default_users_path(),
            notifications: default_notifications_path(),
        }
    }
}

fn default_alerts_path() -> String { "alerts".to_string() }
fn default_users_path() -> String { "users".to_string() }
fn default_notifications_path() -> String { "notifications/send".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_snapshot_ttl_secs")]
    pub snapshot_ttl_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            max_radius_km: default_max_radius_km(),
            snapshot_ttl_secs: default_snapshot_ttl_secs(),
        }
    }
}

impl AlertSettings {
    /// Requested radius, or the default, capped at the configured maximum
    pub fn effective_radius(&self, requested: Option<f64>) -> f64 {
        requested
            .unwrap_or(self.default_radius_km)
            .min(self.max_radius_km)
    }
}

fn default_radius_km() -> f64 { 10.0 }
fn default_max_radius_km() -> f64 { 100.0 }
fn default_snapshot_ttl_secs() -> u64 { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from `config/` and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NEARBY__)
    /// 5. FIREBASE_DATABASE_URL / FIREBASE_AUTH_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration with `default` and `local` files taken from `dir`
    pub fn load_from<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let settings = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            // e.g., NEARBY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NEARBY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_firebase_env(settings)?.try_deserialize()
    }
}

/// Apply the conventional Firebase environment variables on top of the config
fn apply_firebase_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("FIREBASE_DATABASE_URL") {
        builder = builder.set_override("firebase.database_url", url)?;
    }
    if let Ok(token) = env::var("FIREBASE_AUTH_TOKEN") {
        builder = builder.set_override("firebase.auth_token", token)?;
    }

    builder.build()
}

//! Configuration module
//!
//! Settings are read from a TOML file (`~/.config/gatekeeper/config.toml`
//! by default). Every section has defaults, so a partial file or no file
//! at all still yields a usable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::settings::MAX_BADGE_TTL_SECS;
use crate::domain::SystemSettings;
use crate::shared::InfraError;

/// Application directory name under the user's config dir
const APP_DIR: &str = "gatekeeper";

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub site: SiteConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let cfg: AppConfig =
            toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the configuration back to disk, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), InfraError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InfraError::Config(format!("{}: {}", parent.display(), e)))?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| InfraError::Config(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.security.jwt_secret.len() < 16 {
            return Err(InfraError::Config(
                "security.jwt_secret must be at least 16 characters".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.site.latitude)
            || !(-180.0..=180.0).contains(&self.site.longitude)
        {
            return Err(InfraError::Config("site coordinates are out of range".into()));
        }
        if self.site.radius_m <= 0.0 {
            return Err(InfraError::Config("site.radius_m must be positive".into()));
        }
        if !(0..=MAX_BADGE_TTL_SECS).contains(&self.site.qr_token_ttl_secs) {
            return Err(InfraError::Config(format!(
                "site.qr_token_ttl_secs must be between 0 and {}",
                MAX_BADGE_TTL_SECS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL; takes precedence over `sqlite_path`
    pub url: Option<String>,
    pub sqlite_path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            sqlite_path: "./gatekeeper.db".to_string(),
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}?mode=rwc", self.sqlite_path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-gatekeeper-secret-key".to_string(),
            jwt_expiration_hours: 12,
        }
    }
}

/// Bootstrap administrator, created when the worker table is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub full_name: String,
    pub email: String,
    pub document_id: String,
    pub password: String,
    pub pin: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            full_name: "Administrator".to_string(),
            email: "admin@gatekeeper.local".to_string(),
            document_id: "ADMIN-0001".to_string(),
            password: "admin12345".to_string(),
            pin: "9999".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Defaults for the key-value system settings when a key was never stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub company_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub qr_token_ttl_secs: i64,
    pub inactivity_timeout_secs: i64,
    pub max_labor_hours: f64,
    pub effectiveness_threshold: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            company_name: "Gatekeeper".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            radius_m: 100.0,
            qr_token_ttl_secs: 0,
            inactivity_timeout_secs: 900,
            max_labor_hours: 12.0,
            effectiveness_threshold: 0.8,
        }
    }
}

impl From<&SiteConfig> for SystemSettings {
    fn from(site: &SiteConfig) -> Self {
        Self {
            geofence_lat: site.latitude,
            geofence_lon: site.longitude,
            geofence_radius_m: site.radius_m,
            qr_token_ttl_secs: site.qr_token_ttl_secs,
            inactivity_timeout_secs: site.inactivity_timeout_secs,
            max_labor_hours: site.max_labor_hours,
            effectiveness_threshold: site.effectiveness_threshold,
            company_name: site.company_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub check_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9090

            [site]
            latitude = -12.0464
            longitude = -77.0428
            radius_m = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.api_port, 9090);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.site.radius_m, 250.0);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn url_overrides_sqlite_path() {
        let mut db = DatabaseSection::default();
        assert_eq!(db.connection_url(), "sqlite://./gatekeeper.db?mode=rwc");
        db.url = Some("postgres://localhost/gk".into());
        assert_eq!(db.connection_url(), "postgres://localhost/gk");
    }

    #[test]
    fn rejects_out_of_range_origin() {
        let err = AppConfig::from_toml("[site]\nlatitude = 123.0").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_unbounded_badge_ttl() {
        let err = AppConfig::from_toml("[site]\nqr_token_ttl_secs = 9223372036854775807").unwrap_err();
        assert!(err.to_string().contains("qr_token_ttl_secs"));
    }

    #[test]
    fn rejects_short_jwt_secret() {
        assert!(AppConfig::from_toml("[security]\njwt_secret = \"short\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(cfg.server.api_port, 8080);
    }
}

//! # Configuration
//!
//! Settings come from an optional YAML file, then environment overrides.
//!
//! ```yaml
//! data_dir: "/srv/kas-rt/data"
//! bind_addr: "0.0.0.0:3000"
//! cors_origin: "http://localhost:8080"
//! lottery_seed: 2026
//! seed_admin_on_start: true
//! session_idle_minutes: 480
//! seed_admin:
//!   username: "admin"
//!   password: "admin123"
//!   display_name: "Bendahara RT"
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `KAS_RT_CONFIG` | path of the YAML file |
//! | `KAS_RT_DATA_DIR` | `data_dir` |
//! | `KAS_RT_BIND` | `bind_addr` |
//! | `KAS_RT_LOTTERY_SEED` | `lottery_seed` |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "KAS_RT_CONFIG";
pub const DATA_DIR_ENV: &str = "KAS_RT_DATA_DIR";
pub const BIND_ENV: &str = "KAS_RT_BIND";
pub const LOTTERY_SEED_ENV: &str = "KAS_RT_LOTTERY_SEED";

/// Account created when the user table is empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedAdminConfig {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl Default for SeedAdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            display_name: "Bendahara RT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folder holding one CSV file per table
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Fixed seed for reproducible lottery draws
    pub lottery_seed: Option<u64>,
    pub seed_admin_on_start: bool,
    pub seed_admin: SeedAdminConfig,
    /// Minutes without a request after which a login token stops working
    pub session_idle_minutes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_origin: None,
            lottery_seed: None,
            seed_admin_on_start: true,
            seed_admin: SeedAdminConfig::default(),
            session_idle_minutes: 480,
        }
    }
}

/// `<platform data dir>/kas-rt`, or `./data` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("kas-rt"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Apply environment overrides through `lookup` so tests need not touch
/// the process environment
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir.trim());
    }
    if let Some(bind) = lookup(BIND_ENV) {
        config.bind_addr = bind
            .trim()
            .parse()
            .with_context(|| format!("{BIND_ENV} is not a socket address: {bind}"))?;
    }
    if let Some(seed) = lookup(LOTTERY_SEED_ENV) {
        config.lottery_seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("{LOTTERY_SEED_ENV} is not an unsigned integer: {seed}"))?,
        );
    }
    Ok(config)
}

/// File named by `KAS_RT_CONFIG` (defaults otherwise) plus env overrides
pub fn load_app_configuration() -> Result<AppConfig> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            load_config(Path::new(&path))?
        }
        Err(_) => {
            info!("{} not set, using default configuration", CONFIG_ENV);
            AppConfig::default()
        }
    };
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kas-rt.yaml");
        fs::write(
            &path,
            "data_dir: /srv/rt05\nlottery_seed: 7\nseed_admin:\n  password: rahasia\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/rt05"));
        assert_eq!(config.lottery_seed, Some(7));
        assert_eq!(config.seed_admin.username, "admin");
        assert_eq!(config.seed_admin.password, "rahasia");
        assert_eq!(config.bind_addr, AppConfig::default().bind_addr);
        assert!(config.seed_admin_on_start);
        assert_eq!(config.session_idle_minutes, 480);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (DATA_DIR_ENV, "/tmp/kas"),
            (BIND_ENV, "0.0.0.0:8081"),
            (LOTTERY_SEED_ENV, "99"),
        ]
        .into_iter()
        .collect();

        let config = apply_env_overrides(AppConfig::default(), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/kas"));
        assert_eq!(config.bind_addr.port(), 8081);
        assert_eq!(config.lottery_seed, Some(99));
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let result = apply_env_overrides(AppConfig::default(), |key| {
            (key == LOTTERY_SEED_ENV).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("/definitely/not/here.yaml")).is_err());
    }
}

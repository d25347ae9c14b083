//! Process configuration from the environment.

use std::path::PathBuf;

/// Server configuration.
///
/// Everything has a dev-friendly default so `cargo run` works out of the box;
/// production deployments set the environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON collection files.
    pub data_dir: PathBuf,
    /// Seed admin credentials (created on first start if absent).
    pub admin_username: String,
    pub admin_password: String,
    /// Listen address, e.g. "0.0.0.0:8080".
    pub bind: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os("PAPERSTOCK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let admin_username =
            std::env::var("PAPERSTOCK_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        let admin_password = std::env::var("PAPERSTOCK_ADMIN_PASS").unwrap_or_else(|_| {
            tracing::warn!("PAPERSTOCK_ADMIN_PASS not set; using insecure dev default");
            "admin".to_string()
        });

        let bind =
            std::env::var("PAPERSTOCK_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            data_dir,
            admin_username,
            admin_password,
            bind,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("paperstock")
}

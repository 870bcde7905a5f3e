//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! with `dotenvy`). Command-line flags override them.

use std::env;
use std::path::PathBuf;

use crate::api::logs::log_warning;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

pub const ENV_PORT: &str = "CARLOAD_PORT";
pub const ENV_TEMPLATE: &str = "CARLOAD_TEMPLATE";
pub const ENV_MAX_UPLOAD_MB: &str = "CARLOAD_MAX_UPLOAD_MB";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port the server listens on.
    pub port: u16,
    /// Import template file; the bundled template when `None`.
    pub template_path: Option<PathBuf>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            template_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`. Invalid values fall back to the
    /// defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(lookup(ENV_PORT), ENV_PORT, defaults.port);
        let max_upload_mb = parse_or(lookup(ENV_MAX_UPLOAD_MB), ENV_MAX_UPLOAD_MB, DEFAULT_MAX_UPLOAD_MB);
        let template_path = lookup(ENV_TEMPLATE)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            port,
            template_path,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.port = p;
        }
        self
    }

    pub fn with_template(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.template_path = path;
        }
        self
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.trim().parse().unwrap_or_else(|_| {
            log_warning(format!("Ignoring invalid {}={:?}", key, s));
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_PORT, "8080"),
            (ENV_TEMPLATE, "/etc/carload/import-template.csv"),
            (ENV_MAX_UPLOAD_MB, "5"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.template_path, Some(PathBuf::from("/etc/carload/import-template.csv")));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[(ENV_PORT, "http"), (ENV_TEMPLATE, "  ")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.template_path, None);
    }

    #[test]
    fn test_flags_override() {
        let config = Config::default()
            .with_port(Some(9000))
            .with_template(None)
            .with_template(Some(PathBuf::from("custom.csv")));

        assert_eq!(config.port, 9000);
        assert_eq!(config.template_path, Some(PathBuf::from("custom.csv")));
    }
}

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Config file read when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "fyyur.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    /// Debug mode logs to the console only; otherwise logs also go to files.
    pub debug: bool,
    pub log_dir: PathBuf,
    pub static_dir: PathBuf,
    pub shows_per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("fyyur.db"),
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            log_dir: PathBuf::from("logs"),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
            shows_per_page: 50,
        }
    }
}

impl Config {
    /// Loads the config file (explicit path, or `fyyur.toml` when present) and
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Applies `FYYUR_*` (and `PORT`) overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup("FYYUR_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(host) = lookup("FYYUR_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_env("PORT", port)?;
        }
        if let Some(debug) = lookup("FYYUR_DEBUG") {
            self.debug = parse_flag("FYYUR_DEBUG", debug)?;
        }
        if let Some(log_dir) = lookup("FYYUR_LOG_DIR") {
            self.log_dir = PathBuf::from(log_dir);
        }
        if let Some(static_dir) = lookup("FYYUR_STATIC_DIR") {
            self.static_dir = PathBuf::from(static_dir);
        }
        if let Some(per_page) = lookup("FYYUR_SHOWS_PER_PAGE") {
            self.shows_per_page = parse_env("FYYUR_SHOWS_PER_PAGE", per_page)?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_values_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fyyur.toml");
        fs::write(&path, "database = \"data/app.db\"\nport = 8080\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.database, PathBuf::from("data/app.db"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.shows_per_page, 50);
    }

    #[test]
    fn test_default_static_dir_does_not_depend_on_cwd() {
        let config = Config::default();
        assert!(config.static_dir.is_absolute());
        assert!(config.static_dir.join("css/main.css").is_file());
        assert!(config.static_dir.join("js/delete.js").is_file());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("PORT", "9000"),
                ("FYYUR_DEBUG", "true"),
                ("FYYUR_SHOWS_PER_PAGE", "20"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.debug);
        assert_eq!(config.shows_per_page, 20);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_env_value_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

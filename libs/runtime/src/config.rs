use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration with strongly-typed sections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Core server configuration.
    pub server: ServerConfig,
    /// Document store (Firestore) configuration.
    pub firestore: StoreConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Document store settings. The credential is supplied either as a path to
/// a service-account JSON file or as the serialized JSON itself; the file
/// path wins when both are set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to a service-account JSON file, relative to the working directory.
    pub service_account_file: Option<String>,
    /// Inline serialized service-account JSON.
    pub service_account: Option<String>,
    /// Collection the submissions are written to.
    pub collection: String,
    /// Firestore emulator address ("host:port"). When set, requests go to
    /// the emulator over plain HTTP with its static bearer token.
    pub emulator_host: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            service_account_file: None,
            service_account: None,
            collection: "form_submissions".to_string(),
            emulator_host: None,
        }
    }
}

impl StoreConfig {
    /// True when at least one credential source is set.
    pub fn has_credential_source(&self) -> bool {
        self.service_account_file.is_some() || self.service_account.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub console_level: String, // "info", "debug", "error", "off"
    pub file: String,          // "logs/formbridge.log"; empty = console only
    pub file_level: String,
    pub max_backups: Option<usize>, // how many rotated files to keep
    pub max_size_mb: Option<u64>,   // max size of one file in MB
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment.
    /// Env keys use the `APP__` prefix, e.g. APP__SERVER__PORT=8080 maps to server.port.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("APP__").split("__"));

        figment
            .extract()
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(LoggingConfig::default);
        logging.console_level = match args.verbose {
            0 => logging.console_level.clone(), // keep
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
    }

    /// Apply the well-known deployment environment variables: PORT,
    /// FIREBASE_SERVICE_ACCOUNT_FILE and FIREBASE_SERVICE_ACCOUNT.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env_overrides`], with an injectable lookup.
    pub fn apply_env_overrides_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = get("PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(path) = get("FIREBASE_SERVICE_ACCOUNT_FILE").filter(|v| !v.trim().is_empty()) {
            self.firestore.service_account_file = Some(path);
        }
        if let Some(raw) = get("FIREBASE_SERVICE_ACCOUNT").filter(|v| !v.trim().is_empty()) {
            self.firestore.service_account = Some(raw);
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert!(config.firestore.service_account_file.is_none());
        assert!(config.firestore.service_account.is_none());
        assert!(!config.firestore.has_credential_source());
        assert_eq!(config.firestore.collection, "form_submissions");

        assert!(config.logging.is_none());
    }

    #[test]
    fn test_load_layered_full_yaml() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");

        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9090

firestore:
  service_account_file: "secrets/sa.json"
  collection: "intake"

logging:
  console_level: debug
  file: "logs/formbridge.log"
"#;
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);

        assert_eq!(
            config.firestore.service_account_file.as_deref(),
            Some("secrets/sa.json")
        );
        assert!(config.firestore.has_credential_source());
        assert_eq!(config.firestore.collection, "intake");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging.console_level, "debug");
        assert_eq!(logging.file, "logs/formbridge.log");
        // untouched fields keep their serde defaults
        assert_eq!(logging.file_level, "debug");
    }

    #[test]
    fn test_minimal_yaml_keeps_defaults() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");

        fs::write(&cfg_path, "server:\n  port: 8080\n").unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.firestore.collection, "form_submissions");
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = AppConfig::load_layered("/nonexistent/formbridge.yaml").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(&cfg_path, "server:\n  port: 8080\n  bogus: 1\n").unwrap();

        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AppConfig::default();

        let args = CliArgs {
            config: None,
            port: Some(3005),
            print_config: false,
            verbose: 2,
            mock: false,
        };

        config.apply_cli_overrides(&args);

        assert_eq!(config.server.port, 3005);
        assert_eq!(config.logging.as_ref().unwrap().console_level, "trace");
    }

    #[test]
    fn test_cli_verbose_levels_matrix() {
        for (verbose, expected) in [(0u8, "info"), (1, "debug"), (2, "trace"), (3, "trace")] {
            let mut config = AppConfig::default();
            let args = CliArgs {
                config: None,
                port: None,
                print_config: false,
                verbose,
                mock: false,
            };
            config.apply_cli_overrides(&args);
            assert_eq!(config.logging.as_ref().unwrap().console_level, expected);
        }
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "8088"),
            ("FIREBASE_SERVICE_ACCOUNT", r#"{"type":"service_account"}"#),
        ]);
        let mut config = AppConfig::default();
        config.apply_env_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 8088);
        assert_eq!(
            config.firestore.service_account.as_deref(),
            Some(r#"{"type":"service_account"}"#)
        );
        assert!(config.firestore.service_account_file.is_none());
    }

    #[test]
    fn test_env_overrides_ignore_invalid_and_empty() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "not-a-port"),
            ("FIREBASE_SERVICE_ACCOUNT_FILE", "   "),
        ]);
        let mut config = AppConfig::default();
        config.apply_env_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 3000);
        assert!(config.firestore.service_account_file.is_none());
    }

    #[test]
    fn test_to_yaml_roundtrip_basic() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        assert!(yaml.contains("firestore:"));

        let roundtrip: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(roundtrip.server.port, config.server.port);
        assert_eq!(roundtrip.firestore.collection, config.firestore.collection);
    }
}

//! Application configuration.
//!
//! Loaded once at start-up from a YAML file and handed out as
//! `Arc<AppConfig>`; nothing reads configuration from a global.
//!
//! ```yaml
//! Environment:
//!   name: local
//!   port: 8081
//!   apiBaseUrl: /api/v1
//!   serviceName: courier
//!   accessAllowedFrom: ["*"]
//!   auditLogExcludedPaths: ["/"]
//! Services:
//!   mongo:
//!     uri: mongodb://localhost:27017
//!     dbName: courier
//! ```
//!
//! The file path comes from `COURIER_CONFIG` (default
//! `config/default.yaml`); `SERVER_PORT` overrides the port.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const CONFIG_PATH_VAR: &str = "COURIER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";
pub const PORT_VAR: &str = "SERVER_PORT";

const DEFAULT_PORT: u16 = 8081;

/// Service environment settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub access_allowed_from: Vec<String>,
    #[serde(default)]
    pub open_endpoints: Vec<String>,
    #[serde(default)]
    pub locked_endpoints: Vec<String>,
    #[serde(default, skip_serializing)]
    pub internal_api_key: Option<String>,
    #[serde(default)]
    pub audit_log_excluded_paths: Vec<String>,
}

/// MongoDB connection settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Settings the logging sink needs.
#[derive(Clone, Debug, PartialEq)]
pub struct LoggerConfig {
    pub name: String,
    pub service_name: String,
    pub audit_log_excluded_paths: Vec<String>,
}

/// Everything the service is configured with.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub env_config: EnvConfig,
    pub mongo_config: MongoConfig,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(rename = "Environment")]
    environment: EnvConfig,
    #[serde(rename = "Services")]
    services: ServicesSection,
}

#[derive(Deserialize)]
struct ServicesSection {
    mongo: MongoConfig,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl AppConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(src: &str) -> Result<Self, Error> {
        let file: ConfigFile = serde_yaml::from_str(src)?;
        let config = Self { env_config: file.environment, mongo_config: file.services.mongo };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;
        Self::from_yaml(&src)
    }

    /// Loads from `COURIER_CONFIG` (or the default path), then applies the
    /// `SERVER_PORT` override.
    pub fn from_env() -> Result<Self, Error> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::load(&path)?;
        if let Ok(port) = env::var(PORT_VAR) {
            config.env_config.port = port
                .parse()
                .map_err(|_| Error::Configuration(format!("{PORT_VAR} must be a port number, got `{port}`")))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let env = &self.env_config;
        if env.name.is_empty() || env.api_base_url.is_empty() || env.service_name.is_empty() {
            return Err(Error::Configuration(
                "Please add all required configuration for the environment".to_owned(),
            ));
        }
        let mongo = &self.mongo_config;
        if mongo.uri.is_empty() || mongo.db_name.is_empty() || mongo.log_level.is_empty() {
            return Err(Error::Configuration(
                "Please add all required configuration for vendor: mongo".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            name: self.env_config.name.clone(),
            service_name: self.env_config.service_name.clone(),
            audit_log_excluded_paths: self.env_config.audit_log_excluded_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
Environment:
  name: test
  port: 9000
  apiBaseUrl: /api/v1
  serviceName: courier
  accessAllowedFrom: ["*"]
  internalApiKey: s3cret
  auditLogExcludedPaths: ["/"]
Services:
  mongo:
    uri: mongodb://localhost:27017
    dbName: courier
"#;

    #[test]
    fn parses_sample() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.env_config.port, 9000);
        assert_eq!(config.env_config.api_base_url, "/api/v1");
        assert_eq!(config.mongo_config.log_level, "info");
        assert!(!config.mongo_config.ssl);
        assert_eq!(config.logger_config().audit_log_excluded_paths, vec!["/".to_owned()]);
    }

    #[test]
    fn missing_required_environment_field_fails() {
        let src = SAMPLE.replace("  serviceName: courier\n", "");
        assert!(matches!(AppConfig::from_yaml(&src), Err(Error::Configuration(_))));
    }

    #[test]
    fn missing_mongo_db_name_fails() {
        let src = SAMPLE.replace("    dbName: courier\n", "");
        assert!(matches!(AppConfig::from_yaml(&src), Err(Error::Configuration(_))));
    }

    #[test]
    fn wrongly_typed_list_fails_to_parse() {
        let src = SAMPLE.replace(r#"accessAllowedFrom: ["*"]"#, "accessAllowedFrom: [[1]]");
        assert!(matches!(AppConfig::from_yaml(&src), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn api_key_is_never_serialized() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.env_config.internal_api_key.as_deref(), Some("s3cret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("\"envConfig\""));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.env_config.name, "test");
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(AppConfig::load("/nonexistent/courier.yaml"), Err(Error::Io(_))));
    }
}

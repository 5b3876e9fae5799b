//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::context::StartupContext;
use crate::config::schema::{RegistrationMode, RunMode, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    InvalidOverride { var: &'static str, value: String },
    Metadata(PathBuf, serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::InvalidOverride { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
            ConfigError::Metadata(path, e) => {
                write!(f, "Invalid service metadata in {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML configuration file. Validation happens after env overrides.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply deployment environment variables on top of the file configuration.
///
/// `lookup` abstracts `std::env::var` so tests never touch the process env.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(uri) = lookup("MONGO_URI") {
        config.database.uri = Some(uri);
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidOverride { var: "PORT", value: port.clone() })?;
    }
    if let Some(url) = lookup("CT_URL") {
        config.discovery.url = Some(url);
    }
    if let Some(token) = lookup("CT_TOKEN") {
        config.discovery.token = Some(token);
    }
    if let Some(url) = lookup("LOCAL_URL") {
        config.service.local_url = url;
    }
    if let Some(flag) = lookup("CT_REGISTER_MODE") {
        config.discovery.mode = RegistrationMode::from_flag(&flag);
    }
    if let Some(env) = lookup("NODE_ENV") {
        config.runtime.mode = RunMode::from_env_name(&env);
    }
    Ok(())
}

/// Read a JSON metadata document (service info or API descriptor).
pub fn load_metadata(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Metadata(path.to_path_buf(), e))
}

/// Resolve the full startup context: file (optional), env overrides,
/// validation, then registration metadata.
pub fn resolve_context<F>(path: Option<&Path>, lookup: F) -> Result<StartupContext, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    let info = load_metadata(Path::new(&config.discovery.info_path))?;
    let swagger = load_metadata(Path::new(&config.discovery.swagger_path))?;

    Ok(StartupContext::new(config, info, swagger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("MONGO_URI", "mongodb://db:27017/docs"),
                ("PORT", "4100"),
                ("CT_URL", "http://ct:9000"),
                ("CT_TOKEN", "t0k"),
                ("LOCAL_URL", "http://orchestrator:4100"),
                ("CT_REGISTER_MODE", "auto"),
                ("NODE_ENV", "prod"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database.connection_uri(), "mongodb://db:27017/docs");
        assert_eq!(config.listener.port, 4100);
        assert_eq!(config.discovery.url.as_deref(), Some("http://ct:9000"));
        assert_eq!(config.discovery.token.as_deref(), Some("t0k"));
        assert_eq!(config.service.local_url, "http://orchestrator:4100");
        assert_eq!(config.discovery.mode, RegistrationMode::Auto);
        assert!(config.runtime.mode.is_production());
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServiceConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { var: "PORT", .. }));
    }

    #[test]
    fn test_resolve_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let info_path = dir.path().join("register.json");
        let swagger_path = dir.path().join("swagger.json");
        std::fs::write(&info_path, r#"{"name":"doc-orchestrator","tags":["docs"]}"#).unwrap();
        std::fs::write(&swagger_path, r#"{"swagger":"2.0"}"#).unwrap();

        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "[discovery]\ninfo_path = {:?}\nswagger_path = {:?}\n\n[listener]\nport = 6100",
            info_path.to_str().unwrap(),
            swagger_path.to_str().unwrap()
        )
        .unwrap();

        let ctx = resolve_context(Some(&config_path), env(&[("PORT", "6200")])).unwrap();
        assert_eq!(ctx.bind_address, "0.0.0.0:6200");
        assert_eq!(ctx.info["tags"][0], "docs");
        assert_eq!(ctx.swagger["swagger"], "2.0");
    }

    #[test]
    fn test_missing_metadata_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[discovery]\ninfo_path = \"/nonexistent/register.json\"\n").unwrap();

        let err = resolve_context(Some(&config_path), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let err = resolve_context(None, env(&[("CT_REGISTER_MODE", "auto")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }
}

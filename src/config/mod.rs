mod types;

pub use types::*;

use crate::Result;
use std::env;
use tracing::debug;

pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
pub const BASE_URL_VAR: &str = "RAG_API_URL";
const DEFAULT_CONFIG_PATH: &str = "ragdesk.yaml";

/// Loads the configuration file named by `CONFIG_PATH` (or `ragdesk.yaml`),
/// then applies environment overrides.
///
/// A missing default file yields the built-in defaults; a missing file that
/// was named explicitly is an error.
pub async fn load() -> Result<Config> {
    let explicit = env::var(CONFIG_PATH_VAR).ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => from_yaml(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(&mut config, env::var(BASE_URL_VAR).ok());
    validate(&config)?;

    Ok(config)
}

pub fn from_yaml(config_str: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to an all-defaults struct.
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(config_str)?)
}

fn apply_env_overrides(config: &mut Config, base_url: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        debug!("Base URL overridden from {}: {}", BASE_URL_VAR, url);
        config.api.base_url = url.trim().to_string();
    }
}

pub fn validate(config: &Config) -> Result<()> {
    let base = config.api.base();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(crate::Error::config(format!(
            "base_url must start with http:// or https://, got '{}'",
            config.api.base_url
        )));
    }
    if config.api.upload_timeout_ms == 0 {
        return Err(crate::Error::config("upload_timeout_ms must be positive"));
    }
    if config.api.query_timeout_ms == Some(0) {
        return Err(crate::Error::config("query_timeout_ms must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.upload_timeout_ms, 120_000);
        assert_eq!(config.api.query_timeout_ms, None);
        assert_eq!(config.api.answer_fields, vec!["answer", "response", "message"]);
        assert_eq!(config.api.document_scope, DocumentScope::IfAvailable);
        assert_eq!(config.logs.level, "info");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = from_yaml(
            r#"
api:
  base_url: "https://kb.example.com/"
  document_scope: required
  answer_fields: ["result"]
"#,
        )
        .unwrap();
        assert_eq!(config.api.base(), "https://kb.example.com");
        assert_eq!(config.api.document_scope, DocumentScope::Required);
        assert_eq!(config.api.answer_fields, vec!["result"]);
        assert_eq!(config.api.upload_timeout_ms, 120_000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = from_yaml("  \n").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let mut api = ApiConfig::default();
        api.base_url = "http://host:9000//".to_string();
        assert_eq!(api.endpoint("/chat"), "http://host:9000/chat");
        assert_eq!(api.endpoint("documents/upload"), "http://host:9000/documents/upload");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, Some(" https://prod.example.com ".to_string()));
        assert_eq!(config.api.base_url, "https://prod.example.com");

        apply_env_overrides(&mut config, Some("   ".to_string()));
        assert_eq!(config.api.base_url, "https://prod.example.com");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8000".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.api.query_timeout_ms = Some(0);
        assert!(validate(&config).is_err());

        assert!(validate(&Config::default()).is_ok());
    }
}

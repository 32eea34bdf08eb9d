//! Configuration management
//!
//! Configuration is read once at process start and handed to the components that
//! need it. Missing Azure OpenAI settings never stop the process from starting; they
//! are only checked when a chat request is dispatched.

use crate::error::{ErrorContext, Talk2CodeError, Talk2CodeResult};
use crate::logging::LoggingConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Detail reported when the endpoint or deployment is not configured
pub const CONFIGURATION_MISSING: &str = "Azure OpenAI configuration missing";

pub const DEFAULT_API_VERSION: &str = "2024-02-01";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Largest accepted `server.max_upload_mb`
pub const MAX_UPLOAD_MB_LIMIT: usize = 4096;

/// Where environment variables are read from.
///
/// `Map` lets tests supply variables without touching the process environment.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Map(HashMap<String, String>),
}

impl EnvSource {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a variable, treating empty values as unset
    pub fn var(&self, key: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(key).ok(),
            EnvSource::Map(map) => map.get(key).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn environment(&self, prefix: &str) -> Environment {
        let env = Environment::with_prefix(prefix).prefix_separator("_");
        match self {
            EnvSource::Process => env,
            EnvSource::Map(map) => env.source(Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<config::Map<String, String>>(),
            )),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows every origin
    pub cors_allowed_origins: Vec<String>,
    /// Request body limit, covers archive uploads
    pub max_upload_mb: usize,
    /// Whether upstream error text is echoed back to API callers
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            max_upload_mb: 50,
            expose_error_details: true,
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Truncation thresholds applied when rendering a repository graph into a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    pub max_nodes: usize,
    pub max_links: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_nodes: 20,
            max_links: 15,
        }
    }
}

/// Azure OpenAI settings as read from `AZURE_OPENAI_*`
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AzureOpenAiConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Azure OpenAI settings with the required values guaranteed present
#[derive(Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureSettings")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AzureOpenAiConfig {
    pub fn from_env(env: &EnvSource) -> Talk2CodeResult<Self> {
        Config::builder()
            .add_source(env.environment("AZURE_OPENAI"))
            .build()
            .and_then(|c| c.try_deserialize::<AzureOpenAiConfig>())
            .map_err(|e| config_load_error(e, "load_azure_openai"))
    }

    /// Check that endpoint and deployment are present.
    ///
    /// The API key stays optional: its absence selects ambient credentials.
    pub fn resolve(&self) -> Talk2CodeResult<AzureSettings> {
        match (non_empty(&self.endpoint), non_empty(&self.deployment)) {
            (Some(endpoint), Some(deployment)) => Ok(AzureSettings {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                deployment,
                api_key: non_empty(&self.api_key),
                api_version: self.api_version.clone(),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            }),
            (endpoint, deployment) => {
                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push("AZURE_OPENAI_ENDPOINT");
                }
                if deployment.is_none() {
                    missing.push("AZURE_OPENAI_DEPLOYMENT");
                }
                Err(Talk2CodeError::Config {
                    message: CONFIGURATION_MISSING.to_string(),
                    source: None,
                    context: ErrorContext::new("azure_openai_config")
                        .with_operation("resolve")
                        .with_metadata("missing", &missing.join(","))
                        .with_suggestion("Set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_DEPLOYMENT"),
                })
            }
        }
    }
}

/// Inputs for the ambient credential chain used when no API key is configured
#[derive(Clone, Default)]
pub struct AmbientCredentialConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub authority_host: String,
    /// App Service / Functions managed identity endpoint
    pub identity_endpoint: Option<String>,
    pub identity_header: Option<String>,
    pub exclude_managed_identity: bool,
    pub exclude_cli: bool,
}

impl fmt::Debug for AmbientCredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientCredentialConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("authority_host", &self.authority_host)
            .field("identity_endpoint", &self.identity_endpoint)
            .field("exclude_managed_identity", &self.exclude_managed_identity)
            .field("exclude_cli", &self.exclude_cli)
            .finish()
    }
}

impl AmbientCredentialConfig {
    pub fn from_env(env: &EnvSource) -> Self {
        let flag = |key: &str| {
            env.var(key)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        Self {
            tenant_id: env.var("AZURE_TENANT_ID"),
            client_id: env.var("AZURE_CLIENT_ID"),
            client_secret: env.var("AZURE_CLIENT_SECRET"),
            authority_host: env
                .var("AZURE_AUTHORITY_HOST")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            identity_endpoint: env.var("IDENTITY_ENDPOINT"),
            identity_header: env.var("IDENTITY_HEADER"),
            exclude_managed_identity: flag("TALK2CODE_EXCLUDE_MANAGED_IDENTITY"),
            exclude_cli: flag("TALK2CODE_EXCLUDE_CLI_CREDENTIAL"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub context: ContextLimits,
    #[serde(skip)]
    pub azure: AzureOpenAiConfig,
    #[serde(skip)]
    pub credentials: AmbientCredentialConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// `TALK2CODE_*` variables override the file, with `__` separating nested keys
    /// (`TALK2CODE_SERVER__PORT=9000`).
    pub fn load(file: Option<&Path>, env: &EnvSource) -> Talk2CodeResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            );
        }

        builder = builder.add_source(
            env.environment("TALK2CODE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_allowed_origins")
                .with_list_parse_key("logging.filter_directives"),
        );

        let mut config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| config_load_error(e, "load"))?;

        config.azure = AzureOpenAiConfig::from_env(env)?;
        config.credentials = AmbientCredentialConfig::from_env(env);

        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment only
    pub fn from_env() -> Talk2CodeResult<Self> {
        Self::load(None, &EnvSource::Process)
    }

    /// Validate configuration
    pub fn validate(&self) -> Talk2CodeResult<()> {
        if self.server.max_upload_mb == 0 {
            return Err(Talk2CodeError::Config {
                message: "server.max_upload_mb must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set server.max_upload_mb to a positive value"),
            });
        }

        if self.server.max_upload_mb > MAX_UPLOAD_MB_LIMIT {
            return Err(Talk2CodeError::Config {
                message: format!(
                    "server.max_upload_mb must be at most {}",
                    MAX_UPLOAD_MB_LIMIT
                ),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Lower server.max_upload_mb"),
            });
        }

        if self.azure.request_timeout_secs == 0 {
            return Err(Talk2CodeError::Config {
                message: "AZURE_OPENAI_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Unset it to use the 60 second default"),
            });
        }

        Ok(())
    }
}

fn config_load_error(error: config::ConfigError, operation: &str) -> Talk2CodeError {
    Talk2CodeError::Config {
        message: format!("Failed to load configuration: {}", error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("config")
            .with_operation(operation)
            .with_suggestion("Check TOML syntax and TALK2CODE_* variable values"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_environment() {
        let config = AppConfig::load(None, &EnvSource::from_pairs(Vec::<(String, String)>::new()))
            .unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:8000");
        assert!(config.server.cors_allowed_origins.is_empty());
        assert!(config.server.expose_error_details);
        assert_eq!(config.context, ContextLimits::default());
        assert_eq!(config.context.max_nodes, 20);
        assert_eq!(config.context.max_links, 15);
        assert!(config.azure.endpoint.is_none());
        assert_eq!(config.azure.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_azure_settings_from_env_source() {
        let env = EnvSource::from_pairs([
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
            ("AZURE_OPENAI_REQUEST_TIMEOUT_SECS", "15"),
        ]);

        let azure = AzureOpenAiConfig::from_env(&env).unwrap();
        let settings = azure.resolve().unwrap();

        assert_eq!(settings.endpoint, "https://example.openai.azure.com");
        assert_eq!(settings.deployment, "gpt-4o");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert!(!format!("{:?}", settings).contains("secret"));
    }

    #[test]
    fn test_resolve_reports_missing_configuration() {
        let azure = AzureOpenAiConfig {
            endpoint: Some("https://example.openai.azure.com".to_string()),
            deployment: Some("   ".to_string()),
            ..Default::default()
        };

        let error = azure.resolve().unwrap_err();
        assert_eq!(error.message(), CONFIGURATION_MISSING);
        assert_eq!(
            error.context().unwrap().metadata.get("missing").unwrap(),
            "AZURE_OPENAI_DEPLOYMENT"
        );
    }

    #[test]
    fn test_missing_api_key_is_not_an_error() {
        let azure = AzureOpenAiConfig {
            endpoint: Some("https://example.openai.azure.com".to_string()),
            deployment: Some("gpt-4o".to_string()),
            api_key: Some(String::new()),
            ..Default::default()
        };

        assert!(azure.resolve().unwrap().api_key.is_none());
    }

    #[test]
    fn test_server_overrides_from_env() {
        let env = EnvSource::from_pairs([
            ("TALK2CODE_SERVER__PORT", "9100"),
            ("TALK2CODE_SERVER__EXPOSE_ERROR_DETAILS", "false"),
            (
                "TALK2CODE_SERVER__CORS_ALLOWED_ORIGINS",
                "http://localhost:5173,https://app.example.com",
            ),
        ]);

        let config = AppConfig::load(None, &env).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(!config.server.expose_error_details);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_ambient_credentials_from_env() {
        let env = EnvSource::from_pairs([
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET", "shh"),
            ("TALK2CODE_EXCLUDE_CLI_CREDENTIAL", "true"),
        ]);

        let credentials = AmbientCredentialConfig::from_env(&env);
        assert_eq!(credentials.tenant_id.as_deref(), Some("tenant"));
        assert_eq!(credentials.authority_host, DEFAULT_AUTHORITY_HOST);
        assert!(credentials.exclude_cli);
        assert!(!credentials.exclude_managed_identity);
        assert!(!format!("{:?}", credentials).contains("shh"));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let mut config = AppConfig::default();
        config.server.max_upload_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_limit_upper_bound() {
        let mut config = AppConfig::default();
        config.server.max_upload_mb = MAX_UPLOAD_MB_LIMIT;
        assert!(config.validate().is_ok());

        config.server.max_upload_mb = usize::MAX / 1024;
        let error = config.validate().unwrap_err();
        assert!(error.message().contains("at most"));
    }
}

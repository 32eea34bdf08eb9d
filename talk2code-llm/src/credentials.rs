//! Credential providers for the Azure OpenAI backend
//!
//! A configured API key always wins. Without one, a token is obtained from the
//! ambient environment, trying the same sources as Azure's default credential:
//! a service principal from environment variables, managed identity, then the
//! Azure CLI. The choice is made once per call and never retried on the other branch.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use talk2code_core::{
    AmbientCredentialConfig, AzureSettings, ErrorContext, Talk2CodeError, Talk2CodeResult,
};
use tracing::{debug, info};

/// OAuth2 scope for Azure OpenAI / Cognitive Services
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Proof of identity attached to a backend request
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Sent as the `api-key` header
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`
    Bearer(String),
}

impl Authorization {
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Authorization::ApiKey(key) => request.header("api-key", key),
            Authorization::Bearer(token) => request.bearer_auth(token),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Authorization::ApiKey(_) => "api-key",
            Authorization::Bearer(_) => "bearer",
        }
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Authorization({}, <redacted>)", self.scheme())
    }
}

/// How the dispatcher authenticates against the backend
#[derive(Clone)]
pub enum CredentialProvider {
    StaticKey(String),
    AmbientDefault(DefaultCredentialChain),
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialProvider::StaticKey(_) => write!(f, "StaticKey(<redacted>)"),
            CredentialProvider::AmbientDefault(chain) => {
                f.debug_tuple("AmbientDefault").field(chain).finish()
            }
        }
    }
}

impl CredentialProvider {
    /// Pick the branch from key presence alone
    pub fn select(settings: &AzureSettings, ambient: &AmbientCredentialConfig) -> Self {
        match &settings.api_key {
            Some(key) => CredentialProvider::StaticKey(key.clone()),
            None => {
                CredentialProvider::AmbientDefault(DefaultCredentialChain::from_config(ambient))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CredentialProvider::StaticKey(_) => "static_key",
            CredentialProvider::AmbientDefault(_) => "ambient_default",
        }
    }

    pub async fn authorize(&self, http: &reqwest::Client) -> Talk2CodeResult<Authorization> {
        match self {
            CredentialProvider::StaticKey(key) => Ok(Authorization::ApiKey(key.clone())),
            CredentialProvider::AmbientDefault(chain) => {
                chain.get_token(http).await.map(Authorization::Bearer)
            }
        }
    }
}

/// One place a token can come from
#[derive(Clone)]
pub enum CredentialSource {
    /// Service principal from `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// App Service / Functions identity endpoint
    AppServiceIdentity { endpoint: String, header: String },
    /// Instance metadata service on Azure VMs, AKS and Container Apps
    InstanceMetadata { client_id: Option<String> },
    AzureCli,
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::ClientSecret { .. } => "EnvironmentCredential",
            CredentialSource::AppServiceIdentity { .. } => {
                "ManagedIdentityCredential(app-service)"
            }
            CredentialSource::InstanceMetadata { .. } => "ManagedIdentityCredential(imds)",
            CredentialSource::AzureCli => "AzureCliCredential",
        }
    }

    async fn get_token(&self, http: &reqwest::Client) -> Result<String, String> {
        match self {
            CredentialSource::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!(
                    "{}/{}/oauth2/v2.0/token",
                    authority_host.trim_end_matches('/'),
                    tenant_id
                );
                let request = http.post(&url).form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", COGNITIVE_SERVICES_SCOPE),
                ]);
                fetch_token(request).await
            }
            CredentialSource::AppServiceIdentity { endpoint, header } => {
                let request = http
                    .get(endpoint)
                    .query(&[
                        ("resource", COGNITIVE_SERVICES_RESOURCE),
                        ("api-version", "2019-08-01"),
                    ])
                    .header("X-IDENTITY-HEADER", header);
                fetch_token(request).await
            }
            CredentialSource::InstanceMetadata { client_id } => {
                let mut request = http
                    .get(IMDS_TOKEN_ENDPOINT)
                    .query(&[
                        ("resource", COGNITIVE_SERVICES_RESOURCE),
                        ("api-version", "2018-02-01"),
                    ])
                    .header("Metadata", "true")
                    .timeout(IMDS_PROBE_TIMEOUT);
                if let Some(client_id) = client_id {
                    request = request.query(&[("client_id", client_id.as_str())]);
                }
                fetch_token(request).await
            }
            CredentialSource::AzureCli => azure_cli_token().await,
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

async fn fetch_token(request: reqwest::RequestBuilder) -> Result<String, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {}", status.as_u16(), body));
    }

    response
        .json::<TokenResponse>()
        .await
        .map(|t| t.access_token)
        .map_err(|e| format!("invalid token response: {}", e))
}

async fn azure_cli_token() -> Result<String, String> {
    let program = if cfg!(windows) { "az.cmd" } else { "az" };

    let output = run_cli(
        program,
        &[
            "account",
            "get-access-token",
            "--resource",
            COGNITIVE_SERVICES_RESOURCE,
            "--output",
            "json",
        ],
    )
    .await?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }

    serde_json::from_slice::<CliTokenResponse>(&output.stdout)
        .map(|t| t.access_token)
        .map_err(|e| format!("invalid az output: {}", e))
}

/// Run a CLI to completion; the child is killed if the future is dropped first
async fn run_cli(program: &str, args: &[&str]) -> Result<std::process::Output, String> {
    tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("failed to run {}: {}", program, e))
}

/// Ordered list of ambient credential sources; the first to produce a token wins
#[derive(Debug, Clone, Default)]
pub struct DefaultCredentialChain {
    sources: Vec<CredentialSource>,
}

impl DefaultCredentialChain {
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self { sources }
    }

    pub fn from_config(config: &AmbientCredentialConfig) -> Self {
        let mut sources = Vec::new();

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            &config.tenant_id,
            &config.client_id,
            &config.client_secret,
        ) {
            sources.push(CredentialSource::ClientSecret {
                authority_host: config.authority_host.clone(),
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            });
        }

        if !config.exclude_managed_identity {
            match (&config.identity_endpoint, &config.identity_header) {
                (Some(endpoint), Some(header)) => {
                    sources.push(CredentialSource::AppServiceIdentity {
                        endpoint: endpoint.clone(),
                        header: header.clone(),
                    })
                }
                _ => sources.push(CredentialSource::InstanceMetadata {
                    client_id: config.client_id.clone(),
                }),
            }
        }

        if !config.exclude_cli {
            sources.push(CredentialSource::AzureCli);
        }

        Self { sources }
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// Fetch a bearer token for Azure OpenAI
    pub async fn get_token(&self, http: &reqwest::Client) -> Talk2CodeResult<String> {
        if self.sources.is_empty() {
            return Err(Talk2CodeError::Authentication {
                message: "No ambient credential source is available".to_string(),
                context: ErrorContext::new("credentials")
                    .with_operation("get_token")
                    .with_suggestion("Set AZURE_OPENAI_API_KEY or configure a service principal"),
            });
        }

        let mut failures = Vec::new();

        for source in &self.sources {
            debug!("Requesting token from {}", source.name());
            match source.get_token(http).await {
                Ok(token) => {
                    info!("Acquired Azure token from {}", source.name());
                    return Ok(token);
                }
                Err(reason) => {
                    debug!("{} unavailable: {}", source.name(), reason);
                    failures.push(format!("{}: {}", source.name(), reason));
                }
            }
        }

        Err(Talk2CodeError::Authentication {
            message: format!(
                "DefaultAzureCredential failed to retrieve a token. {}",
                failures.join("; ")
            ),
            context: ErrorContext::new("credentials")
                .with_operation("get_token")
                .with_suggestion("Run 'az login' or set AZURE_OPENAI_API_KEY"),
        })
    }
}

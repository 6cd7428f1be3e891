use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::connection_string::ConnectionString;
use crate::error::RegistryError;
use crate::model::Configuration;
use crate::{sas, RegistryClient};

pub const DEFAULT_API_VERSION: &str = "2021-04-12";

#[derive(Debug, Clone)]
pub struct HttpRegistryConfig {
    pub connection: ConnectionString,
    /// Base URL override; defaults to `https://<HostName>`.
    pub endpoint: Option<String>,
    pub api_version: String,
    pub token_ttl: Duration,
    pub request_timeout: Duration,
}

impl HttpRegistryConfig {
    pub fn new(connection: ConnectionString) -> Self {
        Self {
            connection,
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            token_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Registry client speaking the IoT Hub service REST API.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base_url: Url,
    config: HttpRegistryConfig,
}

impl HttpRegistryClient {
    pub fn new(config: HttpRegistryConfig) -> Result<Self, RegistryError> {
        let raw_base = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}", config.connection.host_name()),
        };
        let base_url = Url::parse(&raw_base).map_err(|err| {
            RegistryError::Configuration(format!("invalid registry endpoint '{raw_base}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::Configuration(format!(
                "registry endpoint '{raw_base}' cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| RegistryError::Configuration(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorization(&self) -> Result<String, RegistryError> {
        let expiry = Utc::now().timestamp() + self.config.token_ttl.as_secs() as i64;
        sas::generate_token(&self.config.connection, expiry)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        url
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn create_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<Configuration, RegistryError> {
        let url = self.url(&["configurations", configuration.id.as_str()]);
        debug!(configuration_id = %configuration.id, %url, "submitting configuration");

        let response = self
            .client
            .put(url)
            .header(AUTHORIZATION, self.authorization()?)
            .json(configuration)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success(response, Some(&configuration.id)).await?;
        serde_json::from_str(&body).map_err(|err| RegistryError::Decode(err.to_string()))
    }

    async fn list_configurations(
        &self,
        max_count: usize,
    ) -> Result<Vec<Configuration>, RegistryError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let mut url = self.url(&["configurations"]);
        url.query_pairs_mut()
            .append_pair("top", &max_count.to_string());
        debug!(max_count, %url, "listing configurations");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization()?)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success(response, None).await?;
        let mut configurations: Vec<Configuration> =
            serde_json::from_str(&body).map_err(|err| RegistryError::Decode(err.to_string()))?;
        configurations.truncate(max_count);
        Ok(configurations)
    }
}

async fn read_success(
    response: Response,
    configuration_id: Option<&str>,
) -> Result<String, RegistryError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if status.is_success() {
        return Ok(body);
    }

    warn!(status = status.as_u16(), body = %body, "registry request failed");
    Err(classify_status(status, body, configuration_id))
}

fn classify_status(status: StatusCode, body: String, configuration_id: Option<&str>) -> RegistryError {
    match (status.as_u16(), configuration_id) {
        (401 | 403, _) => RegistryError::Auth(body),
        (409 | 412, Some(id)) => RegistryError::Conflict { id: id.to_string() },
        (408 | 429 | 500..=599, _) => {
            RegistryError::Transient(format!("status {}: {}", status.as_u16(), body))
        }
        (code, _) => RegistryError::Unexpected { status: code, body },
    }
}

fn transport_error(err: reqwest::Error) -> RegistryError {
    if err.is_decode() {
        RegistryError::Decode(err.to_string())
    } else {
        RegistryError::Transient(err.to_string())
    }
}

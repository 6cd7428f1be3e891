use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::model::Configuration;
use crate::RegistryClient;

const SCHEMA_VERSION: &str = "1.0";
const CONTENT_TYPE: &str = "assignment";

/// Insertion-ordered registry kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    configurations: Mutex<Vec<Configuration>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry with already-stored configurations, kept as given.
    pub fn with_configurations(configurations: impl IntoIterator<Item = Configuration>) -> Self {
        Self {
            configurations: Mutex::new(configurations.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.configurations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.configurations.lock().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Configuration> {
        self.configurations
            .lock()
            .await
            .iter()
            .find(|stored| stored.id == id)
            .cloned()
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistry {
    async fn create_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<Configuration, RegistryError> {
        let mut configurations = self.configurations.lock().await;
        if configurations.iter().any(|stored| stored.id == configuration.id) {
            return Err(RegistryError::Conflict {
                id: configuration.id.clone(),
            });
        }

        let content = serde_json::to_vec(&configuration.content)
            .map_err(|err| RegistryError::Decode(err.to_string()))?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut stored = configuration.clone();
        stored
            .schema_version
            .get_or_insert_with(|| SCHEMA_VERSION.to_string());
        stored
            .content_type
            .get_or_insert_with(|| CONTENT_TYPE.to_string());
        stored.created_time_utc = Some(now.clone());
        stored.last_updated_time_utc = Some(now);
        stored.etag = Some(blake3::hash(&content).to_hex()[..16].to_string());

        configurations.push(stored.clone());
        Ok(stored)
    }

    async fn list_configurations(
        &self,
        max_count: usize,
    ) -> Result<Vec<Configuration>, RegistryError> {
        Ok(self
            .configurations
            .lock()
            .await
            .iter()
            .take(max_count)
            .cloned()
            .collect())
    }
}

// crates/edgedeploy-core/src/builder.rs

use std::collections::BTreeMap;

use edgedeploy_registry::{Configuration, ConfigurationContent, ModuleContent, PROPERTIES_DESIRED};
use tracing::debug;

use crate::document::DeploymentDescriptor;
use crate::error::{DeployError, Result};

pub const EDGE_AGENT: &str = "$edgeAgent";
pub const EDGE_HUB: &str = "$edgeHub";
pub const DEFAULT_CUSTOM_MODULE: &str = "asaModule";
/// Target condition matching every device in the hub.
pub const TARGET_ALL_DEVICES: &str = "*";

/// Turns a deployment descriptor into a configuration covering the two runtime
/// modules plus one workload module.
///
/// Only those three modules are copied; anything else under `modulesContent`
/// is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationBuilder {
    custom_module: String,
    target_condition: String,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CUSTOM_MODULE)
    }
}

impl ConfigurationBuilder {
    pub fn new(custom_module: impl Into<String>) -> Self {
        Self {
            custom_module: custom_module.into(),
            target_condition: TARGET_ALL_DEVICES.to_string(),
        }
    }

    pub fn with_target_condition(mut self, target_condition: impl Into<String>) -> Self {
        self.target_condition = target_condition.into();
        self
    }

    pub fn custom_module(&self) -> &str {
        &self.custom_module
    }

    pub fn target_condition(&self) -> &str {
        &self.target_condition
    }

    pub fn module_keys(&self) -> [&str; 3] {
        [EDGE_AGENT, EDGE_HUB, self.custom_module.as_str()]
    }

    /// Rejects a workload module that is empty or shadows a runtime module,
    /// and an empty target condition.
    pub fn validate(&self) -> Result<()> {
        if self.custom_module.trim().is_empty() {
            return Err(DeployError::Config("module name cannot be empty".into()));
        }
        if self.custom_module == EDGE_AGENT || self.custom_module == EDGE_HUB {
            return Err(DeployError::Config(format!(
                "module name '{}' collides with a runtime module",
                self.custom_module
            )));
        }
        if self.target_condition.trim().is_empty() {
            return Err(DeployError::Config("target condition cannot be empty".into()));
        }
        Ok(())
    }

    pub fn build(
        &self,
        descriptor: &DeploymentDescriptor,
        configuration_id: &str,
    ) -> Result<Configuration> {
        self.validate()?;

        let mut modules_content = BTreeMap::new();
        for module in self.module_keys() {
            let desired = descriptor.module_section(module, PROPERTIES_DESIRED)?;
            let content: ModuleContent =
                BTreeMap::from([(PROPERTIES_DESIRED.to_string(), desired.clone())]);
            modules_content.insert(module.to_string(), content);
        }

        debug!(
            configuration_id,
            modules = modules_content.len(),
            target_condition = %self.target_condition,
            "built configuration"
        );

        let mut configuration = Configuration::new(configuration_id);
        configuration.target_condition = self.target_condition.clone();
        configuration.content = ConfigurationContent {
            modules_content: Some(modules_content),
            device_content: None,
        };
        Ok(configuration)
    }
}

/// Builds with the default workload module and the all-devices target condition.
pub fn build(descriptor: &DeploymentDescriptor, configuration_id: &str) -> Result<Configuration> {
    ConfigurationBuilder::default().build(descriptor, configuration_id)
}

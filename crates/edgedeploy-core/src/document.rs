//! Typed access to the semi-structured deployment descriptor.
//!
//! The descriptor is kept as a plain JSON tree; lookups return
//! [`DeployError::MissingField`] instead of panicking when a key path is absent.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{DeployError, Result};

pub const MODULES_CONTENT: &str = "modulesContent";

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDescriptor {
    root: Value,
}

impl DeploymentDescriptor {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// The `modulesContent` object.
    pub fn modules_content(&self) -> Result<&Map<String, Value>> {
        object_field(&self.root, MODULES_CONTENT, "")
    }

    /// Module names present in the descriptor.
    pub fn module_names(&self) -> Result<Vec<&str>> {
        Ok(self.modules_content()?.keys().map(String::as_str).collect())
    }

    /// `modulesContent[module][section]`, e.g. a module's `properties.desired`.
    pub fn module_section(&self, module: &str, section: &str) -> Result<&Value> {
        let parent = format!("/{MODULES_CONTENT}");
        let modules = self.modules_content()?;
        let module_value = modules
            .get(module)
            .ok_or_else(|| missing(module, &parent))?;
        field(module_value, section, &format!("{parent}/{module}"))
    }
}

impl FromStr for DeploymentDescriptor {
    type Err = serde_json::Error;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(text).map(Self::from_value)
    }
}

/// Looks up `key` in `value`; `parent` is the path of `value`, used in the error.
pub fn field<'a>(value: &'a Value, key: &str, parent: &str) -> Result<&'a Value> {
    value
        .as_object()
        .and_then(|object| object.get(key))
        .ok_or_else(|| missing(key, parent))
}

/// Like [`field`], but the found value must itself be an object.
pub fn object_field<'a>(value: &'a Value, key: &str, parent: &str) -> Result<&'a Map<String, Value>> {
    field(value, key, parent)?
        .as_object()
        .ok_or_else(|| missing(key, parent))
}

fn missing(key: &str, parent: &str) -> DeployError {
    DeployError::MissingField {
        key: key.to_string(),
        path: format!("{parent}/{key}"),
    }
}

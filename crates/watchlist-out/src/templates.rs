//! Template loading for certificate rendering.
//!
//! The templates file is YAML with:
//! - named Handlebars templates
//! - partials shared between templates
//! - helper documentation

use crate::RenderError;
use serde::Deserialize;
use std::collections::HashMap;

/// Templates shipped with the crate
pub const EMBEDDED_TEMPLATES: &str = include_str!("../templates/certificate-templates.yaml");

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
    #[serde(default)]
    pub partials: HashMap<String, String>,
    #[serde(default)]
    pub helpers: HashMap<String, HelperDoc>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

/// Helper documentation
#[derive(Debug, Clone, Deserialize)]
pub struct HelperDoc {
    pub description: String,
    #[serde(default)]
    pub usage: Option<String>,
}

impl TemplatesFile {
    /// Load templates from a YAML file
    pub fn load(path: &str) -> Result<Self, RenderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Template(format!("Failed to read templates file {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// The templates compiled into the crate
    pub fn embedded() -> Result<Self, RenderError> {
        Self::from_yaml(EMBEDDED_TEMPLATES)
    }

    /// Parse templates from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| RenderError::Template(format!("Failed to parse templates YAML: {}", e)))
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// List all template names, sorted
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

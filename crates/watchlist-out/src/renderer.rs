//! Handlebars rendering for certificates.
//!
//! Registered helpers:
//! - or_na: value or "N/A" when missing or blank
//! - has_value: truthy when the value is present and not "N/A"
//! - upper: upper-case a string

use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;
use watchlist_core::{has_value, NOT_AVAILABLE};

use crate::templates::TemplatesFile;
use crate::RenderError;

handlebars_helper!(or_na: |value: Json| display_or_na(value));
handlebars_helper!(has_value_helper: |value: Json| value.as_str().map(has_value).unwrap_or(false));
handlebars_helper!(upper: |text: str| text.to_uppercase());

fn display_or_na(value: &Value) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Compiled renderer with registered helpers and partials
pub struct CertificateRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl CertificateRenderer {
    /// Compile every template and partial of a templates file
    pub fn new(templates: TemplatesFile) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        handlebars.register_helper("or_na", Box::new(or_na));
        handlebars.register_helper("has_value", Box::new(has_value_helper));
        handlebars.register_helper("upper", Box::new(upper));

        for (name, partial) in &templates.partials {
            handlebars
                .register_partial(name, partial)
                .map_err(|e| RenderError::Template(format!("Partial {}: {}", name, e)))?;
        }
        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| RenderError::Template(format!("Template {}: {}", name, e)))?;
        }

        tracing::debug!(
            templates = templates.templates.len(),
            partials = templates.partials.len(),
            "certificate templates compiled"
        );

        Ok(Self {
            handlebars,
            templates,
        })
    }

    /// Renderer over the templates shipped with the crate
    pub fn embedded() -> Result<Self, RenderError> {
        Self::new(TemplatesFile::embedded()?)
    }

    /// Load from a file path
    pub fn load(path: &str) -> Result<Self, RenderError> {
        Self::new(TemplatesFile::load(path)?)
    }

    /// Render a named template with data
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        if self.templates.get(template_name).is_none() {
            return Err(RenderError::UnknownTemplate(template_name.to_string()));
        }
        self.handlebars
            .render(template_name, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

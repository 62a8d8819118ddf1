//! Manifest body rendering
//!
//! Templates receive three variables: `urls` (tracked URLs in registration
//! order), `hash` (hex fingerprint) and `updated` (RFC 3339 timestamp). The
//! built-in `manifest.appcache` template produces
//!
//! ```text
//! CACHE MANIFEST
//! # <hash>
//! <url>
//! ...
//! # updated <timestamp>
//! ```

use std::path::Path;

use tera::{Context, Tera};

use super::types::ManifestVersion;
use crate::constants::manifest;
use crate::errors::{ConfigurationError, ConfigurationResult, Result};

/// Renders manifest bodies from a named template
#[derive(Debug, Clone)]
pub struct ManifestRenderer {
    tera: Tera,
    template: String,
}

impl ManifestRenderer {
    /// Renderer using the built-in template
    pub fn builtin() -> ConfigurationResult<Self> {
        Self::new(manifest::DEFAULT_TEMPLATE, None)
    }

    /// Renderer for `template`, loading user templates from `template_dir`
    ///
    /// Templates found in `template_dir` take precedence over the built-in
    /// `manifest.appcache`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTemplate` if the directory fails to
    /// parse or `template` is not among the loaded templates.
    pub fn new(template: &str, template_dir: Option<&Path>) -> ConfigurationResult<Self> {
        let invalid = |reason: String| ConfigurationError::InvalidTemplate {
            name: template.to_string(),
            reason,
        };

        let mut tera = match template_dir {
            Some(dir) => {
                let glob = format!("{}/**/*", dir.display());
                Tera::new(&glob).map_err(|e| invalid(e.to_string()))?
            }
            None => Tera::default(),
        };
        // Manifests are plain text
        tera.autoescape_on(Vec::new());

        if !has_template(&tera, manifest::DEFAULT_TEMPLATE) {
            tera.add_raw_template(manifest::DEFAULT_TEMPLATE, manifest::BUILTIN_TEMPLATE)
                .map_err(|e| invalid(e.to_string()))?;
        }

        if !has_template(&tera, template) {
            return Err(invalid("template not found".to_string()));
        }

        Ok(Self {
            tera,
            template: template.to_string(),
        })
    }

    /// Name of the template in use
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the manifest for `urls` at `version`
    pub fn render(&self, urls: &[String], version: &ManifestVersion) -> Result<String> {
        let mut context = Context::new();
        context.insert("urls", urls);
        context.insert("hash", &version.hash.to_hex());
        context.insert("updated", &version.updated_string());

        Ok(self.tera.render(&self.template, &context)?)
    }
}

fn has_template(tera: &Tera, name: &str) -> bool {
    tera.get_template_names().any(|n| n == name)
}

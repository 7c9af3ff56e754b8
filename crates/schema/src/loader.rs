//! Schema document loading
//!
//! The schema is fetched once from its published URL at host startup, with a
//! bundled copy as the fallback when the fetch or the parse fails. Loading is
//! explicit: the host calls a loader function and passes the resulting
//! [`TemplateSchema`] into the resolver, validator, and completion engine.

use std::fs;
use std::path::Path;

use cfn_template_toolkit_common::{Result, TemplateError};
use log::{debug, warn};

use crate::types::TemplateSchema;

/// Published location of the CloudFormation schema document.
pub const DEFAULT_SCHEMA_URL: &str =
    "https://vstoolkit.amazonwebservices.com/CloudFormationSchema/CloudFormationV1.schema";

/// Schema copy compiled into the binary.
const BUNDLED_SCHEMA: &str = include_str!("../resources/CloudFormationV1.schema.json");

/// A source of schema document text.
#[cfg_attr(test, mockall::automock)]
pub trait SchemaSource {
    fn fetch(&self) -> Result<String>;
}

/// Fetches the schema document over HTTP.
pub struct HttpSchemaSource {
    url: String,
}

impl HttpSchemaSource {
    pub fn new(url: impl Into<String>) -> Self {
        HttpSchemaSource { url: url.into() }
    }
}

impl Default for HttpSchemaSource {
    fn default() -> Self {
        HttpSchemaSource::new(DEFAULT_SCHEMA_URL)
    }
}

impl SchemaSource for HttpSchemaSource {
    fn fetch(&self) -> Result<String> {
        debug!("fetching schema from {}", self.url);
        let response = reqwest::blocking::get(self.url.as_str())
            .map_err(|e| TemplateError::SchemaLoad(format!("GET {}: {}", self.url, e)))?;
        if !response.status().is_success() {
            return Err(TemplateError::SchemaLoad(format!(
                "GET {}: HTTP {}",
                self.url,
                response.status()
            )));
        }
        response
            .text()
            .map_err(|e| TemplateError::SchemaLoad(format!("reading {}: {}", self.url, e)))
    }
}

/// Parse a schema document from JSON text.
pub fn from_json(json: &str) -> Result<TemplateSchema> {
    serde_json::from_str(json)
        .map_err(|e| TemplateError::SchemaLoad(format!("invalid schema document: {}", e)))
}

/// Load a schema document from a local file.
pub fn from_file(path: &Path) -> Result<TemplateSchema> {
    let content = fs::read_to_string(path).map_err(|e| {
        TemplateError::SchemaLoad(format!("failed to read schema file {:?}: {}", path, e))
    })?;
    from_json(&content)
}

/// The schema copy bundled into the binary.
pub fn bundled() -> Result<TemplateSchema> {
    from_json(BUNDLED_SCHEMA)
}

/// Load from the given source, falling back to the bundled copy when the
/// fetch or the parse fails.
pub fn load_with_fallback(source: &dyn SchemaSource) -> Result<TemplateSchema> {
    match source.fetch().and_then(|text| from_json(&text)) {
        Ok(schema) => Ok(schema),
        Err(err) => {
            warn!("schema fetch failed ({}), using bundled copy", err);
            bundled()
        }
    }
}

/// Fetch from the published URL, falling back to the bundled copy.
pub fn load_default() -> Result<TemplateSchema> {
    load_with_fallback(&HttpSchemaSource::default())
}

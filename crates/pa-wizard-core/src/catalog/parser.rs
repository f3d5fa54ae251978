//! Requirement catalog parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{DocumentRequirement, PaType};

use super::schema::validate_catalog_schema;

/// Errors that can occur when loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog schema validation failed: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Duplicate requirement ID '{id}' in category {category}")]
    DuplicateRequirement { category: PaType, id: String },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Version of this catalog (semver)
    pub catalog_version: String,

    /// Human-readable name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Requirements per category, in display order
    #[serde(default)]
    pub categories: BTreeMap<PaType, Vec<DocumentRequirement>>,
}

impl CatalogFile {
    /// Parse a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a catalog file, choosing the format by extension.
    ///
    /// `.json` is read as JSON; anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        validate_catalog_schema(&value).map_err(CatalogError::SchemaError)?;
        let catalog: CatalogFile = serde_json::from_value(value)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural checks the schema cannot express.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name".to_string()));
        }

        for (category, requirements) in &self.categories {
            let mut seen = HashSet::new();
            for requirement in requirements {
                if requirement.name.trim().is_empty() {
                    return Err(CatalogError::MissingField(format!(
                        "categories.{}.{}.name",
                        category, requirement.id
                    )));
                }
                if !seen.insert(requirement.id.as_str()) {
                    return Err(CatalogError::DuplicateRequirement {
                        category: *category,
                        id: requirement.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

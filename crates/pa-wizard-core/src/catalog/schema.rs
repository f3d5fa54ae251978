//! JSON Schema check for requirement catalogs.
//!
//! The schema ships inside the binary and is compiled on first use. Catalog
//! documents are checked against it before they are deserialized, so shape
//! errors are reported with their location instead of as a serde failure.

use serde_json::Value;
use std::sync::OnceLock;

const CATALOG_SCHEMA: &str = include_str!("../../../../schema/requirement-catalog.schema.json");

fn catalog_validator() -> Result<&'static jsonschema::Validator, &'static str> {
    static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

    VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(CATALOG_SCHEMA)
                .map_err(|e| format!("embedded catalog schema is not JSON: {}", e))?;
            jsonschema::validator_for(&schema)
                .map_err(|e| format!("embedded catalog schema does not compile: {}", e))
        })
        .as_ref()
        .map_err(String::as_str)
}

/// Check a catalog document, listing every violation.
///
/// Each message starts with the offending location (`/` for the document
/// itself), e.g. `/categories/pharmacy/0/id: "Rx Script" does not match ...`.
pub fn validate_catalog_schema(catalog: &Value) -> Result<(), Vec<String>> {
    let validator = catalog_validator().map_err(|e| vec![e.to_string()])?;

    let violations: Vec<String> = validator
        .iter_errors(catalog)
        .map(|e| {
            let location = e.instance_path.to_string();
            let location = if location.is_empty() { "/" } else { location.as_str() };
            format!("{}: {}", location, e)
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

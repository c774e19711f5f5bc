//! Placeholder schema export/import as JSON.
//!
//! Export hands admins the current schema for backup or hand-editing;
//! import replaces a template's schema wholesale after checking the same
//! key-uniqueness rule the registry enforces.

use crate::error::CertError;
use crate::model::Placeholder;
use crate::registry;

/// Serialize a schema to pretty-printed JSON.
pub fn export_schema(schema: &[Placeholder]) -> Result<String, CertError> {
    serde_json::to_string_pretty(schema)
        .map_err(|e| CertError::Schema(format!("schema export failed: {}", e)))
}

/// Parse a JSON schema document.
///
/// Malformed JSON, a wrong shape, or duplicate binding keys all reject the
/// document without touching any registry state.
pub fn import_schema(json: &str) -> Result<Vec<Placeholder>, CertError> {
    let schema: Vec<Placeholder> = serde_json::from_str(json)
        .map_err(|e| CertError::Schema(format!("schema import failed: {}", e)))?;
    registry::ensure_unique_keys(&schema)?;
    Ok(schema)
}

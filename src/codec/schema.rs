//! Document schema generation and validation.
//!
//! The schema is derived from the record types in the parent module, so
//! it always describes exactly what the codec writes. It is materialized
//! once as a standalone file next to the data file; validation reads the
//! file back rather than the embedded copy, so a hand-audited schema on
//! disk is what actually gets enforced.

use std::fs;
use std::path::Path;

use jsonschema::Validator;
use tracing::info;

use super::{CodecError, TourDocument};

/// The embedded schema, generated from the record types.
pub(crate) fn document_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(TourDocument);
    serde_json::to_value(schema).expect("generated schema serializes")
}

/// Write the schema file if it does not exist yet.
pub(crate) fn ensure_schema_file(path: &Path) -> Result<(), CodecError> {
    if path.exists() {
        return Ok(());
    }
    let text = serde_json::to_string_pretty(&document_schema())?;
    fs::write(path, text).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "created document schema file");
    Ok(())
}

pub(crate) fn compile(schema: &serde_json::Value) -> Result<Validator, CodecError> {
    jsonschema::validator_for(schema).map_err(|e| CodecError::BadSchema(e.to_string()))
}

/// All validation errors for `instance`, joined into one diagnostic, or
/// `None` when the document conforms.
pub(crate) fn violations(validator: &Validator, instance: &serde_json::Value) -> Option<String> {
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

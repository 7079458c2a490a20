//! Shape check for dataset documents against the shipped JSON Schema.
//!
//! The schema lives in `schema/dataset.schema.json` and is compiled into the
//! binary. Typed deserialization would also reject most malformed documents,
//! but the schema pass reports every violation with its JSON pointer at once
//! instead of stopping at the first serde error.

use jsonschema::JSONSchema;
use serde_json::Value;

const DATASET_SCHEMA: &str = include_str!("../schema/dataset.schema.json");

/// Validate a dataset document, returning one message per violation.
///
/// An `Err` carrying a single message is also returned when the embedded
/// schema itself cannot be compiled, which only happens if the shipped file
/// is edited into an invalid state.
pub(crate) fn validate_dataset_shape(document: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(DATASET_SCHEMA)
        .map_err(|err| vec![format!("parsing dataset schema: {err}")])?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| vec![format!("compiling dataset schema: {err}")])?;

    let result = compiled.validate(document);
    if let Err(errors) = result {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect::<Vec<_>>();
        return Err(details);
    }
    Ok(())
}

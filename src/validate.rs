//! Structural validation of the case payload.
//!
//! Intentionally shallow: the guarantee is "the diagnosis-bearing skeleton
//! exists", not full schema conformance. Everything below the required keys
//! is free-form case detail and stays unchecked.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::parse::json_type_name;

const OSCE_KEY: &str = "OSCE_Examination";

/// Direct children of `OSCE_Examination` and whether they must be objects.
/// `Correct_Diagnosis` only has to be present; its type is unconstrained.
const EXPECTED_CHILDREN: &[(&str, bool)] = &[
    ("Patient_Actor", true),
    ("Physical_Examination_Findings", true),
    ("Test_Results", true),
    ("Correct_Diagnosis", false),
];

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing key '{key}' at path '{path}'")]
    MissingKey { path: String, key: String },

    #[error("key at path '{path}' should be an object, found {found}")]
    WrongType { path: String, found: &'static str },
}

/// Check that the case payload contains the required nested skeleton:
/// `case.OSCE_Examination` with object children `Patient_Actor`,
/// `Physical_Examination_Findings`, `Test_Results`, plus a present
/// `Correct_Diagnosis`.
pub fn validate_case(content: &Map<String, Value>) -> Result<(), ValidationError> {
    let osce = content.get(OSCE_KEY).ok_or_else(|| ValidationError::MissingKey {
        path: "case".to_string(),
        key: OSCE_KEY.to_string(),
    })?;

    let osce_path = format!("case.{OSCE_KEY}");
    let osce = match osce {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::WrongType {
                path: osce_path,
                found: json_type_name(other),
            })
        }
    };

    for (key, must_be_object) in EXPECTED_CHILDREN {
        let child_path = format!("{osce_path}.{key}");
        let child = osce.get(*key).ok_or_else(|| ValidationError::MissingKey {
            path: osce_path.clone(),
            key: (*key).to_string(),
        })?;
        if *must_be_object && !child.is_object() {
            return Err(ValidationError::WrongType {
                path: child_path,
                found: json_type_name(child),
            });
        }
    }

    Ok(())
}

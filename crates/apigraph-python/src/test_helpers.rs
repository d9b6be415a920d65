//! Builders for typed program trees in tests.

use serde_json::Value;

use crate::nodes::{SemType, SourceFile};

/// Deserialize a typed tree, panicking with the serde message on bad fixtures.
pub fn source_file(value: Value) -> SourceFile {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("bad fixture: {}", e))
}

pub fn sem_type(value: Value) -> SemType {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("bad type fixture: {}", e))
}

/// `{"kind": "instance", "fullname": ...}` with no arguments.
pub fn instance(fullname: &str) -> Value {
    serde_json::json!({"kind": "instance", "fullname": fullname})
}

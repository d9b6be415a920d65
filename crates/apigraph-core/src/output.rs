//! The table-of-entities document.
//!
//! One ordered table per entity kind, each row addressable by id, relations
//! expressed as id references. Tables are sorted by id so two runs over the
//! same input produce byte-identical documents.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::api::Api;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    Attribute, Class, Enum, EnumInstance, Function, FunctionResult, Module, Parameter,
};

/// Document format version.
pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub schema_version: String,
    pub distribution: String,
    pub package: String,
    pub version: String,
    pub modules: Vec<Module>,
    pub classes: Vec<Class>,
    pub functions: Vec<Function>,
    pub results: Vec<FunctionResult>,
    pub enums: Vec<Enum>,
    pub enum_instances: Vec<EnumInstance>,
    pub attributes: Vec<Attribute>,
    pub parameters: Vec<Parameter>,
}

fn table<T: Clone>(registry: &BTreeMap<String, T>) -> Vec<T> {
    registry.values().cloned().collect()
}

fn index<T>(
    kind: &str,
    rows: Vec<T>,
    id_of: impl Fn(&T) -> &str,
) -> ApiResult<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for row in rows {
        let id = id_of(&row).to_string();
        if map.contains_key(&id) {
            return Err(ApiError::malformed(
                kind,
                format!("duplicate id in document: {}", id),
            ));
        }
        map.insert(id, row);
    }
    Ok(map)
}

impl Api {
    pub fn to_document(&self) -> ApiDocument {
        ApiDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            distribution: self.distribution.clone(),
            package: self.package.clone(),
            version: self.version.clone(),
            modules: table(&self.modules),
            classes: table(&self.classes),
            functions: table(&self.functions),
            results: table(&self.results),
            enums: table(&self.enums),
            enum_instances: table(&self.enum_instances),
            attributes: table(&self.attributes),
            parameters: table(&self.parameters),
        }
    }

    /// Rebuild the registries from a document. Duplicate ids are rejected.
    pub fn from_document(doc: ApiDocument) -> ApiResult<Api> {
        Ok(Api {
            distribution: doc.distribution,
            package: doc.package,
            version: doc.version,
            modules: index("modules", doc.modules, |m| m.id.as_str())?,
            classes: index("classes", doc.classes, |c| c.id.as_str())?,
            functions: index("functions", doc.functions, |f| f.id.as_str())?,
            parameters: index("parameters", doc.parameters, |p| p.id.as_str())?,
            attributes: index("attributes", doc.attributes, |a| a.id.as_str())?,
            results: index("results", doc.results, |r| r.id.as_str())?,
            enums: index("enums", doc.enums, |e| e.id.as_str())?,
            enum_instances: index("enum_instances", doc.enum_instances, |i| i.id.as_str())?,
        })
    }
}

/// Write a document as pretty-printed JSON followed by a newline.
pub fn emit_document<W: Write>(writer: &mut W, doc: &ApiDocument) -> ApiResult<()> {
    serde_json::to_writer_pretty(&mut *writer, doc)?;
    writeln!(writer)?;
    Ok(())
}

pub fn parse_document(text: &str) -> ApiResult<ApiDocument> {
    serde_json::from_str(text).map_err(|e| ApiError::malformed("<document>", e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

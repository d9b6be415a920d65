//! Core infrastructure for apigraph.
//!
//! This crate provides the language-agnostic API model:
//! - The closed, hashable type algebra ([`types::AbstractType`])
//! - Entities (modules, classes, functions, parameters, attributes, results, enums)
//! - The slash-delimited id scheme
//! - Id-keyed registries, the public view and method resolution
//! - The table-of-entities document used for serialization
//! - Error types and error codes

pub mod api;
pub mod error;
pub mod id;
pub mod model;
pub mod mro;
pub mod output;
pub mod types;

//! apigraph: normalized API models of Python packages
//!
//! Builds a language-agnostic model of a package's public surface (modules,
//! classes, functions, parameters, results, attributes, enums) from the
//! semantically resolved program trees of a Python type checker.

// Core model - re-exported from apigraph-core
pub use apigraph_core::api;
pub use apigraph_core::error;
pub use apigraph_core::id;
pub use apigraph_core::model;
pub use apigraph_core::mro;
pub use apigraph_core::output;
pub use apigraph_core::types;

// Python front end - re-exported from apigraph-python
pub use apigraph_python::docstrings;
pub use apigraph_python::pipeline;

// Front door
pub mod cli;

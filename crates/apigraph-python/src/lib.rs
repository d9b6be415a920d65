//! Python support for apigraph.
//!
//! This crate turns the semantic analyzer's typed program trees into the
//! API model defined in `apigraph-core`. It includes:
//! - The typed-tree input nodes and a visitor/walker over them
//! - Import records and the package-wide reexport/alias index
//! - The visibility resolver
//! - The type translator and the signature builders
//! - Docstring providers (plain text, Google, NumPy)
//! - The declaration-stack adapter and the two-phase pipeline

pub mod adapter;
pub mod attributes;
pub mod docstrings;
pub mod error_bridges;
pub mod files;
pub mod imports;
pub mod index;
pub mod nodes;
pub mod params;
pub mod pipeline;
pub mod results;
pub mod translate;
pub mod visibility;
pub mod visitor;

#[cfg(test)]
pub(crate) mod test_helpers;

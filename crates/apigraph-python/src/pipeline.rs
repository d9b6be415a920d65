//! The two-phase analysis pipeline.
//!
//! - Phase 0 scans the imports and module-scope classes of every file in
//!   parallel and merges them into one [`PackageIndex`], which is then frozen.
//! - Phase 1 walks every file with its own [`Adapter`], in parallel, reading
//!   the frozen index. Fragments are merged in path order.
//!
//! Because the index is complete before any visibility decision is made, a
//! symbol's publicity does not depend on whether its aggregator file was
//! processed before or after its defining file.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use apigraph_core::api::Api;

use crate::adapter::{Adapter, AdapterError};
use crate::docstrings::{create_provider, DocstringStyle};
use crate::files::FileError;
use crate::index::{scan_file, FileScan, PackageIndex};
use crate::nodes::SourceFile;

// ============================================================================
// Options
// ============================================================================

/// Options for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Top-level package name; files outside it are ignored.
    pub package: String,
    pub distribution: String,
    pub version: String,
    pub docstring_style: DocstringStyle,
    /// Return [`Api::public_view`] instead of the full model.
    pub public_only: bool,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("adapter failed on {path}: {source}")]
    Adapter {
        path: String,
        #[source]
        source: AdapterError,
    },

    #[error(transparent)]
    Files(#[from] FileError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

// ============================================================================
// Pipeline
// ============================================================================

fn in_package(file: &SourceFile, package: &str) -> bool {
    package.is_empty()
        || file.fullname == package
        || file
            .fullname
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Build the API model of `options.package` from its typed trees.
pub fn analyze(files: &[SourceFile], options: &AnalyzerOptions) -> PipelineResult<Api> {
    let mut selected: Vec<&SourceFile> = files
        .iter()
        .filter(|file| in_package(file, &options.package))
        .collect();
    selected.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(
        selected = selected.len(),
        total = files.len(),
        package = %options.package,
        "selected files"
    );

    // Phase 0
    let scans: Vec<FileScan> = selected.par_iter().map(|file| scan_file(file)).collect();
    let index = PackageIndex::build(&scans);

    // Phase 1
    let provider = create_provider(options.docstring_style);
    let fragments: Vec<Api> = selected
        .par_iter()
        .map(|file| {
            Adapter::run(file, &index, provider.as_ref()).map_err(|source| PipelineError::Adapter {
                path: file.path.clone(),
                source,
            })
        })
        .collect::<PipelineResult<Vec<Api>>>()?;

    let mut api = Api::new(&options.distribution, &options.package, &options.version);
    for fragment in fragments {
        api.merge(fragment);
    }
    info!(modules = api.modules.len(), entities = api.len(), "analysis complete");

    if options.public_only {
        Ok(api.public_view())
    } else {
        Ok(api)
    }
}

// ============================================================================
// Tests
// ============================================================================

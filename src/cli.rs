//! CLI front door.
//!
//! Provides the helpers behind `apigraph analyze`:
//! - Option resolution: a JSON options file (`--config`) overlaid by flags
//! - Loading typed trees, running the pipeline, and writing the document
//!
//! ## Error Handling
//!
//! All functions return `Result<T, ApiError>`. Subsystem errors convert
//! into `ApiError` through the `From` bridges, so the binary only has to map
//! one error type onto exit codes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use apigraph_core::error::{ApiError, ApiResult};
use apigraph_core::output::emit_document;
use apigraph_python::docstrings::DocstringStyle;
use apigraph_python::files::load_trees;
use apigraph_python::pipeline::{analyze, AnalyzerOptions};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("invalid config file {path}: {message}")]
    Invalid { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => ApiError::invalid_args(format!(
                "config file not found: {}",
                path
            )),
            ConfigError::Invalid { .. } => ApiError::invalid_args(err.to_string()),
            ConfigError::Io(e) => ApiError::Io(e),
        }
    }
}

/// Read [`AnalyzerOptions`] from a JSON file. Missing keys take their defaults.
pub fn load_options(path: &Path) -> Result<AnalyzerOptions, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Flag values for `analyze`. `None` leaves the config file's value in place.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    pub trees_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub package: Option<String>,
    pub distribution: Option<String>,
    pub version: Option<String>,
    pub docstring_style: Option<DocstringStyle>,
    pub public_only: bool,
    pub out: Option<PathBuf>,
}

impl AnalyzeRequest {
    /// Resolve the effective options: defaults, then the config file, then flags.
    ///
    /// `package` is required from one of the two sources. An empty
    /// distribution falls back to the package name.
    pub fn options(&self) -> ApiResult<AnalyzerOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => AnalyzerOptions::default(),
        };
        if let Some(package) = &self.package {
            options.package = package.clone();
        }
        if let Some(distribution) = &self.distribution {
            options.distribution = distribution.clone();
        }
        if let Some(version) = &self.version {
            options.version = version.clone();
        }
        if let Some(style) = self.docstring_style {
            options.docstring_style = style;
        }
        if self.public_only {
            options.public_only = true;
        }

        if options.package.is_empty() {
            return Err(ApiError::invalid_args(
                "no package given: pass --package or set \"package\" in the config file",
            ));
        }
        if options.distribution.is_empty() {
            options.distribution = options.package.clone();
        }
        Ok(options)
    }
}

// ============================================================================
// Analyze
// ============================================================================

/// Run `analyze`: load trees, build the model, and write the document.
///
/// The document goes to `request.out` when set, otherwise to `stdout`.
pub fn run_analyze<W: Write>(request: &AnalyzeRequest, stdout: &mut W) -> ApiResult<()> {
    let options = request.options()?;
    let trees = load_trees(&request.trees_dir)?;
    let api = analyze(&trees, &options)?;
    let document = api.to_document();

    match &request.out {
        Some(path) => {
            let mut file = io::BufWriter::new(fs::File::create(path)?);
            emit_document(&mut file, &document)?;
            file.flush()?;
            info!(path = %path.display(), entities = api.len(), "wrote API document");
        }
        None => {
            emit_document(stdout, &document)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use apigraph_core::error::OutputErrorCode;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    mod options {
        use super::*;

        #[test]
        fn flags_override_config_file() {
            let temp = TempDir::new().unwrap();
            let config = write(
                temp.path(),
                "apigraph.json",
                r#"{"package": "pkg", "version": "0.9", "docstring_style": "google"}"#,
            );
            let request = AnalyzeRequest {
                config: Some(config),
                version: Some("1.0".to_string()),
                ..Default::default()
            };
            let options = request.options().unwrap();
            assert_eq!(options.package, "pkg");
            assert_eq!(options.distribution, "pkg");
            assert_eq!(options.version, "1.0");
            assert_eq!(options.docstring_style, DocstringStyle::Google);
        }

        #[test]
        fn package_is_required() {
            let err = AnalyzeRequest::default().options().unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn bad_config_is_an_argument_error() {
            let temp = TempDir::new().unwrap();
            let config = write(temp.path(), "apigraph.json", r#"{"public_only": "yes"}"#);
            let request = AnalyzeRequest {
                config: Some(config),
                package: Some("pkg".to_string()),
                ..Default::default()
            };
            let err = request.options().unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }
    }

    mod analyze {
        use super::*;
        use apigraph_core::output::parse_document;

        #[test]
        fn writes_document_to_writer() {
            let temp = TempDir::new().unwrap();
            write(
                temp.path(),
                "pkg/__init__.json",
                r#"{"path": "pkg/__init__.py", "fullname": "pkg",
                    "body": [{"node": "func_def", "name": "run", "fullname": "pkg.run"}]}"#,
            );
            let request = AnalyzeRequest {
                trees_dir: temp.path().to_path_buf(),
                package: Some("pkg".to_string()),
                ..Default::default()
            };
            let mut out = Vec::new();
            run_analyze(&request, &mut out).unwrap();

            let doc = parse_document(&String::from_utf8(out).unwrap()).unwrap();
            assert_eq!(doc.package, "pkg");
            assert_eq!(doc.modules.len(), 1);
            assert_eq!(doc.functions[0].id, "pkg/__init__/run");
        }

        #[test]
        fn missing_trees_dir_is_an_input_error() {
            let temp = TempDir::new().unwrap();
            let request = AnalyzeRequest {
                trees_dir: temp.path().join("absent"),
                package: Some("pkg".to_string()),
                ..Default::default()
            };
            let err = run_analyze(&request, &mut Vec::new()).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InputError);
        }
    }
}

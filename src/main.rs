//! Binary entry point for the apigraph CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Build the API document for `pkg` from a directory of typed trees
//! apigraph analyze trees/ --package pkg --version 1.2.0 --docstyle numpy
//!
//! # Only the public surface, written to a file
//! apigraph analyze trees/ --config apigraph.json --public-only --out api.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use apigraph::cli::{run_analyze, AnalyzeRequest};
use apigraph_core::error::ApiError;
use apigraph_python::docstrings::DocstringStyle;

// ============================================================================
// CLI Structure
// ============================================================================

/// Normalized API models of Python packages.
///
/// Reads the typed program trees produced by the semantic analyzer and
/// writes a JSON table-of-entities document to stdout.
#[derive(Parser, Debug)]
#[command(name = "apigraph", version, about = "Normalized API models of Python packages")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of log lines on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Docstring convention of the analyzed package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DocStyle {
    Plaintext,
    Google,
    Numpy,
}

impl From<DocStyle> for DocstringStyle {
    fn from(style: DocStyle) -> Self {
        match style {
            DocStyle::Plaintext => DocstringStyle::Plaintext,
            DocStyle::Google => DocstringStyle::Google,
            DocStyle::Numpy => DocstringStyle::Numpy,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Build the API document of a package.
    Analyze {
        /// Directory containing one `*.json` typed tree per module.
        trees_dir: PathBuf,

        /// Top-level package name. Files outside it are ignored.
        #[arg(long)]
        package: Option<String>,

        /// Distribution name (default: the package name).
        #[arg(long)]
        distribution: Option<String>,

        /// Distribution version recorded in the document.
        #[arg(long = "version")]
        pkg_version: Option<String>,

        /// Docstring convention.
        #[arg(long, value_enum)]
        docstyle: Option<DocStyle>,

        /// Keep only public entities.
        #[arg(long)]
        public_only: bool,

        /// Write the document here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// JSON options file; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Errors go to stdout as JSON, like the document itself
            let mut stdout = io::stdout();
            let _ = writeln!(stdout, "{}", err.to_json());
            let _ = stdout.flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` takes precedence over `--log-level`.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), ApiError> {
    match cli.command {
        Command::Analyze {
            trees_dir,
            package,
            distribution,
            pkg_version,
            docstyle,
            public_only,
            out,
            config,
        } => {
            let request = AnalyzeRequest {
                trees_dir,
                config,
                package,
                distribution,
                version: pkg_version,
                docstring_style: docstyle.map(DocstringStyle::from),
                public_only,
                out,
            };
            run_analyze(&request, &mut io::stdout().lock())
        }
    }
}

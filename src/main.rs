//! Binary entry point for the idbgen CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a database from a runtime snapshot
//! idbgen generate --runtime runtime.json --out db/
//!
//! # Regenerate, enriching from the previous database
//! idbgen generate --runtime runtime.json --out db-next/ --baseline db/
//!
//! # Inspect one store file
//! idbgen dump db/builtins.idb
//! ```
//!
//! Responses (including errors) are JSON on stdout; logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use idbgen::cli::{run_dump, run_generate, GenerateOptions};
use idbgen_core::config::ResolverKind;
use idbgen_core::error::{IdbError, OutputErrorCode};
use idbgen_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Completion database generator.
#[derive(Parser, Debug)]
#[command(name = "idbgen", version, about = "Completion database generator")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output. `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
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

/// Overload resolver strategy.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResolverArg {
    /// Parse signature lines from doc text.
    Docstring,
    /// Use signatures the runtime declares, falling back to doc text.
    Introspect,
}

impl From<ResolverArg> for ResolverKind {
    fn from(arg: ResolverArg) -> Self {
        match arg {
            ResolverArg::Docstring => ResolverKind::Docstring,
            ResolverArg::Introspect => ResolverKind::Introspect,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a runtime snapshot into one .idb file per module.
    Generate {
        /// Runtime snapshot (JSON).
        #[arg(long)]
        runtime: PathBuf,

        /// Output directory for the database.
        #[arg(long)]
        out: PathBuf,

        /// Previous database to recover signatures, docs and types from.
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Scrape configuration file (JSON).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overload resolver strategy (overrides the config file).
        #[arg(long, value_enum)]
        resolver: Option<ResolverArg>,

        /// Nesting depth past which types are emitted as references.
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Decode one .idb file and print it as JSON.
    Dump {
        /// Store file to decode.
        file: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<(), IdbError> {
    match cli.command {
        Command::Generate {
            runtime,
            out,
            baseline,
            config,
            resolver,
            max_depth,
        } => {
            let options = GenerateOptions {
                runtime,
                out,
                baseline,
                config,
                resolver: resolver.map(ResolverKind::from),
                max_depth,
            };
            let response = run_generate(&options)?;
            emit(&response)
        }
        Command::Dump { file } => {
            let response = run_dump(&file)?;
            emit(&response)
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), IdbError> {
    emit_response(response, &mut io::stdout())
        .map_err(|e| IdbError::internal(format!("failed to write response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn parse_generate_minimal() {
            let args = ["idbgen", "generate", "--runtime", "rt.json", "--out", "db"];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::Generate {
                    runtime,
                    out,
                    baseline,
                    resolver,
                    max_depth,
                    ..
                } => {
                    assert_eq!(runtime, PathBuf::from("rt.json"));
                    assert_eq!(out, PathBuf::from("db"));
                    assert!(baseline.is_none());
                    assert!(resolver.is_none());
                    assert!(max_depth.is_none());
                }
                _ => panic!("expected generate"),
            }
        }

        #[test]
        fn parse_generate_all_flags() {
            let args = [
                "idbgen",
                "generate",
                "--runtime",
                "rt.json",
                "--out",
                "db",
                "--baseline",
                "old",
                "--config",
                "idbgen.json",
                "--resolver",
                "introspect",
                "--max-depth",
                "16",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::Generate {
                    baseline,
                    config,
                    resolver,
                    max_depth,
                    ..
                } => {
                    assert_eq!(baseline, Some(PathBuf::from("old")));
                    assert_eq!(config, Some(PathBuf::from("idbgen.json")));
                    assert!(matches!(resolver, Some(ResolverArg::Introspect)));
                    assert_eq!(max_depth, Some(16));
                }
                _ => panic!("expected generate"),
            }
        }

        #[test]
        fn generate_requires_out() {
            let args = ["idbgen", "generate", "--runtime", "rt.json"];
            assert!(Cli::try_parse_from(args).is_err());
        }

        #[test]
        fn parse_dump() {
            let args = ["idbgen", "dump", "db/builtins.idb"];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.command, Command::Dump { file } if file == PathBuf::from("db/builtins.idb")));
        }

        #[test]
        fn parse_log_level_debug() {
            let args = ["idbgen", "--log-level", "debug", "dump", "x.idb"];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
        }

        #[test]
        fn default_log_level_is_warn() {
            let args = ["idbgen", "dump", "x.idb"];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Warn));
        }
    }

    #[test]
    fn resolver_arg_converts() {
        assert_eq!(ResolverKind::from(ResolverArg::Docstring), ResolverKind::Docstring);
        assert_eq!(ResolverKind::from(ResolverArg::Introspect), ResolverKind::Introspect);
    }

    #[test]
    fn trace_level_converts() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}

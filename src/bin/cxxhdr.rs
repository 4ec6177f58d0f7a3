//! Thin CLI demo: reads a preprocessed C++ header, parses it, and prints
//! the resulting AST as JSON. Out-of-core — the library crate is the
//! supported surface, this binary exists so the parser can be exercised
//! from a shell.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cxxhdr::{ExternTemplateHandling, MethodBody, Options, PreprocessorLines};

mod visit_printer;
use visit_printer::PrintVisitor;

#[derive(Parser)]
#[command(name = "cxxhdr")]
#[command(about = "Parse a preprocessed C++ header and print its AST")]
#[command(version)]
struct Cli {
    /// Header file to parse
    path: PathBuf,

    /// Load `Options` from a `.toml` or `.json` file instead of (or layered
    /// under) the flags below
    #[arg(long)]
    options: Option<PathBuf>,

    /// Stream declarations through a `Visitor` as they complete instead of
    /// printing the built AST
    #[arg(long)]
    visit: bool,

    /// Pretty-print the JSON AST (otherwise compact)
    #[arg(long)]
    pretty: bool,

    /// Retain function/method bodies as opaque token text instead of skipping them
    #[arg(long)]
    retain_bodies: bool,

    /// Drop preprocessor lines (`#include`, `#pragma`, ...) instead of retaining them
    #[arg(long)]
    drop_pp_lines: bool,

    /// Refuse to silently accept unrecognized vendor extensions
    #[arg(long)]
    strict: bool,

    /// Comma-separated identifiers to seed the global scope's type table
    #[arg(long, value_delimiter = ',')]
    known_type: Vec<String>,

    /// Show debug info (sets RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

/// Load a base `Options` value from `path`, sniffing TOML vs. JSON by
/// extension — mirrors how the teacher's `Config::load` picks a format.
fn load_options_file(path: &std::path::Path) -> Result<Options> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} as JSON options", path.display())),
        _ => toml::from_str(&text)
            .with_context(|| format!("failed to parse {} as TOML options", path.display())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let base = match &cli.options {
        Some(path) => load_options_file(path)?,
        None => Options::default(),
    };
    let options = Options {
        preprocessor_lines: if cli.drop_pp_lines {
            PreprocessorLines::Ignore
        } else {
            base.preprocessor_lines
        },
        method_body: if cli.retain_bodies {
            MethodBody::RetainTokens
        } else {
            base.method_body
        },
        extern_template_handling: ExternTemplateHandling::Record,
        known_type_names: cli
            .known_type
            .into_iter()
            .chain(base.known_type_names)
            .collect(),
        strict: cli.strict || base.strict,
        ..base
    };

    let source = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let filename = cli.path.display().to_string();

    if cli.visit {
        let mut visitor = PrintVisitor::default();
        return match cxxhdr::parse_with_visitor(&filename, &source, options, &mut visitor) {
            Ok((_, diagnostics)) => {
                for diag in &diagnostics {
                    eprintln!("{} {}: {}", "warning:".yellow().bold(), diag.location, diag.message);
                }
                Ok(())
            }
            Err(failure) => {
                eprintln!("{} {}", "error:".red().bold(), failure.error);
                std::process::exit(1);
            }
        };
    }

    match cxxhdr::parse(&filename, &source, options) {
        Ok((ast, diagnostics)) => {
            for diag in &diagnostics {
                eprintln!("{} {}: {}", "warning:".yellow().bold(), diag.location, diag.message);
            }
            let json = if cli.pretty {
                serde_json::to_string_pretty(&ast)?
            } else {
                serde_json::to_string(&ast)?
            };
            println!("{json}");
            if !diagnostics.is_empty() {
                eprintln!(
                    "{} {} declaration(s) skipped",
                    "note:".blue().bold(),
                    diagnostics.len()
                );
            }
            Ok(())
        }
        Err(failure) => {
            eprintln!("{} {}", "error:".red().bold(), failure.error);
            std::process::exit(1);
        }
    }
}

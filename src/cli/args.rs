//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    catalog::CatalogCommands, completions::CompletionsArgs, form::FormCommands, init::InitArgs,
    submit::SubmitArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "cft")]
#[command(author, version, about = "Cascade Field Toolkit")]
#[command(
    long_about = "A toolkit for catalog-driven dependent form fields: plain-text YAML form definitions, a country/region catalog, and a submission pipeline that rebinds dependent fields at the form lifecycle points."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (pipeline tracing on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .cft/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new CFT project
    Init(InitArgs),

    /// Inspect and populate the country/region catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Manage form definitions
    #[command(subcommand)]
    Form(FormCommands),

    /// Run a submission through a form's lifecycle pipeline
    Submit(SubmitArgs),

    /// Validate project files against schemas
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Choose per command (table for lists, yaml for show)
    #[default]
    Auto,
    /// Rendered table
    Table,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then the fallback
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        match configured {
            Some("table") => OutputFormat::Table,
            Some("yaml") => OutputFormat::Yaml,
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => fallback,
        }
    }
}

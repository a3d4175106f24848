//! `cft validate` command - validate project files against schemas
//!
//! Catalog and form files are checked against the embedded JSON Schemas;
//! form files that pass additionally get the structural cascade/section
//! checks from the definition itself.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_project;
use crate::form::FormDefinition;
use crate::schema::{SchemaKind, Validator};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Validate only these files (default: all project files)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let validator = Validator::new();

    let files: Vec<PathBuf> = if args.paths.is_empty() {
        let project = open_project(global)?;
        let mut files = Vec::new();
        if project.countries_file().exists() {
            files.push(project.countries_file());
        }
        files.extend(project.iter_region_files());
        files.extend(project.iter_form_files());
        files
    } else {
        args.paths.clone()
    };

    if files.is_empty() {
        println!("Nothing to validate.");
        return Ok(());
    }

    let mut failures = 0usize;

    for path in &files {
        let Some(kind) = SchemaKind::for_path(path) else {
            if !global.quiet {
                println!(
                    "{} {} (skipped: not a catalog or form file)",
                    style("-").dim(),
                    path.display()
                );
            }
            continue;
        };

        let content = std::fs::read_to_string(path).into_diagnostic()?;
        let filename = path.display().to_string();

        match validator.validate(&content, &filename, kind) {
            Ok(()) => {
                if kind == SchemaKind::Form {
                    if let Err(e) = check_form(&content, &filename) {
                        failures += 1;
                        eprintln!("{} {}: {}", style("x").red(), path.display(), e);
                        continue;
                    }
                }
                if !global.quiet {
                    println!("{} {}", style("+").green(), path.display());
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{:?}", miette::Report::new(e));
            }
        }
    }

    if failures > 0 {
        Err(miette::miette!("{} file(s) failed validation", failures))
    } else {
        if !global.quiet {
            println!();
            println!("{} All files valid", style("+").green());
        }
        Ok(())
    }
}

fn check_form(content: &str, filename: &str) -> Result<()> {
    let form: FormDefinition = crate::yaml::parse_yaml_str(content, filename)?;
    form.check().into_diagnostic()
}

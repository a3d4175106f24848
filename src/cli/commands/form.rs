//! `cft form` command - manage form definitions

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::Tabled;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{open_project, truncate_str};
use crate::cli::table;
use crate::core::Config;
use crate::form::FormDefinition;

#[derive(Subcommand, Debug)]
pub enum FormCommands {
    /// List form definitions
    List,

    /// Show a form definition
    Show(ShowArgs),

    /// Open a form definition in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Form name (forms/<NAME>.yaml)
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Form name (forms/<NAME>.yaml)
    pub name: String,
}

pub fn run(cmd: FormCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FormCommands::List => run_list(global),
        FormCommands::Show(args) => run_show(args, global),
        FormCommands::Edit(args) => run_edit(args, global),
    }
}

#[derive(Tabled)]
struct FormRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "FIELDS")]
    fields: usize,
    #[tabled(rename = "CASCADES")]
    cascades: usize,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let mut forms: Vec<FormDefinition> = Vec::new();
    for path in project.iter_form_files() {
        match FormDefinition::load(&path) {
            Ok(form) => forms.push(form),
            Err(e) => {
                eprintln!(
                    "{} Failed to parse {}: {}",
                    style("!").yellow(),
                    path.display(),
                    e
                );
            }
        }
    }

    if forms.is_empty() {
        println!("No form definitions found.");
        println!();
        println!(
            "Add one under {}",
            style(project.forms_dir().display()).cyan()
        );
        return Ok(());
    }

    let format = global.format.resolve(None, OutputFormat::Table);
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&forms).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&forms).into_diagnostic()?);
        }
        _ => {
            let rows: Vec<FormRow> = forms
                .iter()
                .map(|form| FormRow {
                    name: form.name.clone(),
                    title: truncate_str(form.title.as_deref().unwrap_or(""), 38),
                    fields: form.fields.len(),
                    cascades: form.cascades.len(),
                })
                .collect();
            println!("{}", table::render(rows));
            if !global.quiet {
                println!("{} form(s)", style(forms.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let path = project.form_file(&args.name);
    if !path.exists() {
        return Err(miette::miette!(
            "form '{}' not found at {}",
            args.name,
            path.display()
        ));
    }

    let form = FormDefinition::load(&path)?;

    let format = global.format.resolve(None, OutputFormat::Yaml);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&form).into_diagnostic()?);
        }
        _ => {
            print!("{}", serde_yml::to_string(&form).into_diagnostic()?);
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let path = project.form_file(&args.name);
    if !path.exists() {
        return Err(miette::miette!(
            "form '{}' not found at {}",
            args.name,
            path.display()
        ));
    }

    let config = Config::load();
    let status = config.run_editor(&path).into_diagnostic()?;
    if !status.success() {
        return Err(miette::miette!("editor exited with {}", status));
    }
    Ok(())
}

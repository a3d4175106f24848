//! `cft submit` command - run a submission through a form's pipeline
//!
//! Loads the form definition and catalog, binds the optional record, runs
//! the pre-populate stage, takes the submission (from a file or interactive
//! prompts), runs the pre-submit stage, and prints the outcome.

use chrono::{DateTime, Utc};
use console::style;
use dialoguer::{Confirm, Input, Password, Select};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::{load_catalog, InMemoryCatalog};
use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{escape_csv, open_project};
use crate::cli::table;
use crate::core::field::{ChoiceSource, FieldDescriptor, WidgetKind};
use crate::core::snapshot::{FormSnapshot, Record};
use crate::core::Config;
use crate::form::{FormDefinition, FormPipeline, LifecycleStage};

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// Form name (forms/<NAME>.yaml)
    pub form: String,

    /// YAML file of submitted field values
    #[arg(long, short = 'd', conflicts_with = "interactive")]
    pub data: Option<PathBuf>,

    /// YAML file of previously persisted values to bind the form to
    #[arg(long, short = 'r')]
    pub record: Option<PathBuf>,

    /// Prompt for field values interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

/// What a completed pipeline run produced
#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
    pub form: String,
    pub completed: DateTime<Utc>,
    pub discarded: bool,
    pub data: BTreeMap<String, String>,
}

pub fn run(args: SubmitArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let form_path = project.form_file(&args.form);
    if !form_path.exists() {
        return Err(miette::miette!(
            "form '{}' not found at {}",
            args.form,
            form_path.display()
        ));
    }
    let definition = FormDefinition::load(&form_path)?;
    definition.check().into_diagnostic()?;

    let report = load_catalog(&project)?;
    for warning in &report.warnings {
        eprintln!(
            "{} {}: {}",
            style("!").yellow(),
            warning.file.display(),
            warning.message
        );
    }
    let catalog = report.catalog;

    let record: Record = match &args.record {
        Some(path) => load_values(path)?.into_iter().collect(),
        None => Record::new(),
    };

    let pipeline = FormPipeline::standard(&definition);
    let mut snapshot = definition.snapshot();
    snapshot.bind_record(record);
    pipeline
        .run(LifecycleStage::PrePopulate, &mut snapshot, &catalog)
        .into_diagnostic()?;

    let submitted: Vec<(String, String)> = if args.interactive {
        prompt_submission(&snapshot, &catalog)?
    } else if let Some(path) = &args.data {
        load_values(path)?
    } else {
        return Err(miette::miette!(
            "pass --data FILE or --interactive to provide the submission"
        ));
    };

    snapshot.begin_submission(submitted);
    pipeline
        .run(LifecycleStage::PreSubmit, &mut snapshot, &catalog)
        .into_diagnostic()?;

    let outcome = SubmissionOutcome {
        form: definition.name.clone(),
        completed: Utc::now(),
        discarded: snapshot.is_discarded(),
        data: snapshot
            .values()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    };

    print_outcome(&outcome, &snapshot, global)
}

/// Read a flat YAML mapping of field values; scalars are stringified as-is
fn load_values(path: &Path) -> Result<Vec<(String, String)>> {
    let value: serde_yml::Value = crate::yaml::parse_yaml_file(path)?;

    let Some(mapping) = value.as_mapping() else {
        return Err(miette::miette!(
            "{}: expected a mapping of field values",
            path.display()
        ));
    };

    let mut values = Vec::new();
    for (key, value) in mapping {
        let key = key.as_str();
        let value = match value {
            serde_yml::Value::Null => String::new(),
            serde_yml::Value::String(s) => s.clone(),
            serde_yml::Value::Bool(b) => b.to_string(),
            serde_yml::Value::Number(n) => n.to_string(),
            other => {
                return Err(miette::miette!(
                    "{}: field '{}' must be a scalar, got {:?}",
                    path.display(),
                    key,
                    other
                ));
            }
        };
        values.push((key.to_string(), value));
    }
    Ok(values)
}

/// Prompt for every field the pre-populate stage left in the snapshot.
/// The dependent field is only prompted for when its parent put it there.
fn prompt_submission(
    snapshot: &FormSnapshot,
    catalog: &InMemoryCatalog,
) -> Result<Vec<(String, String)>> {
    let mut values = Vec::new();

    for field in snapshot.fields() {
        let current = snapshot.value_of(&field.name).unwrap_or("");
        let value = prompt_field(field, current, catalog)?;
        values.push((field.name.clone(), value));
    }

    Ok(values)
}

fn prompt_field(
    field: &FieldDescriptor,
    current: &str,
    catalog: &InMemoryCatalog,
) -> Result<String> {
    match field.widget {
        WidgetKind::Checkbox => {
            let on = Confirm::new()
                .with_prompt(field.name.clone())
                .default(!current.is_empty() && current != "0" && current != "false")
                .interact()
                .into_diagnostic()?;
            Ok(if on { "1".to_string() } else { "0".to_string() })
        }
        WidgetKind::Password => Password::new()
            .with_prompt(field.name.clone())
            .allow_empty_password(true)
            .interact()
            .into_diagnostic(),
        _ => match &field.choices {
            ChoiceSource::Static(choices) => prompt_choice(&field.name, choices, current),
            ChoiceSource::Catalog(query) => {
                let regions = query.fetch(catalog).into_diagnostic()?;
                let codes: Vec<String> = regions.iter().map(|r| r.code.to_string()).collect();
                let labels: Vec<String> = regions
                    .iter()
                    .map(|r| format!("{} ({})", r.name, r.code))
                    .collect();
                let picked = prompt_choice(&field.name, &labels, "")?;
                match labels.iter().position(|l| l == &picked) {
                    Some(index) => Ok(codes[index].clone()),
                    None => Ok(String::new()),
                }
            }
            ChoiceSource::None => {
                let mut input = Input::<String>::new()
                    .with_prompt(field.name.clone())
                    .allow_empty(true);
                if !current.is_empty() {
                    input = input.with_initial_text(current.to_string());
                }
                input.interact_text().into_diagnostic()
            }
        },
    }
}

fn prompt_choice(name: &str, choices: &[String], current: &str) -> Result<String> {
    let mut items: Vec<String> = vec!["(none)".to_string()];
    items.extend(choices.iter().cloned());

    let default = choices
        .iter()
        .position(|c| c == current)
        .map(|i| i + 1)
        .unwrap_or(0);

    let picked = Select::new()
        .with_prompt(name.to_string())
        .items(&items)
        .default(default)
        .interact()
        .into_diagnostic()?;

    if picked == 0 {
        Ok(String::new())
    } else {
        Ok(items[picked].clone())
    }
}

#[derive(tabled::Tabled)]
struct OutcomeRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "WIDGET")]
    widget: String,
    #[tabled(rename = "CHOICES")]
    choices: String,
}

fn print_outcome(
    outcome: &SubmissionOutcome,
    snapshot: &FormSnapshot,
    global: &GlobalOpts,
) -> Result<()> {
    let config = Config::load();
    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Table);

    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(outcome).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("field,value");
            for (key, value) in snapshot.values() {
                println!("{},{}", key, escape_csv(value));
            }
        }
        _ => {
            println!(
                "{} Submission processed through form '{}'",
                style("+").green(),
                style(&outcome.form).cyan()
            );
            if outcome.discarded {
                println!(
                    "{} All values empty - bound record discarded",
                    style("!").yellow()
                );
            }

            let rows: Vec<OutcomeRow> = snapshot
                .values()
                .map(|(key, value)| {
                    let (widget, choices) = match snapshot.field(key) {
                        Some(field) => (
                            field.widget.to_string(),
                            match &field.choices {
                                ChoiceSource::None => String::new(),
                                ChoiceSource::Static(c) => format!("static ({})", c.len()),
                                ChoiceSource::Catalog(query) => query.to_string(),
                            },
                        ),
                        None => ("-".to_string(), String::new()),
                    };
                    OutcomeRow {
                        field: key.to_string(),
                        value: value.to_string(),
                        widget,
                        choices,
                    }
                })
                .collect();

            if rows.is_empty() {
                println!("(no field values survived the pipeline)");
            } else {
                println!("{}", table::render(rows));
            }
        }
    }

    Ok(())
}

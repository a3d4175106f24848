//! `cft catalog` command - inspect and populate the catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::Tabled;

use crate::catalog::{
    load_catalog, read_countries_csv, read_regions_csv, CatalogStore, CountriesFile, Country,
    CountryCode, InMemoryCatalog, LoadWarning, Region, RegionsFile,
};
use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{escape_csv, open_project};
use crate::cli::table;
use crate::core::Project;

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List all countries with their region counts
    List,

    /// Show one country and its regions
    Show(ShowArgs),

    /// Import countries and/or regions from CSV files
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Country code (e.g. US)
    pub code: String,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV of countries with `code,name` columns
    #[arg(long)]
    pub countries: Option<PathBuf>,

    /// CSV of regions with `code,name` columns (combined codes like US-CA)
    #[arg(long)]
    pub regions: Option<PathBuf>,
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::List => run_list(global),
        CatalogCommands::Show(args) => run_show(args, global),
        CatalogCommands::Import(args) => run_import(args, global),
    }
}

#[derive(Tabled)]
struct CountryRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "REGIONS")]
    regions: usize,
}

#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
}

fn print_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        eprintln!(
            "{} {}: {}",
            style("!").yellow(),
            warning.file.display(),
            warning.message
        );
    }
}

fn open_catalog(global: &GlobalOpts) -> Result<(Project, InMemoryCatalog)> {
    let project = open_project(global)?;
    let report = load_catalog(&project)?;
    print_warnings(&report.warnings);
    Ok((project, report.catalog))
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_, catalog) = open_catalog(global)?;

    let countries: Vec<Country> = catalog.countries().cloned().collect();
    if countries.is_empty() {
        println!("No countries in the catalog.");
        println!();
        println!(
            "Import some with: {}",
            style("cft catalog import --countries countries.csv").yellow()
        );
        return Ok(());
    }

    let format = global.format.resolve(None, OutputFormat::Table);
    match format {
        OutputFormat::Yaml => {
            let file = CountriesFile {
                countries: countries.clone(),
            };
            print!("{}", serde_yml::to_string(&file).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&countries).into_diagnostic()?
            );
        }
        OutputFormat::Csv => {
            println!("code,name,regions");
            for country in &countries {
                let count = catalog.regions_of(&country.code).into_diagnostic()?.len();
                println!(
                    "{},{},{}",
                    country.code,
                    escape_csv(&country.name),
                    count
                );
            }
        }
        _ => {
            let rows: Vec<CountryRow> = countries
                .iter()
                .map(|country| {
                    let count = catalog
                        .regions_of(&country.code)
                        .map(|r| r.len())
                        .unwrap_or(0);
                    CountryRow {
                        code: country.code.to_string(),
                        name: country.name.clone(),
                        regions: count,
                    }
                })
                .collect();
            println!("{}", table::render(rows));
            if !global.quiet {
                println!("{} country(ies)", style(countries.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, catalog) = open_catalog(global)?;

    let code: CountryCode = args
        .code
        .parse()
        .map_err(|e| miette::miette!("{}", e))?;

    let Some(country) = catalog.find_country(&code).into_diagnostic()? else {
        return Err(miette::miette!("country '{}' not found in catalog", code));
    };
    let regions = catalog.regions_of(&code).into_diagnostic()?;

    let format = global.format.resolve(None, OutputFormat::Table);
    match format {
        OutputFormat::Yaml => {
            let file = RegionsFile {
                country: country.code.clone(),
                regions,
            };
            print!("{}", serde_yml::to_string(&file).into_diagnostic()?);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "country": country,
                "regions": regions,
            });
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("code,name");
            for region in &regions {
                println!("{},{}", region.code, escape_csv(&region.name));
            }
        }
        _ => {
            println!(
                "{} {} ({})",
                style(&country.name).bold(),
                style(&country.code).cyan(),
                if regions.is_empty() {
                    "no regions".to_string()
                } else {
                    format!("{} regions", regions.len())
                }
            );
            if !regions.is_empty() {
                let rows: Vec<RegionRow> = regions
                    .iter()
                    .map(|region| RegionRow {
                        code: region.code.to_string(),
                        name: region.name.clone(),
                    })
                    .collect();
                println!("{}", table::render(rows));
            }
        }
    }

    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if args.countries.is_none() && args.regions.is_none() {
        return Err(miette::miette!(
            "nothing to import: pass --countries and/or --regions"
        ));
    }

    let project = open_project(global)?;

    if let Some(path) = &args.countries {
        let imported = read_countries_csv(path).into_diagnostic()?;
        let count = imported.len();
        merge_countries(&project, imported)?;
        println!("{} Imported {} country(ies)", style("+").green(), count);
    }

    if let Some(path) = &args.regions {
        let imported = read_regions_csv(path).into_diagnostic()?;
        let count = imported.len();
        let files = write_region_files(&project, imported)?;
        println!(
            "{} Imported {} region(s) into {} file(s)",
            style("+").green(),
            count,
            files
        );
    }

    Ok(())
}

/// Merge imported countries into countries.yaml, replacing entries by code
fn merge_countries(project: &Project, imported: Vec<Country>) -> Result<()> {
    let mut by_code: BTreeMap<CountryCode, Country> = BTreeMap::new();

    let path = project.countries_file();
    if path.exists() {
        let existing: CountriesFile = crate::yaml::parse_yaml_file(&path)?;
        for country in existing.countries {
            by_code.insert(country.code.clone(), country);
        }
    }
    for country in imported {
        by_code.insert(country.code.clone(), country);
    }

    let file = CountriesFile {
        countries: by_code.into_values().collect(),
    };
    std::fs::write(&path, serde_yml::to_string(&file).into_diagnostic()?).into_diagnostic()?;
    Ok(())
}

/// Group imported regions by country and rewrite one file per country
fn write_region_files(project: &Project, imported: Vec<Region>) -> Result<usize> {
    let mut by_country: BTreeMap<CountryCode, Vec<Region>> = BTreeMap::new();
    for region in imported {
        by_country
            .entry(region.country().clone())
            .or_default()
            .push(region);
    }

    let count = by_country.len();
    for (country, regions) in by_country {
        let path = project.regions_dir().join(format!("{}.yaml", country));
        let file = RegionsFile { country, regions };
        std::fs::write(&path, serde_yml::to_string(&file).into_diagnostic()?)
            .into_diagnostic()?;
    }
    Ok(count)
}

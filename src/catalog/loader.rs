//! Catalog file loading and CSV import
//!
//! Loads a project's catalog files into an `InMemoryCatalog`. The root
//! countries file must parse; individual region files that fail to parse or
//! that disagree with their declared country are skipped with a warning so
//! one bad file cannot take the whole catalog down.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::code::CountryCode;
use crate::catalog::country::{Country, Region};
use crate::catalog::store::InMemoryCatalog;
use crate::core::project::Project;
use crate::yaml::{self, YamlError};

/// Payload of `catalog/countries.yaml`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CountriesFile {
    pub countries: Vec<Country>,
}

/// Payload of one `catalog/regions/<CODE>.yaml` file
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsFile {
    /// The country all regions in this file belong to
    pub country: CountryCode,

    pub regions: Vec<Region>,
}

/// A non-fatal problem encountered while loading
#[derive(Debug)]
pub struct LoadWarning {
    pub file: PathBuf,
    pub message: String,
}

/// Result of loading a project catalog
#[derive(Debug)]
pub struct CatalogLoadReport {
    pub catalog: InMemoryCatalog,
    pub warnings: Vec<LoadWarning>,
}

/// Load the catalog files of a project
pub fn load_catalog(project: &Project) -> Result<CatalogLoadReport, YamlError> {
    let mut catalog = InMemoryCatalog::new();
    let mut warnings = Vec::new();

    let countries_path = project.countries_file();
    if countries_path.exists() {
        let file: CountriesFile = yaml::parse_yaml_file(&countries_path)?;
        for country in file.countries {
            catalog.insert_country(country);
        }
    }

    for path in project.iter_region_files() {
        match yaml::parse_yaml_file::<RegionsFile>(&path) {
            Ok(file) => {
                for region in file.regions {
                    if region.country() != &file.country {
                        warnings.push(LoadWarning {
                            file: path.clone(),
                            message: format!(
                                "region {} does not belong to declared country {}",
                                region.code, file.country
                            ),
                        });
                        continue;
                    }
                    catalog.insert_region(region);
                }
            }
            Err(e) => warnings.push(LoadWarning {
                file: path.clone(),
                message: e.to_string(),
            }),
        }
    }

    Ok(CatalogLoadReport { catalog, warnings })
}

/// Errors that can occur during CSV import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Read countries from a CSV file with `code,name` columns
pub fn read_countries_csv(path: &Path) -> Result<Vec<Country>, ImportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut countries = Vec::new();
    for row in reader.deserialize() {
        let country: Country = row?;
        countries.push(country);
    }
    Ok(countries)
}

/// Read regions from a CSV file with `code,name` columns (combined codes)
pub fn read_regions_csv(path: &Path) -> Result<Vec<Region>, ImportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut regions = Vec::new();
    for row in reader.deserialize() {
        let region: Region = row?;
        regions.push(region);
    }
    Ok(regions)
}

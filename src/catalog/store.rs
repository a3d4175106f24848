//! Catalog store - the lookup seam between the form layer and catalog data
//!
//! The form pipeline only ever talks to a `CatalogStore`. An unavailable
//! backing store is an error and propagates; an unknown country is not an
//! error and resolves to `Ok(None)`.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::code::CountryCode;
use crate::catalog::country::{Country, Region};

/// Errors that can occur while consulting the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog backing store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup interface consumed by the form layer
pub trait CatalogStore {
    /// Find a country by code. Unknown codes are `Ok(None)`, not errors.
    fn find_country(&self, code: &CountryCode) -> Result<Option<Country>, CatalogError>;

    /// Whether the country has any regions
    fn has_regions(&self, code: &CountryCode) -> Result<bool, CatalogError>;

    /// All regions of the country, in catalog order
    fn regions_of(&self, code: &CountryCode) -> Result<Vec<Region>, CatalogError>;
}

/// The standard in-memory store, usually populated from project catalog files
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    countries: BTreeMap<CountryCode, Country>,
    regions: BTreeMap<CountryCode, Vec<Region>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a country, replacing any existing entry with the same code
    pub fn insert_country(&mut self, country: Country) {
        self.countries.insert(country.code.clone(), country);
    }

    /// Add a region under its country prefix
    pub fn insert_region(&mut self, region: Region) {
        self.regions
            .entry(region.country().clone())
            .or_default()
            .push(region);
    }

    /// All known countries, in code order
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn find_country(&self, code: &CountryCode) -> Result<Option<Country>, CatalogError> {
        Ok(self.countries.get(code).cloned())
    }

    fn has_regions(&self, code: &CountryCode) -> Result<bool, CatalogError> {
        Ok(self.regions.get(code).is_some_and(|r| !r.is_empty()))
    }

    fn regions_of(&self, code: &CountryCode) -> Result<Vec<Region>, CatalogError> {
        Ok(self.regions.get(code).cloned().unwrap_or_default())
    }
}

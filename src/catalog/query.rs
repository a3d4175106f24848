//! Deferred allowed-value queries
//!
//! A `RegionQuery` carries only its parameter. The legal value set is
//! materialized by whoever renders or validates the field, by calling
//! `fetch` against a store at that moment - never when the query is built.

use serde::Serialize;
use std::fmt;

use crate::catalog::code::CountryCode;
use crate::catalog::country::Region;
use crate::catalog::store::{CatalogError, CatalogStore};

/// A lazily-evaluated lookup of one country's regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionQuery {
    country: CountryCode,
}

impl RegionQuery {
    /// Build a query parameterized by the given country.
    ///
    /// Each call yields an independent query; queries are never reused
    /// across different countries.
    pub fn for_country(country: CountryCode) -> Self {
        Self { country }
    }

    /// The country this query is parameterized by
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    /// Evaluate the query against a store
    pub fn fetch(&self, store: &dyn CatalogStore) -> Result<Vec<Region>, CatalogError> {
        store.regions_of(&self.country)
    }
}

impl fmt::Display for RegionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "regions of {}", self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::country::Country;
    use crate::catalog::store::InMemoryCatalog;

    #[test]
    fn test_query_holds_only_its_parameter() {
        let q1 = RegionQuery::for_country("US".parse().unwrap());
        let q2 = RegionQuery::for_country("DE".parse().unwrap());
        assert_ne!(q1, q2);
        assert_eq!(q1.country().as_str(), "US");
        assert_eq!(q2.country().as_str(), "DE");
    }

    #[test]
    fn test_fetch_resolves_at_call_time() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_country(Country::new("US".parse().unwrap(), "United States"));

        let query = RegionQuery::for_country("US".parse().unwrap());
        assert!(query.fetch(&catalog).unwrap().is_empty());

        // A region added after the query was built is still visible
        catalog.insert_region(Region::new("US-CA".parse().unwrap(), "California"));
        let regions = query.fetch(&catalog).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "California");
    }

    #[test]
    fn test_display() {
        let query = RegionQuery::for_country("US".parse().unwrap());
        assert_eq!(query.to_string(), "regions of US");
    }
}

//! Dependent field policy resolution
//!
//! Given a parent selection, decide whether the dependent field exists and
//! where its legal values come from. Resolution is a pure function of the
//! parent identity and the current catalog state: every call builds an
//! independent query, so a policy resolved for one parent can never leak
//! into another.

use crate::catalog::code::CountryCode;
use crate::catalog::query::RegionQuery;
use crate::catalog::store::{CatalogError, CatalogStore};
use crate::core::field::WidgetKind;

/// What should happen to the dependent field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependentFieldPolicy {
    /// Parent missing, unknown, or without dependent values: the dependent
    /// field must not be structurally present
    Suppressed,

    /// Parent has dependent values; `query` is evaluated on demand by the
    /// renderer/validator
    Active {
        query: RegionQuery,
        widget: WidgetKind,
    },
}

impl DependentFieldPolicy {
    pub fn is_active(&self) -> bool {
        matches!(self, DependentFieldPolicy::Active { .. })
    }
}

/// Resolve the policy for a parent selection.
///
/// An unknown parent is not an error: it resolves to `Suppressed`. A failing
/// store propagates.
pub fn resolve(
    store: &dyn CatalogStore,
    parent: Option<&CountryCode>,
    widget: WidgetKind,
) -> Result<DependentFieldPolicy, CatalogError> {
    let Some(code) = parent else {
        return Ok(DependentFieldPolicy::Suppressed);
    };

    let Some(country) = store.find_country(code)? else {
        return Ok(DependentFieldPolicy::Suppressed);
    };

    if store.has_regions(&country.code)? {
        Ok(DependentFieldPolicy::Active {
            query: RegionQuery::for_country(country.code),
            widget,
        })
    } else {
        Ok(DependentFieldPolicy::Suppressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::country::{Country, Region};
    use crate::catalog::store::InMemoryCatalog;

    fn store() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_country(Country::new("US".parse().unwrap(), "United States"));
        catalog.insert_country(Country::new("DE".parse().unwrap(), "Germany"));
        catalog.insert_country(Country::new("FJ".parse().unwrap(), "Fiji"));
        catalog.insert_region(Region::new("US-CA".parse().unwrap(), "California"));
        catalog.insert_region(Region::new("DE-BW".parse().unwrap(), "Baden-Wurttemberg"));
        catalog
    }

    #[test]
    fn test_missing_parent_is_suppressed() {
        let policy = resolve(&store(), None, WidgetKind::Select).unwrap();
        assert_eq!(policy, DependentFieldPolicy::Suppressed);
    }

    #[test]
    fn test_unknown_parent_is_suppressed_not_an_error() {
        let code: CountryCode = "ZZ".parse().unwrap();
        let policy = resolve(&store(), Some(&code), WidgetKind::Select).unwrap();
        assert_eq!(policy, DependentFieldPolicy::Suppressed);
    }

    #[test]
    fn test_parent_without_regions_is_suppressed() {
        let code: CountryCode = "FJ".parse().unwrap();
        let policy = resolve(&store(), Some(&code), WidgetKind::Select).unwrap();
        assert_eq!(policy, DependentFieldPolicy::Suppressed);
    }

    #[test]
    fn test_active_query_is_parameterized_by_exactly_the_parent() {
        let catalog = store();

        // resolve one parent, then another: each query carries its own parent,
        // independent of resolution order
        let us: CountryCode = "US".parse().unwrap();
        let de: CountryCode = "DE".parse().unwrap();

        let first = resolve(&catalog, Some(&us), WidgetKind::Select).unwrap();
        let second = resolve(&catalog, Some(&de), WidgetKind::Select).unwrap();

        match (first, second) {
            (
                DependentFieldPolicy::Active { query: q1, .. },
                DependentFieldPolicy::Active { query: q2, .. },
            ) => {
                assert_eq!(q1.country(), &us);
                assert_eq!(q2.country(), &de);
                assert_ne!(q1, q2);
            }
            other => panic!("expected two active policies, got {:?}", other),
        }
    }
}

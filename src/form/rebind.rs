//! Cascade rebind step
//!
//! The dependent-field engine. At pre-populate it introduces the dependent
//! field when the bound record's parent selection has regions; at pre-submit
//! it rebuilds the field against the submitted parent and enforces the
//! structured-value / free-text exclusivity rule on the raw data.

use crate::catalog::code::CountryCode;
use crate::catalog::query::RegionQuery;
use crate::core::field::{FieldDescriptor, WidgetKind};
use crate::core::snapshot::FormSnapshot;
use crate::form::definition::CascadeDef;
use crate::form::pipeline::{FormStep, LifecycleStage, PipelineError, StepContext};
use crate::form::resolver::{resolve, DependentFieldPolicy};

/// Rebinds one dependent field according to its parent selection
pub struct CascadeRebindStep {
    parent: String,
    field: String,
    fallback: Option<String>,
    widget: WidgetKind,
    name: String,
}

impl CascadeRebindStep {
    pub fn new(cascade: &CascadeDef) -> Self {
        Self {
            parent: cascade.parent.clone(),
            field: cascade.field.clone(),
            fallback: cascade.fallback.clone(),
            widget: cascade.widget,
            name: format!("cascade:{}", cascade.field),
        }
    }

    /// Precondition: the snapshot is bound to its record.
    /// Postcondition: the dependent descriptor is present iff the record's
    /// parent has regions, its query parameterized by that parent, its value
    /// seeded from the record.
    fn pre_populate(&self, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        let Some(parent_raw) = ctx.snapshot.record().get_nonempty(&self.parent) else {
            return Ok(());
        };
        // a code the catalog grammar rejects cannot exist in the catalog
        let Some(code) = parse_parent(parent_raw) else {
            return Ok(());
        };

        match resolve(ctx.store, Some(&code), self.widget)? {
            DependentFieldPolicy::Suppressed => Ok(()),
            DependentFieldPolicy::Active { query, widget } => {
                tracing::debug!(field = %self.field, country = %query.country(), "rebinding dependent field");
                self.rebind(ctx.snapshot, widget, query);
                let seed = ctx
                    .snapshot
                    .record()
                    .get_nonempty(&self.field)
                    .map(str::to_string);
                if let Some(value) = seed {
                    ctx.snapshot.set_value(self.field.clone(), value);
                }
                Ok(())
            }
        }
    }

    /// Precondition: the snapshot data holds the raw submission.
    /// Postcondition: the dependent descriptor is rebuilt (active parent) or
    /// removed (suppressed parent); at most one of {structured value,
    /// fallback value} remains in the data; absent keys are never created.
    fn pre_submit(&self, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        let code = ctx
            .snapshot
            .value_of(&self.parent)
            .filter(|v| !v.is_empty())
            .and_then(parse_parent);

        match resolve(ctx.store, code.as_ref(), self.widget)? {
            DependentFieldPolicy::Active { query, widget } => {
                tracing::debug!(field = %self.field, country = %query.country(), "rebinding dependent field");
                self.rebind(ctx.snapshot, widget, query);

                if let Some(fallback) = &self.fallback {
                    let had_text = ctx.snapshot.record().get_nonempty(fallback).is_some();
                    let structured = ctx
                        .snapshot
                        .value_of(&self.field)
                        .is_some_and(|v| !v.is_empty());

                    // free text survives only when the record already carried
                    // it and no structured choice was submitted
                    if !had_text || structured {
                        ctx.snapshot.unset_value(fallback);
                    }
                }
            }
            DependentFieldPolicy::Suppressed => {
                // a stale structured choice must not outlive its parent
                ctx.snapshot.unset_value(&self.field);
                ctx.snapshot.remove_field(&self.field);
            }
        }
        Ok(())
    }

    fn rebind(&self, snapshot: &mut FormSnapshot, widget: WidgetKind, query: RegionQuery) {
        let prev = snapshot.field(&self.field).cloned();
        let descriptor = FieldDescriptor::rebuilt(prev.as_ref(), &self.field, widget, query);
        snapshot.upsert_field(descriptor);
    }
}

fn parse_parent(raw: &str) -> Option<CountryCode> {
    raw.parse().ok()
}

impl FormStep for CascadeRebindStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn stages(&self) -> &[LifecycleStage] {
        &[LifecycleStage::PrePopulate, LifecycleStage::PreSubmit]
    }

    fn apply(&self, stage: LifecycleStage, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        match stage {
            LifecycleStage::PrePopulate => self.pre_populate(ctx),
            LifecycleStage::PreSubmit => self.pre_submit(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::country::{Country, Region};
    use crate::catalog::store::{CatalogError, CatalogStore, InMemoryCatalog};
    use crate::core::field::ChoiceSource;
    use crate::core::snapshot::Record;

    fn store() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_country(Country::new("US".parse().unwrap(), "United States"));
        catalog.insert_country(Country::new("DE".parse().unwrap(), "Germany"));
        catalog.insert_country(Country::new("FJ".parse().unwrap(), "Fiji"));
        catalog.insert_region(Region::new("US-CA".parse().unwrap(), "California"));
        catalog.insert_region(Region::new("US-NY".parse().unwrap(), "New York"));
        catalog.insert_region(Region::new("DE-BW".parse().unwrap(), "Baden-Wurttemberg"));
        catalog
    }

    fn step() -> CascadeRebindStep {
        CascadeRebindStep::new(&CascadeDef {
            parent: "country".to_string(),
            field: "region".to_string(),
            fallback: Some("region_text".to_string()),
            widget: WidgetKind::Select,
        })
    }

    fn snapshot() -> FormSnapshot {
        FormSnapshot::new(vec![
            FieldDescriptor::new("country", WidgetKind::Select),
            FieldDescriptor::new("region_text", WidgetKind::Text),
        ])
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(stage: LifecycleStage, snap: &mut FormSnapshot, catalog: &dyn CatalogStore) {
        let step = step();
        let mut ctx = StepContext {
            snapshot: snap,
            store: catalog,
        };
        step.apply(stage, &mut ctx).unwrap();
    }

    fn submit(snap: &mut FormSnapshot, pairs: &[(&str, &str)]) {
        snap.begin_submission(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        );
    }

    // ----- pre-populate -----

    #[test]
    fn test_pre_populate_without_parent_leaves_form_as_declared() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("region_text", "Somewhere")]));

        run(LifecycleStage::PrePopulate, &mut snap, &catalog);

        assert!(!snap.has_field("region"));
        assert_eq!(snap.fields().len(), 2);
    }

    #[test]
    fn test_pre_populate_parent_without_regions_adds_nothing() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("country", "FJ")]));

        run(LifecycleStage::PrePopulate, &mut snap, &catalog);

        assert!(!snap.has_field("region"));
        assert!(!snap.has_value("region"));
    }

    #[test]
    fn test_pre_populate_unknown_parent_adds_nothing() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("country", "ZZ")]));

        run(LifecycleStage::PrePopulate, &mut snap, &catalog);

        assert!(!snap.has_field("region"));
    }

    #[test]
    fn test_pre_populate_malformed_parent_behaves_as_unknown() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("country", "not-a-code")]));

        run(LifecycleStage::PrePopulate, &mut snap, &catalog);

        assert!(!snap.has_field("region"));
    }

    #[test]
    fn test_pre_populate_adds_dependent_field_seeded_from_record() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("country", "US"), ("region", "US-CA")]));

        run(LifecycleStage::PrePopulate, &mut snap, &catalog);

        let field = snap.field("region").expect("region field added");
        assert_eq!(field.widget, WidgetKind::Select);
        match &field.choices {
            ChoiceSource::Catalog(query) => assert_eq!(query.country().as_str(), "US"),
            other => panic!("expected catalog choices, got {:?}", other),
        }
        assert_eq!(snap.value_of("region"), Some("US-CA"));
    }

    #[test]
    fn test_pre_populate_queries_do_not_leak_across_parents() {
        let catalog = store();

        let mut first = snapshot();
        first.bind_record(record(&[("country", "US")]));
        run(LifecycleStage::PrePopulate, &mut first, &catalog);

        let mut second = snapshot();
        second.bind_record(record(&[("country", "DE")]));
        run(LifecycleStage::PrePopulate, &mut second, &catalog);

        let q1 = match &first.field("region").unwrap().choices {
            ChoiceSource::Catalog(q) => q.clone(),
            _ => unreachable!(),
        };
        let q2 = match &second.field("region").unwrap().choices {
            ChoiceSource::Catalog(q) => q.clone(),
            _ => unreachable!(),
        };
        assert_eq!(q1.country().as_str(), "US");
        assert_eq!(q2.country().as_str(), "DE");
    }

    #[test]
    fn test_pre_populate_is_idempotent() {
        let catalog = store();
        let mut once = snapshot();
        once.bind_record(record(&[("country", "US"), ("region", "US-NY")]));
        run(LifecycleStage::PrePopulate, &mut once, &catalog);

        let mut twice = once.clone();
        run(LifecycleStage::PrePopulate, &mut twice, &catalog);

        assert_eq!(once, twice);
    }

    // ----- pre-submit -----

    #[test]
    fn test_pre_submit_keeps_fallback_when_record_had_text_and_no_choice_submitted() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("region_text", "Old Region")]));
        submit(
            &mut snap,
            &[("country", "US"), ("region", ""), ("region_text", "Old Region")],
        );

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert_eq!(snap.value_of("region_text"), Some("Old Region"));
    }

    #[test]
    fn test_pre_submit_drops_fallback_when_structured_choice_submitted() {
        let catalog = store();
        let mut snap = snapshot();
        // record had no free-text value
        snap.bind_record(record(&[("country", "US")]));
        submit(
            &mut snap,
            &[("country", "US"), ("region", "US-CA"), ("region_text", "typed text")],
        );

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert!(!snap.has_value("region_text"));
        assert_eq!(snap.value_of("region"), Some("US-CA"));
    }

    #[test]
    fn test_pre_submit_drops_fallback_even_with_prior_text_when_choice_submitted() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("region_text", "Old Region")]));
        submit(
            &mut snap,
            &[("country", "US"), ("region", "US-NY"), ("region_text", "Old Region")],
        );

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert!(!snap.has_value("region_text"));
    }

    #[test]
    fn test_pre_submit_parent_without_regions_drops_structured_value() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(Record::new());
        submit(
            &mut snap,
            &[("country", "FJ"), ("region", "5"), ("region_text", "Suva")],
        );

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert!(!snap.has_value("region"));
        assert_eq!(snap.value_of("region_text"), Some("Suva"));
    }

    #[test]
    fn test_pre_submit_unknown_parent_behaves_like_no_regions() {
        let catalog = store();
        let mut snap = snapshot();
        submit(
            &mut snap,
            &[("country", "ZZ"), ("region", "5"), ("region_text", "Suva")],
        );

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert!(!snap.has_value("region"));
        assert_eq!(snap.value_of("region_text"), Some("Suva"));
    }

    #[test]
    fn test_pre_submit_removes_descriptor_when_parent_loses_regions() {
        let catalog = store();
        let mut snap = snapshot();
        snap.bind_record(record(&[("country", "US"), ("region", "US-CA")]));
        run(LifecycleStage::PrePopulate, &mut snap, &catalog);
        assert!(snap.has_field("region"));

        // user switched to a country without regions before submitting
        submit(&mut snap, &[("country", "FJ"), ("region", "US-CA")]);
        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        assert!(!snap.has_field("region"));
        assert!(!snap.has_value("region"));
    }

    #[test]
    fn test_pre_submit_never_fabricates_keys() {
        let catalog = store();
        let mut snap = snapshot();
        submit(&mut snap, &[("street", "1 Main St")]);

        run(LifecycleStage::PreSubmit, &mut snap, &catalog);

        let keys: Vec<&str> = snap.values().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["street"]);
    }

    #[test]
    fn test_pre_submit_is_idempotent() {
        let catalog = store();
        let mut once = snapshot();
        once.bind_record(record(&[("region_text", "Old Region")]));
        submit(
            &mut once,
            &[("country", "US"), ("region", ""), ("region_text", "Old Region")],
        );
        run(LifecycleStage::PreSubmit, &mut once, &catalog);

        let mut twice = once.clone();
        run(LifecycleStage::PreSubmit, &mut twice, &catalog);

        assert_eq!(once, twice);
    }

    // ----- failure propagation -----

    struct FailingStore;

    impl CatalogStore for FailingStore {
        fn find_country(&self, _: &CountryCode) -> Result<Option<Country>, CatalogError> {
            Err(CatalogError::Unavailable("backing store offline".to_string()))
        }

        fn has_regions(&self, _: &CountryCode) -> Result<bool, CatalogError> {
            Err(CatalogError::Unavailable("backing store offline".to_string()))
        }

        fn regions_of(&self, _: &CountryCode) -> Result<Vec<Region>, CatalogError> {
            Err(CatalogError::Unavailable("backing store offline".to_string()))
        }
    }

    #[test]
    fn test_pre_submit_propagates_catalog_failure() {
        let mut snap = snapshot();
        submit(&mut snap, &[("country", "US")]);

        let rebind = step();
        let mut ctx = StepContext {
            snapshot: &mut snap,
            store: &FailingStore,
        };
        let err = rebind.apply(LifecycleStage::PreSubmit, &mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Catalog(_)));
    }
}

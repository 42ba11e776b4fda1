//! Differences between computed plans and the store of record.
//!
//! Changes are only reported. Writing plans back to the store is a separate
//! decision made outside this crate.

use crate::domain::{ServiceId, ServicePlan};
use crate::engine::RunCaches;
use serde::Serialize;
use std::collections::HashMap;

/// A classified service whose computed plan differs from the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanChange {
    /// The service
    pub service: ServiceId,
    /// Plan in the store, `None` when the store has no record
    pub previous: Option<ServicePlan>,
    /// Plan computed by this run
    pub computed: ServicePlan,
}

impl PlanChange {
    /// The value the store would hold for the computed plan.
    ///
    /// The store represents `UNCATEGORIZED` as an empty plan.
    pub fn store_value(&self) -> &'static str {
        match self.computed {
            ServicePlan::Uncategorized => "",
            plan => plan.label(),
        }
    }
}

/// List classified services whose computed plan differs from `stored`.
///
/// Services that only appeared as successors are not classified and never
/// produce a change. Results are ordered by service.
pub fn plan_changes(stored: &HashMap<ServiceId, ServicePlan>, caches: &RunCaches) -> Vec<PlanChange> {
    caches
        .paths()
        .keys()
        .filter_map(|service| {
            let computed = caches.category_of(service.as_str())?;
            let previous = stored.get(service).copied();
            (previous != Some(computed)).then(|| PlanChange {
                service: service.clone(),
                previous,
                computed,
            })
        })
        .collect()
}

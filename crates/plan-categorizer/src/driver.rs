//! Batch driver: classify every service of a run against shared caches.

use crate::domain::{Arn, ServiceId};
use crate::engine::{Categorizer, RunCaches, Sentinels};
use crate::graph::DependencyGraph;

/// Classify every service, in iteration order, sharing one [`RunCaches`].
///
/// Services are processed sequentially: later traversals read categories
/// that earlier ones discovered. Pass an ordered collection (e.g. a
/// `BTreeMap`) for reproducible audit output.
pub fn run_all<'a, I, A>(
    service_to_own_arns: I,
    graph: &DependencyGraph,
    sentinels: &Sentinels,
) -> RunCaches
where
    I: IntoIterator<Item = (&'a ServiceId, A)>,
    A: IntoIterator<Item = &'a Arn>,
{
    let categorizer = Categorizer::new(graph, sentinels);
    let mut caches = RunCaches::new();
    let mut classified = 0usize;

    for (service, own_arns) in service_to_own_arns {
        categorizer.classify(service, own_arns, &mut caches);
        classified += 1;
    }

    tracing::info!(
        services = classified,
        known_categories = caches.categories().len(),
        "Categorization run complete"
    );

    caches
}

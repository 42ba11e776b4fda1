//! End-to-end categorization behaviour over small dependency graphs.

use plan_categorizer::domain::{Arn, ServiceId, ServicePlan};
use plan_categorizer::driver::run_all;
use plan_categorizer::engine::{Categorizer, RunCaches, Sentinels};
use rstest::rstest;

mod common;
use common::{Fixture, LB, MANDATORY, task};

fn classify_one(fixture: &Fixture, service: &str, own: &[String]) -> RunCaches {
    let graph = fixture.graph();
    let sentinels = Sentinels::default();
    let own: Vec<Arn> = own.iter().map(|a| Arn::new(a.as_str())).collect();
    let mut caches = RunCaches::new();
    Categorizer::new(&graph, &sentinels).classify(&ServiceId::new(service), &own, &mut caches);
    caches
}

#[test]
fn launch_blocking_reached_through_a_mandatory_service() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("serviceX"))
        .node(&task("b"), Some("serviceY"))
        .node(LB, None)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), LB)
        .plan("serviceY", ServicePlan::Mandatory);

    let caches = run_all(&fixture.own_arns(), &fixture.graph(), &Sentinels::default());

    assert_eq!(caches.category_of("serviceX"), Some(ServicePlan::LaunchBlocking));
    let path = caches.path_of("serviceX").unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].node.arn.as_str(), task("b"));
    assert_eq!(path[0].category, ServicePlan::Mandatory);
    assert_eq!(path[0].predecessor.as_str(), task("a"));
    assert_eq!(path[1].node.arn.as_str(), LB);
    assert_eq!(path[1].category, ServicePlan::LaunchBlocking);
    assert_eq!(path[1].predecessor.as_str(), task("b"));

    // serviceY's own task reaches the sentinel as well.
    assert_eq!(caches.category_of("serviceY"), Some(ServicePlan::LaunchBlocking));
}

#[test]
fn launch_blocking_beats_an_earlier_mandatory_signal() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("b"), None)
        .node(MANDATORY, None)
        .node(LB, None)
        .edge(&task("a"), MANDATORY)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), LB);

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::LaunchBlocking));
    let arns: Vec<&str> = caches
        .path_of("svc")
        .unwrap()
        .iter()
        .map(|hop| hop.node.arn.as_str())
        .collect();
    assert_eq!(arns, vec![MANDATORY, LB]);
}

#[rstest]
#[case::mandatory_first(true)]
#[case::non_global_first(false)]
fn mandatory_is_not_downgraded_by_non_global(#[case] mandatory_first: bool) {
    let mut fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("ng"), Some("regional"))
        .node(MANDATORY, None)
        .plan("regional", ServicePlan::NonGlobal);
    fixture = if mandatory_first {
        fixture.edge(&task("a"), MANDATORY).edge(&task("a"), &task("ng"))
    } else {
        fixture.edge(&task("a"), &task("ng")).edge(&task("a"), MANDATORY)
    };

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::Mandatory));
    assert_eq!(caches.path_of("svc").unwrap().len(), 2);
}

#[test]
fn non_global_successor_makes_service_non_global() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("ng"), Some("regional"))
        .edge(&task("a"), &task("ng"))
        .plan("regional", ServicePlan::NonGlobal);

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::NonGlobal));
    assert_eq!(caches.category_of("regional"), Some(ServicePlan::NonGlobal));
}

#[test]
fn cycle_before_the_sentinel_terminates() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("b"), None)
        .node(&task("c"), None)
        .node(&task("d"), None)
        .node(&task("e"), None)
        .node(LB, None)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), &task("c"))
        .edge(&task("c"), &task("a"))
        .edge(&task("c"), &task("d"))
        .edge(&task("d"), &task("e"))
        .edge(&task("e"), LB);
    assert!(fixture.graph().has_cycle());

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::LaunchBlocking));
}

#[test]
fn cycle_without_signals_is_uncategorized() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("b"), None)
        .node(&task("c"), None)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), &task("c"))
        .edge(&task("c"), &task("b"));

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::Uncategorized));
    assert_eq!(caches.path_of("svc"), Some(&[][..]));
}

#[test]
fn cycle_back_to_own_task_reads_own_category() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("b"), None)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), &task("a"))
        .plan("svc", ServicePlan::Mandatory);

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::Mandatory));
    let path = caches.path_of("svc").unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].node.arn.as_str(), task("a"));
    assert_eq!(path[0].predecessor.as_str(), task("b"));
}

#[test]
fn service_without_edges_gets_empty_trail() {
    let fixture = Fixture::new().node(&task("lonely"), Some("svc"));

    let caches = run_all(&fixture.own_arns(), &fixture.graph(), &Sentinels::default());

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::Uncategorized));
    assert_eq!(caches.path_of("svc").map(<[_]>::len), Some(0));
}

#[test]
fn edge_to_unknown_sentinel_is_dropped() {
    // The sentinel is not among the known milestones, so the edge is out of scope.
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .edge(&task("a"), LB);

    let graph = fixture.graph();
    assert_eq!(graph.edge_count(), 0);
    assert!(!graph.contains(LB));

    let caches = classify_one(&fixture, "svc", &[task("a")]);
    assert_eq!(caches.category_of("svc"), Some(ServicePlan::Uncategorized));
}

#[test]
fn diamond_records_shared_successor_once_per_edge() {
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(&task("b"), None)
        .node(&task("c"), None)
        .node(&task("d"), Some("regional"))
        .edge(&task("a"), &task("b"))
        .edge(&task("a"), &task("c"))
        .edge(&task("b"), &task("d"))
        .edge(&task("c"), &task("d"))
        .plan("regional", ServicePlan::NonGlobal);

    let caches = classify_one(&fixture, "svc", &[task("a")]);

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::NonGlobal));
    let predecessors: Vec<&str> = caches
        .path_of("svc")
        .unwrap()
        .iter()
        .map(|hop| hop.predecessor.as_str())
        .collect();
    assert_eq!(predecessors, vec![task("b"), task("c")]);
}

#[test]
fn seed_from_short_circuited_walk_is_kept() {
    // serviceX -> taskB (serviceY, stored MANDATORY) -> launch-blocking sentinel
    let fixture = Fixture::new()
        .node(&task("a"), Some("serviceX"))
        .node(&task("b"), Some("serviceY"))
        .node(LB, None)
        .edge(&task("a"), &task("b"))
        .edge(&task("b"), LB)
        .plan("serviceY", ServicePlan::Mandatory);

    let caches = classify_one(&fixture, "serviceX", &[task("a")]);

    assert_eq!(caches.category_of("serviceX"), Some(ServicePlan::LaunchBlocking));
    assert_eq!(caches.category_of("serviceY"), Some(ServicePlan::Mandatory));
    assert!(caches.path_of("serviceY").is_none());
}

#[test]
fn earlier_category_overrides_stale_store_plan() {
    // "a" has no stored plan but is found launch blocking first; "b" depends on it.
    let fixture = Fixture::new()
        .node(&task("a"), Some("a"))
        .node(&task("b"), Some("b"))
        .node(LB, None)
        .edge(&task("a"), LB)
        .edge(&task("b"), &task("a"));

    let caches = run_all(&fixture.own_arns(), &fixture.graph(), &Sentinels::default());

    assert_eq!(caches.category_of("a"), Some(ServicePlan::LaunchBlocking));
    assert_eq!(caches.category_of("b"), Some(ServicePlan::LaunchBlocking));
    let first_hop = &caches.path_of("b").unwrap()[0];
    assert_eq!(first_hop.node.arn.as_str(), task("a"));
    assert_eq!(first_hop.category, ServicePlan::LaunchBlocking);
}

#[rstest]
#[case::forward(&["a", "b"])]
#[case::reverse(&["b", "a"])]
fn final_categories_do_not_depend_on_service_order(#[case] order: &[&str]) {
    let fixture = Fixture::new()
        .node(&task("a"), Some("a"))
        .node(&task("b"), Some("b"))
        .node(LB, None)
        .edge(&task("a"), LB)
        .edge(&task("b"), &task("a"));
    let own = fixture.own_arns();
    let ordered: Vec<(&ServiceId, &Vec<Arn>)> = order
        .iter()
        .map(|name| own.get_key_value(*name).unwrap())
        .collect();

    let caches = run_all(ordered, &fixture.graph(), &Sentinels::default());

    assert_eq!(caches.category_of("a"), Some(ServicePlan::LaunchBlocking));
    assert_eq!(caches.category_of("b"), Some(ServicePlan::LaunchBlocking));
}

#[test]
fn own_final_assignment_keeps_launch_blocking_seed() {
    // "b" runs first and seeds "a" as launch blocking from the store plan;
    // "a" itself later exhausts its frontier without any signal.
    let fixture = Fixture::new()
        .node(&task("a"), Some("a"))
        .node(&task("b"), Some("b"))
        .edge(&task("b"), &task("a"))
        .plan("a", ServicePlan::LaunchBlocking);
    let graph = fixture.graph();
    let sentinels = Sentinels::default();
    let categorizer = Categorizer::new(&graph, &sentinels);
    let mut caches = RunCaches::new();

    categorizer.classify(&ServiceId::new("b"), &[Arn::new(task("b"))], &mut caches);
    categorizer.classify(&ServiceId::new("a"), &[Arn::new(task("a"))], &mut caches);

    assert_eq!(caches.category_of("b"), Some(ServicePlan::LaunchBlocking));
    assert_eq!(caches.category_of("a"), Some(ServicePlan::LaunchBlocking));
}

#[test]
fn custom_sentinels_replace_defaults() {
    let blocking = "arn:aws:rmsv2:::milestone/custom-lb";
    let fixture = Fixture::new()
        .node(&task("a"), Some("svc"))
        .node(blocking, None)
        .node(LB, None)
        .edge(&task("a"), blocking);
    let graph = fixture.graph();
    let sentinels = Sentinels {
        launch_blocking: Arn::new(blocking),
        ..Sentinels::default()
    };
    let mut caches = RunCaches::new();

    Categorizer::new(&graph, &sentinels).classify(
        &ServiceId::new("svc"),
        &[Arn::new(task("a"))],
        &mut caches,
    );

    assert_eq!(caches.category_of("svc"), Some(ServicePlan::LaunchBlocking));
}

//! End-to-end navigation scenarios over small region trees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use region_nav::config::{parse_config, ChildFailurePolicy, NavigationConfig};
use region_nav::navigation::{AnyNavigator, Navigate, NavigationDataProvider};
use region_nav::routing::{DataContract, DataConverter, RouteData, ViewBinding};
use region_nav::{
    NavigationError, NavigationHost, NavigationRequest, RegionId, Route, RouteMap, RouteRegistry,
    Surface,
};

mod common;

use common::{BrokenSurface, RecordingDialogFactory, RecordingDialogs, TaggedSurface};

fn pages(pages: &[&str]) -> Arc<Surface> {
    Arc::new(Surface::pages(pages.iter().copied()))
}

#[tokio::test]
async fn test_internal_route_is_never_forwarded() {
    let (host, tracker, root) = common::host(RouteRegistry::default());
    let child = host.tree().insert_child(root, "", pages(&["second"])).unwrap();

    let internal = NavigationRequest::new(Route::parse("second").as_internal());
    let response = host.navigator(child).navigate(internal).await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "second");
    assert!(response.route.is_internal());
    assert_eq!(tracker.starts(root), 0);

    // The same route from outside goes through the unnamed region's parent.
    let response = host
        .navigator(child)
        .navigate(NavigationRequest::new("second"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.route.to_string(), "second");
    assert_eq!(tracker.starts(root), 1);
    assert_eq!(tracker.starts(child), 3);
    assert!(tracker.balanced());
}

#[tokio::test]
async fn test_root_route_appends_default_entry() {
    let routes = RouteRegistry::new(vec![
        RouteMap::new("second"),
        RouteMap::new("main").as_default(),
    ]);
    let (host, _tracker, root) = common::host(routes);
    let content = host.tree().insert_child(root, "", pages(&["main", "second"])).unwrap();

    let response = host.navigate("/").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "main");
    assert_eq!(host.tree().current_route(root), None);
    assert_eq!(host.tree().current_route(content).unwrap().to_string(), "main");

    // From a child, "/" is forwarded up and handled by the root.
    host.navigate("second").await.unwrap();
    let response = host
        .navigator(content)
        .navigate(NavigationRequest::new("/"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.route.to_string(), "main");
}

#[tokio::test]
async fn test_parent_routes() {
    let (host, tracker, root) = common::host(RouteRegistry::default());
    let child = host
        .tree()
        .insert_child(root, "", Arc::new(Surface::pass_through()))
        .unwrap();

    // "../" trims to nothing: resolved locally as empty.
    let response = host
        .navigator(child)
        .navigate(NavigationRequest::new("../").from_region(child))
        .await
        .unwrap();
    assert!(response.is_none());
    assert_eq!(tracker.starts(root), 0);

    // "../missing" is forwarded; the parent has nothing to show it with.
    let response = host
        .navigator(child)
        .navigate(NavigationRequest::new("../missing").from_region(child))
        .await
        .unwrap();
    assert!(response.is_none());
    assert_eq!(tracker.starts(root), 1);
    assert!(tracker.balanced());
}

/// root ─┬─ middle ── leaf
///        └─ sibling (shows "second")
fn three_levels(host: &NavigationHost, root: RegionId) -> (RegionId, RegionId, RegionId) {
    let tree = host.tree();
    let middle = tree.insert_child(root, "", Arc::new(Surface::pass_through())).unwrap();
    let leaf = tree.insert_child(middle, "", Arc::new(Surface::pass_through())).unwrap();
    let sibling = tree.insert_child(root, "", pages(&["second"])).unwrap();
    (middle, leaf, sibling)
}

#[tokio::test]
async fn test_parent_route_climbs_one_level_per_hop() {
    let (host, tracker, root) = common::host(RouteRegistry::default());
    let (middle, leaf, sibling) = three_levels(&host, root);

    let response = host
        .navigator(leaf)
        .navigate(NavigationRequest::new("../../second").from_region(leaf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.route.to_string(), "second");
    assert_eq!(host.tree().current_route(sibling).unwrap().to_string(), "second");

    // leaf and middle: once forwarding up, once when the root fans out.
    assert_eq!(tracker.starts(leaf), 2);
    assert_eq!(tracker.starts(middle), 2);
    assert_eq!(tracker.starts(root), 1);
    assert_eq!(tracker.starts(sibling), 1);
    assert!(tracker.balanced());
}

#[tokio::test]
async fn test_dialog_from_grandchild_reaches_root() {
    let (host, tracker, root) = common::host(RouteRegistry::default());
    let (middle, leaf, sibling) = three_levels(&host, root);
    let dialogs = RecordingDialogs::new();
    host.register_dialog_factory(Arc::new(RecordingDialogFactory(dialogs.clone())));

    let response = host
        .navigator(leaf)
        .navigate(NavigationRequest::new("!confirm").from_region(leaf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.route.to_string(), "confirm/presented");

    let requests = dialogs.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sender, Some(leaf));

    for region in [leaf, middle, root] {
        assert_eq!(tracker.starts(region), 1, "region {region}");
    }
    assert_eq!(tracker.starts(sibling), 0);
    assert!(tracker.balanced());
}

#[tokio::test]
async fn test_unsupported_nested_route_at_childless_root() {
    let (host, _tracker, _root) = common::host(RouteRegistry::default());
    let response = host.navigate("./second").await.unwrap();
    assert!(response.is_none());
}

#[tokio::test]
async fn test_named_region_advances_once() {
    let (host, _tracker, root) = common::host(RouteRegistry::default());
    host.tree().insert_child(root, "tabs", pages(&["tabs", "doc1"])).unwrap();

    let response = host.navigate("tabs/tabs").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "tabs");

    let response = host.navigate("tabs/doc1").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "doc1");
}

#[tokio::test]
async fn test_first_response_in_registration_order() {
    let (host, tracker, root) = common::host(RouteRegistry::default());
    let tree = host.tree();
    let a = tree.insert_child(root, "", Arc::new(Surface::pass_through())).unwrap();
    let b = tree.insert_child(root, "", Arc::new(Surface::pass_through())).unwrap();
    let c = tree
        .insert_child(
            root,
            "",
            Arc::new(TaggedSurface::new("second", "c").delayed(Duration::from_millis(30))),
        )
        .unwrap();
    let d = tree
        .insert_child(root, "", Arc::new(TaggedSurface::new("second", "d")))
        .unwrap();
    let unrelated = tree.insert_child(root, "other", pages(&["second"])).unwrap();

    let response = host.navigate("second").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "second@c");

    for region in [a, b, c, d] {
        assert_eq!(tracker.starts(region), 1, "region {region}");
    }
    assert_eq!(tracker.starts(unrelated), 0);
    assert!(tracker.balanced());
}

#[tokio::test]
async fn test_nested_route_with_data_reaches_unnamed_child() {
    let (host, _tracker, root) = common::host(RouteRegistry::default());
    let surface = pages(&["second"]);
    let child = host.tree().insert_child(root, "", surface.clone()).unwrap();

    let response = host.navigate("./second?id=42").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "second?id=42");

    let shown = surface.last_shown().unwrap();
    assert!(shown.is_internal());
    assert_eq!(shown.base(), "second");

    let parameters = host
        .tree()
        .services(child)
        .unwrap()
        .get_local::<NavigationDataProvider>()
        .unwrap()
        .parameters();
    assert_eq!(parameters["id"], Value::from("42"));
}

#[tokio::test]
async fn test_data_contract_converts_parameters() {
    let numeric_ids: DataConverter = Arc::new(|data: &RouteData| -> RouteData {
        data.iter()
            .map(|(key, value)| {
                let typed = value
                    .as_str()
                    .and_then(|s| s.parse::<i64>().ok())
                    .map(Value::from)
                    .unwrap_or_else(|| value.clone());
                (key.clone(), typed)
            })
            .collect()
    });
    let routes = RouteRegistry::new(vec![RouteMap::new("second").with_view(ViewBinding {
        view: Some("SecondPage".into()),
        view_model: Some("SecondViewModel".into()),
        data: Some(DataContract {
            type_name: "Widget".into(),
            untyped_to_query: Some(numeric_ids),
        }),
    })]);
    let (host, _tracker, root) = common::host(routes);
    let child = host.tree().insert_child(root, "", pages(&["second"])).unwrap();

    let response = host.navigate("second?id=42&name=w").await.unwrap().unwrap();
    assert_eq!(response.route.data().unwrap()["id"], Value::from(42));

    let parameters = host
        .tree()
        .services(child)
        .unwrap()
        .get_local::<NavigationDataProvider>()
        .unwrap()
        .parameters();
    assert_eq!(parameters["id"], Value::from(42));
    assert_eq!(parameters["name"], Value::from("w"));
}

#[tokio::test]
async fn test_dialog_dispatch() {
    let (host, _tracker, _root) = common::host(RouteRegistry::default());
    assert!(host.navigate("!confirm").await.unwrap().is_none());

    let dialogs = RecordingDialogs::new();
    host.register_dialog_factory(Arc::new(RecordingDialogFactory(dialogs.clone())));

    let response = host.navigate("!confirm").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "confirm/presented");

    let requests = dialogs.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].route.is_dialog());
    assert!(requests[0].route.is_internal());
}

#[tokio::test]
async fn test_request_response_result() {
    let (host, _tracker, root) = common::host(RouteRegistry::default());
    let child = host.tree().insert_child(root, "", pages(&["second"])).unwrap();

    let response = host
        .navigate_request(NavigationRequest::new("second").expecting::<String>())
        .await
        .unwrap()
        .unwrap();
    assert!(response.has_result());

    match host.active_navigator(child) {
        Some(AnyNavigator::Response(navigator)) => {
            assert!(navigator.describe().starts_with("ResponseNavigator("));
            assert!(!navigator.complete(7u32));
            assert!(navigator.complete("saved".to_string()));
        }
        other => panic!("expected a response navigator, got {other:?}"),
    }
    assert_eq!(response.into_result::<String>().await.as_deref(), Some("saved"));

    // A plain navigation replaces the pending-response navigator.
    host.navigate("second").await.unwrap();
    assert!(matches!(
        host.active_navigator(child),
        Some(AnyNavigator::Standard(_))
    ));
}

#[tokio::test]
async fn test_named_region_keeps_result_to_itself() {
    let (host, _tracker, root) = common::host(RouteRegistry::default());
    let editor = host.tree().insert_child(root, "editor", pages(&["form"])).unwrap();
    let inner = host.tree().insert_child(editor, "", pages(&["field"])).unwrap();

    host.navigate_request(NavigationRequest::new("editor/form/field").expecting::<u32>())
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(
        host.active_navigator(editor),
        Some(AnyNavigator::Response(_))
    ));
    assert!(matches!(
        host.active_navigator(inner),
        Some(AnyNavigator::Standard(_))
    ));
}

#[tokio::test]
async fn test_result_completed_by_outer_region() {
    let host = NavigationHost::new(RouteRegistry::default());
    let root = host.tree().insert_root("", pages(&["second"])).unwrap();
    let child = host.tree().insert_child(root, "", pages(&["details"])).unwrap();

    let response = host
        .navigate_request(NavigationRequest::new("second/details").expecting::<String>())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.route.to_string(), "second/details");

    let Some(AnyNavigator::Response(outer)) = host.active_navigator(root) else {
        panic!("root should be waiting for a result");
    };
    let Some(AnyNavigator::Response(inner)) = host.active_navigator(child) else {
        panic!("child should be waiting for a result");
    };

    assert!(outer.complete("from second page".to_string()));
    assert_eq!(
        response.into_result::<String>().await.as_deref(),
        Some("from second page")
    );
    // The caller has its result; later completions go nowhere.
    assert!(!inner.complete("from details page".to_string()));
}

#[tokio::test]
async fn test_non_converging_rewrite_is_an_error() {
    let routes = RouteRegistry::new(vec![
        RouteMap::new("ping").with_init(|request: NavigationRequest| {
            let route = request.route.rebase(&Route::parse("pong"));
            request.with_route(route)
        }),
        RouteMap::new("pong").with_init(|request: NavigationRequest| {
            let route = request.route.rebase(&Route::parse("ping"));
            request.with_route(route)
        }),
    ]);
    let (host, tracker, _root) = common::host(routes);
    let host = host.with_config(NavigationConfig {
        max_rewrite_iterations: 8,
        ..NavigationConfig::default()
    });

    let err = host.navigate("ping").await.unwrap_err();
    assert!(matches!(err, NavigationError::RewriteLoop { iterations: 8, .. }));
    assert!(tracker.balanced());
}

const TABBED: &str = r#"
[[routes]]
path = "doc0"
redirect = "tabbed/doc0"

[[routes]]
path = "main"
is_default = true

[[routes]]
path = "tabbed"

[[routes.nested]]
path = "doc0"
is_default = true

[[routes.nested]]
path = "doc1"

[region]

[[region.children]]
content = ["main", "tabbed"]

[[region.children.children]]
content = ["doc0", "doc1"]
"#;

#[tokio::test]
async fn test_redirect_and_default_child() {
    let config = parse_config(TABBED).unwrap();
    let host = NavigationHost::from_config(&config).unwrap();
    let root = host.tree().root().unwrap();

    let response = host.navigate("doc0").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "tabbed/doc0");
    assert_eq!(host.tree().route_of(root), "tabbed/doc0");

    host.navigate("main").await.unwrap();
    assert_eq!(host.tree().route_of(root), "main/doc0");

    let response = host.navigate("tabbed").await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "tabbed/doc0");

    host.navigate("doc1").await.unwrap();
    assert_eq!(host.tree().route_of(root), "tabbed/doc1");
}

#[tokio::test]
async fn test_child_failure_policies() {
    for policy in [ChildFailurePolicy::Isolate, ChildFailurePolicy::FailFast] {
        let (host, tracker, root) = common::host(RouteRegistry::default());
        let host = host.with_config(NavigationConfig {
            child_failure: policy,
            ..NavigationConfig::default()
        });
        let broken = host.tree().insert_child(root, "", Arc::new(BrokenSurface)).unwrap();
        host.tree().insert_child(root, "", pages(&["second"])).unwrap();

        let result = host.navigate("second").await;
        match policy {
            ChildFailurePolicy::Isolate => {
                assert_eq!(result.unwrap().unwrap().route.to_string(), "second");
            }
            ChildFailurePolicy::FailFast => match result {
                Err(NavigationError::Child { region, source }) => {
                    assert_eq!(region, broken);
                    assert!(matches!(*source, NavigationError::Surface(_)));
                }
                other => panic!("expected child failure, got {other:?}"),
            },
        }
        assert!(tracker.balanced());
    }
}

#[tokio::test]
async fn test_surface_ready_wait() {
    let (host, _tracker, root) = common::host(RouteRegistry::default());
    let host = host.with_config(NavigationConfig {
        surface_ready_timeout_ms: 50,
        ..NavigationConfig::default()
    });
    let surface = Arc::new(Surface::pages(["second"]).unloaded());
    let child = host.tree().insert_child(root, "", surface.clone()).unwrap();

    let request = NavigationRequest::new(Route::parse("second").as_internal());
    let err = host.navigator(child).navigate(request.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        NavigationError::SurfaceTimeout { region, timeout_ms: 50 } if region == child
    ));

    let host = host.with_config(NavigationConfig {
        surface_ready_timeout_ms: 1_000,
        ..NavigationConfig::default()
    });
    let loader = {
        let surface = surface.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            surface.mark_loaded();
        })
    };
    let response = host.navigator(child).navigate(request).await.unwrap().unwrap();
    assert_eq!(response.route.to_string(), "second");
    loader.await.unwrap();
}

#[tokio::test]
async fn test_route_map_reload_applies_to_next_navigation() {
    let (host, _tracker, root) = common::host(RouteRegistry::new(vec![RouteMap::new("main")]));
    host.tree().insert_child(root, "", pages(&["main", "second"])).unwrap();

    assert_eq!(host.navigate("/").await.unwrap().unwrap().route.to_string(), "main");

    host.resolver()
        .replace(RouteRegistry::new(vec![RouteMap::new("second")]));
    assert_eq!(host.navigate("/").await.unwrap().unwrap().route.to_string(), "second");
}

#[tokio::test]
async fn test_traversal_keeps_its_route_map_snapshot() {
    fn counting(counter: &Arc<AtomicUsize>) -> RouteRegistry {
        let counter = counter.clone();
        RouteRegistry::new(vec![RouteMap::new("second").with_init(move |request| {
            counter.fetch_add(1, Ordering::SeqCst);
            request
        })])
    }

    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let host = NavigationHost::new(counting(&before));
    let root = host
        .tree()
        .insert_root(
            "",
            Arc::new(TaggedSurface::new("home", "root").delayed(Duration::from_millis(60))),
        )
        .unwrap();
    host.tree().insert_child(root, "", pages(&["second"])).unwrap();

    // Swap the route map while the root is still waiting for its surface.
    let (response, ()) = tokio::join!(host.navigate("second"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        host.resolver().replace(counting(&after));
    });
    assert_eq!(response.unwrap().unwrap().route.to_string(), "second");
    assert_eq!(before.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 0);

    host.navigate("second").await.unwrap();
    assert_eq!(after.load(Ordering::SeqCst), 2);
}

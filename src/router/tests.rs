use std::sync::{Arc, RwLock};

use http::Method;

use super::{handler, Handler, RouteGroup, Router, MAX_CHAIN_LEN};
use crate::error::ConfigError;

fn noop() -> Handler {
    handler(|_ctx| {})
}

fn shared_router() -> Arc<RwLock<Router>> {
    Arc::new(RwLock::new(Router::new()))
}

#[test]
fn test_static_route_returns_chain_unchanged() {
    let mut router = Router::new();
    router
        .add_route(Method::GET, "/health/live", vec![noop(), noop()])
        .unwrap();

    let m = router.find(&Method::GET, "/health/live").unwrap();
    assert_eq!(m.route.handlers().len(), 2);
    assert_eq!(m.route.pattern, "/health/live");
    assert!(m.param_values.is_empty());
}

#[test]
fn test_method_namespaces_are_independent() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/items", vec![noop()]).unwrap();

    assert!(router.find(&Method::GET, "/items").is_some());
    assert!(router.find(&Method::POST, "/items").is_none());
}

#[test]
fn test_pattern_must_start_with_separator() {
    let mut router = Router::new();
    let err = router
        .add_route(Method::GET, "items", vec![noop()])
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
}

#[test]
fn test_chain_ceiling_applies_to_direct_registration() {
    let mut router = Router::new();
    let chain: Vec<Handler> = (0..MAX_CHAIN_LEN).map(|_| noop()).collect();
    let err = router
        .add_route(Method::GET, "/items", chain)
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::ChainTooLong {
            len: MAX_CHAIN_LEN,
            limit: MAX_CHAIN_LEN,
        }
    );
}

#[test]
fn test_replacement_swaps_the_chain() {
    let mut router = Router::new();
    router.add_route(Method::GET, "/items", vec![noop()]).unwrap();
    router
        .add_route(Method::GET, "/items", vec![noop(), noop()])
        .unwrap();

    assert_eq!(router.len(), 1);
    let m = router.find(&Method::GET, "/items").unwrap();
    assert_eq!(m.route.handlers().len(), 2);
}

#[test]
fn test_group_composition_is_associative() {
    let nested = shared_router();
    let root = RouteGroup::root(Arc::clone(&nested));
    let a = root.group("/a", vec![]).unwrap();
    let ab = a.group("/b", vec![]).unwrap();
    ab.get("/leaf", vec![noop()]).unwrap();

    let flat = shared_router();
    let root = RouteGroup::root(Arc::clone(&flat));
    let direct = root.group("/a/b", vec![]).unwrap();
    direct.get("/leaf", vec![noop()]).unwrap();

    for router in [&nested, &flat] {
        let router = router.read().unwrap();
        assert!(router.find(&Method::GET, "/a/b/leaf").is_some());
        assert!(router.find(&Method::GET, "/a/leaf").is_none());
    }
}

#[test]
fn test_trailing_slash_spelling_is_insignificant() {
    let router = shared_router();
    let root = RouteGroup::root(Arc::clone(&router));
    let with = root.group("/v1/", vec![]).unwrap();
    let without = root.group("/v2", vec![]).unwrap();
    with.get("users", vec![noop()]).unwrap();
    without.get("/users/", vec![noop()]).unwrap();

    let router = router.read().unwrap();
    assert!(router.find(&Method::GET, "/v1/users").is_some());
    assert!(router.find(&Method::GET, "/v1/users/").is_some());
    assert!(router.find(&Method::GET, "/v2/users").is_some());
}

#[test]
fn test_group_chain_ceiling_is_deterministic() {
    let router = shared_router();
    let root = RouteGroup::root(Arc::clone(&router));
    let guarded = root.group("/admin", vec![noop(), noop()]).unwrap();

    // 2 inherited + 3 own reaches the limit of 5
    let err = guarded
        .get("/panel", vec![noop(), noop(), noop()])
        .unwrap_err();
    assert_eq!(err, ConfigError::ChainTooLong { len: 5, limit: 5 });

    // one fewer is fine
    guarded.get("/panel", vec![noop(), noop()]).unwrap();
    assert!(router.read().unwrap().find(&Method::GET, "/admin/panel").is_some());
}

#[test]
fn test_any_registers_the_fixed_method_set() {
    let router = shared_router();
    let root = RouteGroup::root(Arc::clone(&router));
    root.any("/echo", vec![noop()]).unwrap();

    let router = router.read().unwrap();
    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::HEAD,
        Method::OPTIONS,
        Method::DELETE,
        Method::CONNECT,
        Method::TRACE,
    ] {
        assert!(router.find(&method, "/echo").is_some(), "missing {method}");
    }
    assert_eq!(router.len(), 9);
}

#[test]
fn test_static_registration_rejects_reserved_characters() {
    let router = shared_router();
    let root = RouteGroup::root(router);
    let err = root.static_file("/download/:name", "/tmp/x").unwrap_err();
    assert!(matches!(err, ConfigError::ReservedPathCharacters { .. }));
    let err = root.static_dir("/assets/*", "/tmp").unwrap_err();
    assert!(matches!(err, ConfigError::ReservedPathCharacters { .. }));
}

#[test]
fn test_bindings_zip_names_and_values() {
    let mut router = Router::new();
    router
        .add_route(Method::GET, "/orgs/:org/repos/:repo", vec![noop()])
        .unwrap();

    let m = router.find(&Method::GET, "/orgs/acme/repos/widget").unwrap();
    let bindings = m.bindings();
    assert_eq!(bindings.len(), 2);
    assert_eq!(&*bindings[0].0, "org");
    assert_eq!(bindings[0].1, "acme");
    assert_eq!(m.get_param("repo"), Some("widget"));
}

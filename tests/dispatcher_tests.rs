//! Tests for the dispatch engine: chain execution, abort short-circuit,
//! fault containment, and context pooling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use switchboard::router::handler;
use switchboard::{DispatchOutcome, Dispatcher};

mod common;

use common::{request, RecordingSink};
use tracing_util::TestTracing;

#[test]
fn test_dispatch_runs_the_chain_in_order() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let root = dispatcher.root_group();
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    root.get(
        "/run",
        vec![
            handler(move |_ctx| first.lock().unwrap().push("first")),
            handler(move |ctx| {
                second.lock().unwrap().push("second");
                ctx.text("done");
            }),
        ],
    )
    .unwrap();

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/run"), Box::new(sink.clone()));

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(*order.lock().unwrap(), ["first", "second"]);
    let recorded = sink.recorded();
    assert_eq!(recorded.heads.len(), 1);
    assert_eq!(
        recorded.heads[0],
        (200, "text/plain; charset=utf-8".to_string())
    );
    assert_eq!(recorded.body_str(), "done");
}

#[test]
fn test_abort_short_circuits_the_chain() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let root = dispatcher.root_group();
    let c1 = Arc::clone(&calls);
    let c2 = Arc::clone(&calls);
    let c3 = Arc::clone(&calls);
    root.get(
        "/guarded",
        vec![
            handler(move |ctx| {
                c1.fetch_add(1, Ordering::SeqCst);
                ctx.render_error(401, "denied");
            }),
            handler(move |_ctx| {
                c2.fetch_add(1, Ordering::SeqCst);
            }),
            handler(move |_ctx| {
                c3.fetch_add(1, Ordering::SeqCst);
            }),
        ],
    )
    .unwrap();

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/guarded"), Box::new(sink.clone()));

    assert_eq!(outcome, DispatchOutcome::Aborted);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let recorded = sink.recorded();
    assert_eq!(recorded.heads.len(), 1);
    assert_eq!(recorded.heads[0].0, 401);
    assert_eq!(recorded.body_str(), "denied");
}

#[test]
fn test_unmatched_request_is_a_404_with_diagnostic_body() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/missing"), Box::new(sink.clone()));

    assert_eq!(outcome, DispatchOutcome::Completed);
    let recorded = sink.recorded();
    assert_eq!(recorded.heads.len(), 1);
    assert_eq!(recorded.heads[0].0, 404);
    assert_eq!(recorded.body_str(), "no match: GET /missing");
}

#[test]
fn test_handler_fault_becomes_a_500_response() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();

    let root = dispatcher.root_group();
    root.get(
        "/explode",
        vec![handler(|ctx| {
            ctx.response.set_status(418);
            panic!("boom");
        })],
    )
    .unwrap();

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/explode"), Box::new(sink.clone()));

    assert_eq!(outcome, DispatchOutcome::Faulted);
    let recorded = sink.recorded();
    assert_eq!(recorded.heads.len(), 1);
    assert_eq!(recorded.heads[0].0, 500);
    assert_eq!(recorded.body_str(), "runtime error: boom");
}

#[test]
fn test_fault_leaves_no_state_for_the_next_request() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();

    let root = dispatcher.root_group();
    root.get(
        "/explode/:id",
        vec![handler(|ctx| {
            ctx.response.set_status(418);
            ctx.response.set_content_type("application/x-debris");
            panic!("boom");
        })],
    )
    .unwrap();
    root.get(
        "/clean",
        vec![handler(|ctx| {
            // nothing from the faulted request may bleed through the pool
            assert!(ctx.param("id").is_none());
            assert_eq!(ctx.response.status(), 200);
            assert!(!ctx.is_aborted());
            ctx.text("fresh");
        })],
    )
    .unwrap();

    let sink = RecordingSink::new();
    dispatcher.handle(request(Method::GET, "/explode/7"), Box::new(sink.clone()));
    assert_eq!(sink.recorded().heads[0].0, 500);

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/clean"), Box::new(sink.clone()));
    assert_eq!(outcome, DispatchOutcome::Completed);
    let recorded = sink.recorded();
    assert_eq!(
        recorded.heads[0],
        (200, "text/plain; charset=utf-8".to_string())
    );
    assert_eq!(recorded.body_str(), "fresh");

    // both requests went through one pooled context
    let stats = dispatcher.pool_stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.reused, 1);
    assert_eq!(stats.idle, 1);
}

#[test]
fn test_params_are_bound_for_handlers() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();

    let root = dispatcher.root_group();
    root.get(
        "/users/:id/files/*path",
        vec![handler(|ctx| {
            let id = ctx.param("id").unwrap_or("").to_string();
            let path = ctx.param("path").unwrap_or("").to_string();
            ctx.text(&format!("{id}:{path}"));
        })],
    )
    .unwrap();

    let sink = RecordingSink::new();
    dispatcher.handle(
        request(Method::GET, "/users/42/files/a/b/c"),
        Box::new(sink.clone()),
    );
    assert_eq!(sink.recorded().body_str(), "42:a/b/c");
}

#[test]
fn test_inherited_middleware_runs_before_route_handlers() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let mw = {
        let order = Arc::clone(&order);
        handler(move |_ctx| order.lock().unwrap().push("middleware"))
    };
    let own = {
        let order = Arc::clone(&order);
        handler(move |_ctx| order.lock().unwrap().push("route"))
    };

    let api = dispatcher.root_group().group("/api", vec![mw]).unwrap();
    api.get("/thing", vec![own]).unwrap();

    let sink = RecordingSink::new();
    dispatcher.handle(request(Method::GET, "/api/thing"), Box::new(sink));
    assert_eq!(*order.lock().unwrap(), ["middleware", "route"]);
}

#[test]
fn test_lookup_resolves_without_dispatching() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    dispatcher
        .root_group()
        .get("/users/:id", vec![handler(|_ctx| {})])
        .unwrap();

    let m = dispatcher.lookup(&Method::GET, "/users/9").unwrap();
    assert_eq!(m.get_param("id"), Some("9"));
    assert!(dispatcher.lookup(&Method::POST, "/users/9").is_none());

    // lookup alone must not touch the pool
    assert_eq!(dispatcher.pool_stats().created, 0);
}

#[test]
fn test_silent_chain_emits_no_head() {
    let _tracing = TestTracing::init();
    let dispatcher = Dispatcher::new();
    dispatcher
        .root_group()
        .get("/quiet", vec![handler(|_ctx| {})])
        .unwrap();

    let sink = RecordingSink::new();
    let outcome = dispatcher.handle(request(Method::GET, "/quiet"), Box::new(sink.clone()));

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert!(sink.recorded().heads.is_empty());
}

//! Dispatcher core - the per-request entry point.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::context::{Context, RequestParts, ResponseSink};
use crate::error::HandlerFault;
use crate::router::{RouteGroup, RouteMatch, Router};

use super::pool::{ContextPool, PoolStats};

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The chain ran to its end, or no route matched (a 404 is a normal,
    /// non-exceptional outcome).
    Completed,
    /// A handler set the abort flag and the rest of the chain was skipped.
    Aborted,
    /// A handler fault was converted into a 500 response.
    Faulted,
}

/// The dispatch engine: resolves routes and runs handler chains against
/// pooled contexts.
///
/// Invoked once per inbound request by the Acceptor. Request-time failures
/// never propagate out of [`Dispatcher::handle`]; they are converted into
/// responses and log records.
pub struct Dispatcher {
    router: Arc<RwLock<Router>>,
    pool: ContextPool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// An engine with a fresh, empty router.
    pub fn new() -> Self {
        Self::with_router(Arc::new(RwLock::new(Router::new())))
    }

    pub fn with_router(router: Arc<RwLock<Router>>) -> Self {
        Dispatcher {
            router,
            pool: ContextPool::new(),
        }
    }

    pub fn with_pool(router: Arc<RwLock<Router>>, pool: ContextPool) -> Self {
        Dispatcher { router, pool }
    }

    /// The shared router, for direct registration or introspection.
    pub fn router(&self) -> &Arc<RwLock<Router>> {
        &self.router
    }

    /// The root [`RouteGroup`] for the registration phase.
    pub fn root_group(&self) -> RouteGroup {
        RouteGroup::root(Arc::clone(&self.router))
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Resolve a route without dispatching. Introspection/testing aid.
    pub fn lookup(&self, method: &http::Method, path: &str) -> Option<RouteMatch> {
        self.router.read().unwrap().find(method, path)
    }

    /// Entry point called once per inbound request.
    ///
    /// Performs acquire → reset → run → release and writes exactly one
    /// response to `sink` (possibly an error response). Never panics
    /// outward.
    pub fn handle(&self, parts: RequestParts, sink: Box<dyn ResponseSink>) -> DispatchOutcome {
        let start = Instant::now();
        let method = parts.method.clone();
        let path = parts.path.clone();

        let mut ctx = self.pool.acquire();
        ctx.reset(parts, sink);
        let outcome = self.run(&mut ctx);
        let status = ctx.response.status();
        self.pool.release(ctx);

        info!(
            method = %method,
            path = %path,
            status = status,
            outcome = ?outcome,
            latency_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
        outcome
    }

    /// Run the handler chain for an already-reset context.
    ///
    /// A fault result from the chain is converted into a 500 response here;
    /// nothing escapes to the Acceptor.
    pub fn run(&self, ctx: &mut Context) -> DispatchOutcome {
        match self.execute(ctx) {
            Ok(outcome) => outcome,
            Err(fault) => {
                let backtrace = std::backtrace::Backtrace::capture();
                error!(
                    method = %ctx.request.method(),
                    path = %ctx.request.path(),
                    description = %fault.description,
                    backtrace = %backtrace,
                    "Handler fault"
                );
                ctx.render_error(500, &fault.to_string());
                DispatchOutcome::Faulted
            }
        }
    }

    fn execute(&self, ctx: &mut Context) -> Result<DispatchOutcome, HandlerFault> {
        let matched = {
            let router = self.router.read().unwrap();
            router.find(ctx.request.method(), ctx.request.path())
        };

        let Some(matched) = matched else {
            let body = format!(
                "no match: {} {}",
                ctx.request.method(),
                ctx.request.path()
            );
            ctx.render_error(404, &body);
            return Ok(DispatchOutcome::Completed);
        };

        ctx.bind_params(matched.bindings());

        debug!(
            pattern = %matched.route.pattern,
            chain_len = matched.route.handlers().len(),
            "Executing handler chain"
        );

        for h in matched.route.handlers() {
            let f = h.as_ref();
            panic::catch_unwind(AssertUnwindSafe(|| f(ctx)))
                .map_err(HandlerFault::from_panic)?;
            if ctx.is_aborted() {
                return Ok(DispatchOutcome::Aborted);
            }
        }
        Ok(DispatchOutcome::Completed)
    }
}

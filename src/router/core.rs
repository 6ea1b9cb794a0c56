//! Router core - hot path for route resolution.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::ConfigError;

use super::tree::{parse_pattern, PathTree, Segment, ValueVec};

pub use super::tree::MAX_INLINE_PARAMS;

/// Maximum combined length of a handler chain (inherited group middleware
/// plus route handlers). Reaching it is a registration-time error.
pub const MAX_CHAIN_LEN: usize = 5;

/// A request-processing function. Handlers read request metadata, write to
/// the response, and may set the abort flag to short-circuit the chain.
pub type Handler = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Parameter bindings as (name, value) pairs.
/// Stack-allocated for routes with ≤8 parameters.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered binding from (method, path pattern) to a handler chain.
/// Immutable once stored; match results are returned separately.
pub struct Route {
    pub method: Method,
    pub pattern: String,
    /// Parameter names in the order their segments appear in the pattern.
    pub param_names: Vec<Arc<str>>,
    handlers: Vec<Handler>,
}

impl Route {
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("param_names", &self.param_names)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Result of successfully resolving a request path.
///
/// A fresh value per resolution: the stored [`Route`] is never mutated, so
/// concurrent lookups cannot observe each other's bindings.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    /// Captured values, positionally aligned with `route.param_names`.
    pub param_values: ValueVec,
}

impl RouteMatch {
    /// Zip parameter names and captured values into (name, value) pairs.
    pub fn bindings(&self) -> ParamVec {
        self.route
            .param_names
            .iter()
            .cloned()
            .zip(self.param_values.iter().cloned())
            .collect()
    }

    /// Look up a captured value by name.
    ///
    /// Uses "last write wins" semantics when the same name appears at
    /// several path depths.
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.route
            .param_names
            .iter()
            .zip(self.param_values.iter())
            .rev()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Router that matches (method, path) pairs to handler chains using a
/// prefix tree.
///
/// Method dispatch works by prefixing the path with the upper-cased method
/// before traversal, giving each method an independent namespace in one
/// tree. The tree is built during the registration phase and is read-only
/// once serving begins; share it as `Arc<RwLock<Router>>` so any late
/// registration serializes against resolution.
pub struct Router {
    tree: PathTree<Arc<Route>>,
    routes: Vec<Arc<Route>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Router {
            tree: PathTree::new(),
            routes: Vec::new(),
        }
    }

    /// Register a handler chain under `(method, pattern)`.
    ///
    /// Patterns are composed of literal segments, `:name` parameter
    /// segments and at most one trailing `*name` catch-all segment.
    /// Re-registering an identical pattern replaces the stored chain.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: Vec<Handler>,
    ) -> Result<(), ConfigError> {
        if !pattern.starts_with('/') {
            return Err(ConfigError::InvalidPattern {
                method: method.to_string(),
                pattern: pattern.to_string(),
            });
        }
        if handlers.len() >= MAX_CHAIN_LEN {
            return Err(ConfigError::ChainTooLong {
                len: handlers.len(),
                limit: MAX_CHAIN_LEN,
            });
        }

        let key = tree_path(&method, pattern);
        let segments = parse_pattern(&key)?;
        let param_names: Vec<Arc<str>> = segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Param(name) | Segment::CatchAll(name) => Some(Arc::from(*name)),
                Segment::Literal(_) => None,
            })
            .collect();

        let route = Arc::new(Route {
            method: method.clone(),
            pattern: pattern.to_string(),
            param_names,
            handlers,
        });

        let replaced = self.tree.insert(&segments, Arc::clone(&route))?;
        if let Some(old) = replaced {
            self.routes.retain(|r| !Arc::ptr_eq(r, &old));
            warn!(
                method = %method,
                pattern = %pattern,
                "Replaced existing route - previous handler chain dropped"
            );
        }
        self.routes.push(route);

        debug!(
            method = %method,
            pattern = %pattern,
            routes_count = self.routes.len(),
            "Route registered"
        );
        Ok(())
    }

    /// Resolve a request to a route.
    ///
    /// Returns `None` when no route matches, which the dispatcher turns
    /// into a 404 response.
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        let key = tree_path(method, path);
        match self.tree.find(&key) {
            Some((route, param_values)) => {
                info!(
                    method = %method,
                    path = %path,
                    pattern = %route.pattern,
                    "Route matched"
                );
                Some(RouteMatch {
                    route: Arc::clone(route),
                    param_values,
                })
            }
            None => {
                warn!(method = %method, path = %path, "No route matched");
                None
            }
        }
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Print the routing table to stdout. Debugging aid.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} ({} handlers)",
                route.method,
                route.pattern,
                route.handlers.len()
            );
        }
    }
}

/// Prefix the path with the upper-cased method so every method gets an
/// independent namespace in the tree.
fn tree_path(method: &Method, path: &str) -> String {
    format!("/{}{}", method.as_str().to_ascii_uppercase(), path)
}

//! # Switchboard
//!
//! **Switchboard** is a coroutine-powered request-dispatch engine for Rust:
//! it matches an incoming (method, path) pair to a registered handler
//! chain, executes that chain against a reusable per-request context, and
//! contains every request-time failure at the dispatch boundary.
//!
//! ## Architecture
//!
//! - **[`router`]** - prefix-tree path matching, route groups, chain
//!   composition
//! - **[`context`]** - pooled per-request contexts with derived request
//!   metadata and lazily-emitted response heads
//! - **[`dispatcher`]** - the per-request entry point: context pool, route
//!   resolution, handler execution, abort/panic containment
//! - **[`server`]** - `may_minihttp` Acceptor glue
//! - **[`static_files`]** - directory-rooted file loading for static routes
//! - **[`error`]** - registration-time and handler-fault error types
//! - **[`runtime_config`]** - `SWB_*` environment configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchboard::router::handler;
//! use switchboard::dispatcher::Dispatcher;
//! use switchboard::server::{AppService, HttpServer};
//! use switchboard::runtime_config::RuntimeConfig;
//!
//! RuntimeConfig::from_env().apply();
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! let root = dispatcher.root_group();
//! let api = root.group("/api", vec![]).unwrap();
//! api.get("/users/:id", vec![handler(|ctx| {
//!     let id = ctx.param("id").unwrap_or("").to_string();
//!     ctx.text(&format!("user {id}"));
//! })]).unwrap();
//!
//! let handle = HttpServer(AppService::new(dispatcher))
//!     .start("0.0.0.0:8080")
//!     .unwrap();
//! handle.join().unwrap();
//! ```
//!
//! ## Lifecycle
//!
//! Registration happens before serving: route groups compose base paths
//! and middleware chains and push routes into the shared router. Once the
//! Acceptor starts, each request acquires a pooled context, resets it
//! against the new transport objects, runs the matched chain, and releases
//! the context. Handlers cooperate through the context's abort flag; a
//! panicking handler is logged with a backtrace and answered with a 500,
//! and the process keeps serving.
//!
//! ## Runtime Considerations
//!
//! Switchboard runs on the `may` coroutine runtime, not tokio. Stack size
//! is configurable via the `SWB_STACK_SIZE` environment variable; see
//! [`runtime_config::RuntimeConfig`]. Handlers must not block the
//! coroutine on long synchronous work.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use context::{Context, LanguageRanking, RequestParts, ResponseSink};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ConfigError, HandlerFault};
pub use router::{handler, Handler, RouteGroup, RouteMatch, Router};

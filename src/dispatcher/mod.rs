//! # Dispatcher Module
//!
//! The dispatch engine ties the router, the context pool and handler
//! execution together. One call to [`Dispatcher::handle`] services one
//! inbound request:
//!
//! 1. a [`crate::context::Context`] is acquired from the pool and reset
//!    against the new request parts and response sink
//! 2. the route is resolved under the router's read lock
//! 3. the handler chain runs in registration order, short-circuiting when
//!    a handler aborts
//! 4. the context is released back to the pool
//!
//! A missing route becomes a 404 response; a handler panic is intercepted,
//! logged with a backtrace, and becomes a 500 response. Neither crosses the
//! dispatch boundary, so the Acceptor always gets exactly one response and
//! the serving process keeps running.

mod core;
mod pool;

pub use core::{DispatchOutcome, Dispatcher};
pub use pool::{ContextPool, PoolStats};

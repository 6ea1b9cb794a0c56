//! # Router Module
//!
//! Path matching and route resolution.
//!
//! Routes live in a prefix tree keyed by the upper-cased method followed by
//! the path segments, so each method gets an independent namespace. Leaves
//! hold the handler chain and the ordered parameter names captured along
//! the matched path; resolution returns a fresh [`RouteMatch`] and never
//! mutates stored routes.
//!
//! ## Pattern syntax
//!
//! - literal segments match as-is: `/users/all`
//! - `:name` binds one path segment: `/users/:id`
//! - `*name` must be the final segment and captures the remaining path
//!   including separators: `/files/*path`
//!
//! Literal matches win over dynamic matches at the same node. At most one
//! dynamic branch (parameter or catch-all) may exist per node; registering
//! a second one is a [`crate::ConfigError`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::{Arc, RwLock};
//! use switchboard::router::{handler, RouteGroup, Router};
//!
//! let router = Arc::new(RwLock::new(Router::new()));
//! let root = RouteGroup::root(Arc::clone(&router));
//! let api = root.group("/api", vec![]).unwrap();
//! api.get("/users/:id", vec![handler(|ctx| {
//!     let id = ctx.param("id").unwrap_or("").to_string();
//!     ctx.text(&id);
//! })]).unwrap();
//!
//! let m = router
//!     .read()
//!     .unwrap()
//!     .find(&http::Method::GET, "/api/users/42")
//!     .unwrap();
//! assert_eq!(m.get_param("id"), Some("42"));
//! ```

mod core;
mod group;
mod tree;
#[cfg(test)]
mod tests;

pub use core::{
    handler, Handler, ParamVec, Route, RouteMatch, Router, MAX_CHAIN_LEN, MAX_INLINE_PARAMS,
};
pub use group::RouteGroup;
pub use tree::ValueVec;

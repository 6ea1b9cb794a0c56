//! # Server Module
//!
//! Acceptor glue for the `may_minihttp` transport. This layer is thin by
//! design: it parses the raw request into owned
//! [`crate::context::RequestParts`], hands them with a buffered response
//! sink to the dispatch engine, and writes the buffered response back to
//! the transport once dispatch completes.
//!
//! Connection handling, timeouts and TLS belong to the transport, not to
//! the dispatch engine.

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::SharedResponseBuffer;
pub use service::AppService;

//! # Context Module
//!
//! The per-request execution surface handed to every handler in a chain.
//!
//! A [`Context`] couples one [`RequestView`], one [`ResponseView`], the
//! parameter bindings of the matched route, and the cooperative abort flag.
//! Contexts are pooled by the dispatcher and reused across requests; a
//! reset rebinds them to fresh transport objects and clears every piece of
//! per-request state before the handler chain runs.

mod lang;
mod request;
mod response;

pub use lang::{AcceptLanguage, LanguageRanking};
pub use request::{RequestParts, RequestView};
pub use response::{ResponseSink, ResponseView};

use std::net::SocketAddr;

use http::Method;

use crate::router::ParamVec;

/// Per-request execution context.
///
/// Owned exclusively by the task processing one in-flight request, then
/// returned to the pool.
pub struct Context {
    pub request: RequestView,
    pub response: ResponseView,
    params: ParamVec,
    aborted: bool,
}

impl Context {
    /// A pooled, unbound context. Must be reset before use.
    pub(crate) fn idle() -> Self {
        Context {
            request: RequestView::default(),
            response: ResponseView::idle(),
            params: ParamVec::new(),
            aborted: false,
        }
    }

    /// Rebind to a new request and response sink, leaving no residual
    /// state from the previous request.
    pub(crate) fn reset(&mut self, parts: RequestParts, sink: Box<dyn ResponseSink>) {
        self.request.reset(parts);
        self.response.reset(sink);
        self.params.clear();
        self.aborted = false;
    }

    /// Called on release back to the pool; drops the transport sink.
    pub(crate) fn detach(&mut self) {
        self.response.detach();
    }

    pub(crate) fn bind_params(&mut self, bindings: ParamVec) {
        self.params = bindings;
    }

    /// Path parameter bound by the matched route, last occurrence winning
    /// when a name repeats across depths.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Request header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Request header with a fallback value.
    pub fn header_or<'c>(&'c self, name: &str, default: &'c str) -> &'c str {
        self.request.header(name).unwrap_or(default)
    }

    /// Set a response header. No-op once the response head is out.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Normalized request content type.
    pub fn content_type(&self) -> &str {
        &self.request.content_type
    }

    /// Stop executing the remaining handlers in the chain after the
    /// current one returns.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Write a plain-text body.
    pub fn text(&mut self, msg: &str) {
        self.response.set_content_type("text/plain; charset=utf-8");
        let _ = self.response.write_str(msg);
    }

    /// Abort the chain and write an error body under `status`.
    ///
    /// A zero or 200 status is coerced to 500. The buffered content type is
    /// left untouched.
    pub fn render_error(&mut self, status: u16, msg: &str) {
        let status = if status == 0 || status == 200 { 500 } else { status };
        self.abort();
        self.response.set_status(status);
        let _ = self.response.write_str(msg);
    }

    /// Best-effort client address: `X-Forwarded-For` first, then
    /// `X-Real-Ip`, then the transport peer address.
    pub fn client_ip(&self) -> String {
        if let Some(forwarded) = self.request.header("x-forwarded-for") {
            let first = forwarded.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
        if let Some(real_ip) = self.request.header("x-real-ip") {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return real_ip.to_string();
            }
        }
        self.request
            .remote_addr()
            .parse::<SocketAddr>()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default()
    }

    /// Whether the request asks for a websocket upgrade.
    pub fn is_websocket(&self) -> bool {
        let connection = self.header_or("connection", "").to_ascii_lowercase();
        let upgrade = self.header_or("upgrade", "").to_ascii_lowercase();
        connection.contains("upgrade") && upgrade == "websocket"
    }
}

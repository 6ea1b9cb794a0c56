//! Request-side view: owned request parts and derived metadata.

use http::Method;
use std::collections::HashMap;

use super::lang::LanguageRanking;

/// Owned, transport-independent pieces of one HTTP request.
///
/// Produced by the Acceptor adapter ([`crate::server::parse_request`]) or
/// built directly in tests. Header names are lower-cased.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: Method,
    /// Request path with any query string already stripped.
    pub path: String,
    /// Raw query string, empty when absent.
    pub query: String,
    pub headers: HashMap<String, String>,
    /// Peer address as reported by the transport; may be empty.
    pub remote_addr: String,
}

impl RequestParts {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RequestParts {
            method,
            path: path.into(),
            ..RequestParts::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// Read-only-after-reset view of the current request.
///
/// The derived fields (content type, accept string, language ranking) are
/// recomputed on every reset; nothing survives from the previous request.
#[derive(Debug, Default)]
pub struct RequestView {
    parts: RequestParts,
    /// Normalized content type: lower-cased, `;` parameters stripped,
    /// `text/html` when the header is absent.
    pub content_type: String,
    /// Raw `Accept` header value, empty when absent.
    pub accept: String,
    /// Ranked `Accept-Language` preferences.
    pub accept_languages: LanguageRanking,
}

impl RequestView {
    /// Rebind the view to a new request and rederive all metadata.
    pub(crate) fn reset(&mut self, mut parts: RequestParts) {
        // X-HTTP-Method-Override rebinds a POST before anything reads the verb
        if parts.method == Method::POST {
            if let Some(replacement) = parts
                .headers
                .get("x-http-method-override")
                .and_then(|v| v.parse::<Method>().ok())
            {
                parts.method = replacement;
            }
        }

        self.content_type = resolve_content_type(&parts.headers);
        self.accept = parts.headers.get("accept").cloned().unwrap_or_default();
        self.accept_languages =
            LanguageRanking::parse(parts.headers.get("accept-language").map(String::as_str));
        self.parts = parts;
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn path(&self) -> &str {
        &self.parts.path
    }

    pub fn query(&self) -> &str {
        &self.parts.query
    }

    pub fn remote_addr(&self) -> &str {
        &self.parts.remote_addr
    }

    /// Header lookup by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts
            .headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

fn resolve_content_type(headers: &HashMap<String, String>) -> String {
    match headers.get("content-type").filter(|v| !v.is_empty()) {
        Some(value) => value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase(),
        None => "text/html".to_string(),
    }
}

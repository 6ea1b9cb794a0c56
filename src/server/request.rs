use std::collections::HashMap;

use http::Method;
use may_minihttp::Request;
use tracing::debug;

use crate::context::RequestParts;

/// Lift a raw `may_minihttp` request into owned [`RequestParts`].
///
/// Header names are lower-cased; the query string is split off the path.
/// `may_minihttp` does not expose the peer address, so `remote_addr` stays
/// empty and `client_ip` falls back to the forwarding headers.
pub fn parse_request(req: Request) -> RequestParts {
    let method = req.method().parse::<Method>().unwrap_or_default();
    let raw_path = req.path().to_string();
    let (path, query) = match raw_path.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (raw_path, String::new()),
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        "HTTP request parsed"
    );

    RequestParts {
        method,
        path,
        query,
        headers,
        remote_addr: String::new(),
    }
}

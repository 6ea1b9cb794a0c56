use std::io;
use std::sync::{Arc, Mutex};

use may_minihttp::Response;

use crate::context::ResponseSink;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// One buffered response: head state plus accumulated body bytes.
///
/// `may_minihttp` only flushes to the socket after the service call
/// returns, so buffering here does not change wire behavior.
#[derive(Default)]
struct Buffered {
    status: u16,
    content_type: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    head_written: bool,
}

/// A [`ResponseSink`] the service can keep a handle on while the dispatch
/// engine owns its clone; after dispatch the buffered response is written
/// out to the transport.
#[derive(Clone, Default)]
pub struct SharedResponseBuffer(Arc<Mutex<Buffered>>);

impl SharedResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the buffered response into the `may_minihttp` response.
    ///
    /// When the dispatch never emitted a head (every handler wrote zero
    /// bytes), the response goes out as an empty 200.
    pub fn write_to(&self, res: &mut Response) {
        let mut buffered = self.0.lock().unwrap();
        let status = if buffered.head_written {
            buffered.status
        } else {
            200
        };
        res.status_code(status as usize, status_reason(status));
        if buffered.head_written && !buffered.content_type.is_empty() {
            res.header(content_type_header(&buffered.content_type));
        }
        for (name, value) in buffered.headers.drain(..) {
            res.header(&*Box::leak(format!("{name}: {value}").into_boxed_str()));
        }
        res.body_vec(std::mem::take(&mut buffered.body));
    }
}

impl ResponseSink for SharedResponseBuffer {
    fn write_head(&mut self, status: u16, content_type: &str) {
        let mut buffered = self.0.lock().unwrap();
        buffered.status = status;
        buffered.content_type.clear();
        buffered.content_type.push_str(content_type);
        buffered.head_written = true;
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let mut buffered = self.0.lock().unwrap();
        buffered
            .headers
            .push((name.to_string(), value.to_string()));
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buffered = self.0.lock().unwrap();
        buffered.body.extend_from_slice(data);
        Ok(data.len())
    }
}

/// `may_minihttp` headers are `&'static str` lines; common content types
/// map to static strings, anything else leaks one small allocation.
fn content_type_header(content_type: &str) -> &'static str {
    match content_type {
        "text/plain" => "Content-Type: text/plain",
        "text/plain; charset=utf-8" => "Content-Type: text/plain; charset=utf-8",
        "text/html" => "Content-Type: text/html",
        "text/css" => "Content-Type: text/css",
        "application/json" => "Content-Type: application/json",
        "application/javascript" => "Content-Type: application/javascript",
        "application/octet-stream" => "Content-Type: application/octet-stream",
        other => Box::leak(format!("Content-Type: {other}").into_boxed_str()),
    }
}

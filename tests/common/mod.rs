#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, Once};

use http::Method;
use switchboard::{RequestParts, ResponseSink};

/// Ensures May coroutines are configured only once across tests.
static MAY_INIT: Once = Once::new();

pub fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
    });
}

/// Everything a [`RecordingSink`] observed during one dispatch.
#[derive(Default)]
pub struct Recorded {
    /// (status, content_type) pairs; lazy emission means at most one.
    pub heads: Vec<(u16, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub flushes: usize,
}

impl Recorded {
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Test double for the transport side of a response.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<Mutex<Recorded>>);

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.0.lock().unwrap()
    }
}

impl ResponseSink for RecordingSink {
    fn write_head(&mut self, status: u16, content_type: &str) {
        self.0
            .lock()
            .unwrap()
            .heads
            .push((status, content_type.to_string()));
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.0
            .lock()
            .unwrap()
            .headers
            .push((name.to_string(), value.to_string()));
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().body.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flushes += 1;
        Ok(())
    }
}

/// Shorthand for request parts in dispatcher tests.
pub fn request(method: Method, path: &str) -> RequestParts {
    RequestParts::new(method, path)
}

//! Response-side view: buffered head state with lazy emission.

use std::io;

/// Destination for response output.
///
/// Implemented by the transport adapter and by test doubles. `write_head`
/// is called at most once per request, strictly before the first `write`.
pub trait ResponseSink: Send {
    /// Receive the response status and content type. Called exactly once,
    /// triggered by the first non-empty write or an explicit flush.
    fn write_head(&mut self, status: u16, content_type: &str);

    /// Set an additional response header. Only meaningful before the head
    /// is emitted; sinks without a header concept may ignore it.
    fn set_header(&mut self, _name: &str, _value: &str) {}

    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Buffers status and content type until the first byte of output.
///
/// Until then both may be changed any number of times and the last write
/// before the first byte wins. Once the head is emitted, further mutations
/// are observable no-ops. Writing zero bytes never emits the head.
pub struct ResponseView {
    sink: Option<Box<dyn ResponseSink>>,
    status: u16,
    content_type: String,
    written: Option<usize>,
}

impl ResponseView {
    pub(crate) fn idle() -> Self {
        ResponseView {
            sink: None,
            status: 200,
            content_type: String::new(),
            written: None,
        }
    }

    /// Rebind to a fresh sink and reinitialize all buffered state.
    pub(crate) fn reset(&mut self, sink: Box<dyn ResponseSink>) {
        self.sink = Some(sink);
        self.status = 200;
        self.content_type.clear();
        self.written = None;
    }

    /// Drop the sink so no transport handle outlives the request.
    pub(crate) fn detach(&mut self) {
        self.sink = None;
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Bytes written so far; `None` until the head has been emitted.
    pub fn bytes_written(&self) -> Option<usize> {
        self.written
    }

    /// Whether the head has been emitted (the first byte was written, the
    /// response was flushed, or the sink was hijacked).
    pub fn has_written(&self) -> bool {
        self.written.is_some()
    }

    /// Buffer a new status code. Ignored once the head is out, and for the
    /// zero placeholder.
    pub fn set_status(&mut self, status: u16) {
        if status == 0 || self.has_written() {
            return;
        }
        self.status = status;
    }

    /// Buffer a new content type. An empty value is ignored, as is any
    /// change once the head is out.
    pub fn set_content_type(&mut self, content_type: &str) {
        if content_type.is_empty() || self.has_written() {
            return;
        }
        self.content_type.clear();
        self.content_type.push_str(content_type);
    }

    /// Set an additional response header on the sink. No-op once the head
    /// is out.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if self.has_written() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.set_header(name, value);
        }
    }

    /// Write response bytes, emitting the head first if this is the first
    /// non-empty write. A zero-length write is a no-op.
    pub fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(detached());
        };
        if self.written.is_none() {
            sink.write_head(self.status, &self.content_type);
            self.written = Some(0);
        }
        let n = sink.write(data)?;
        if let Some(total) = self.written.as_mut() {
            *total += n;
        }
        Ok(n)
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.write(s.as_bytes())
    }

    /// Flush the sink. Emits the head if it is still pending, even when no
    /// body bytes have been written.
    pub fn flush(&mut self) -> io::Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(detached());
        };
        if self.written.is_none() {
            sink.write_head(self.status, &self.content_type);
            self.written = Some(0);
        }
        sink.flush()
    }

    /// Detach the sink for a transport-level handoff.
    ///
    /// Marks the response as started without emitting the head; the caller
    /// owns the sink from here on.
    pub fn hijack(&mut self) -> Option<Box<dyn ResponseSink>> {
        let sink = self.sink.take()?;
        self.written.get_or_insert(0);
        Some(sink)
    }
}

fn detached() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "response sink detached")
}

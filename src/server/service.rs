use std::io;
use std::sync::Arc;

use may_minihttp::{HttpService, Request, Response};

use super::request::parse_request;
use super::response::SharedResponseBuffer;
use crate::dispatcher::Dispatcher;

/// `may_minihttp` service adapter: one `call` per inbound request, handed
/// straight to the dispatch engine.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parts = parse_request(req);
        let buffer = SharedResponseBuffer::new();
        self.dispatcher.handle(parts, Box::new(buffer.clone()));
        buffer.write_to(res);
        Ok(())
    }
}

//! scripted in-memory transport
//!
//! responses are replayed in the order they were queued and every request is
//! recorded, so callers can exercise a client without a server.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::transport::{FilePart, Response, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// a request seen by `MemoryTransport`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub form: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

impl RecordedRequest {
    /// value of the first form field named `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// queue a response for the next request
    pub fn push(&self, response: Response) -> &Self {
        lock(&self.responses).push_back(response);
        self
    }

    pub fn push_json(&self, value: serde_json::Value) -> &Self {
        self.push(Response::ok_json(&value))
    }

    pub fn push_status(&self, status: u16) -> &Self {
        self.push(Response::new(status, Vec::new()))
    }

    /// snapshot of every request issued so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// responses queued but not yet consumed
    pub fn pending(&self) -> usize {
        lock(&self.responses).len()
    }

    fn respond(&self, request: RecordedRequest) -> Result<Response> {
        let url = request.url.clone();
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .ok_or_else(|| Error::Transport {
                message: format!("no scripted response for {}", url),
            })
    }
}

impl Transport for MemoryTransport {
    fn get(&self, url: &str) -> Result<Response> {
        self.respond(RecordedRequest {
            method: Method::Get,
            url: url.to_string(),
            form: Vec::new(),
            file: None,
        })
    }

    fn post(
        &self,
        url: &str,
        form: &[(String, String)],
        file: Option<&FilePart>,
    ) -> Result<Response> {
        self.respond(RecordedRequest {
            method: Method::Post,
            url: url.to_string(),
            form: form.to_vec(),
            file: file.cloned(),
        })
    }
}

// queues hold plain data, a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replays_in_order_and_records() {
        let transport = MemoryTransport::new();
        transport.push_json(json!({ "n": 1 })).push_status(404);

        let first = transport.get("http://repo/a").unwrap();
        assert_eq!(first.status, 200);
        let second = transport
            .post("http://repo/b", &[("hash".into(), "x".into())], None)
            .unwrap();
        assert_eq!(second.status, 404);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].field("hash"), Some("x"));
        assert_eq!(requests[1].field("tags"), None);
        assert_eq!(transport.pending(), 0);
    }

    #[test]
    fn test_exhausted_queue_is_transport_error() {
        let transport = MemoryTransport::new();
        let err = transport.get("http://repo/a").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(transport.request_count(), 1);
    }
}

//! transport layer for talking to the repository service
//!
//! the client only needs blocking GET and POST with a status code and a
//! json body back. `HttpTransport` does this over the network,
//! `MemoryTransport` replays scripted responses.

pub mod http;
pub mod memory;

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;

pub use http::HttpTransport;
pub use memory::{MemoryTransport, Method, RecordedRequest};

/// blocking request/response transport
pub trait Transport {
    /// issue a GET for `url`
    fn get(&self, url: &str) -> Result<Response>;

    /// issue a POST with form fields, sent as multipart when a file is attached
    fn post(
        &self,
        url: &str,
        form: &[(String, String)],
        file: Option<&FilePart>,
    ) -> Result<Response>;
}

/// status and raw body of a completed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with a json body
    pub fn ok_json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// decode the body as json
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// a file attached to a multipart POST
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    /// multipart field name
    pub field: String,
    /// file name reported to the server
    pub file_name: String,
    /// bytes sent as the part body
    pub content: Vec<u8>,
}

impl FilePart {
    /// part named after the base name of `path`
    pub fn named_after(path: &Path, content: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            field: name.clone(),
            file_name: name,
            content,
        }
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("bytes", &self.content.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_part_named_by_basename() {
        let path = Path::new("/samples/incoming/dropper.exe");
        let part = FilePart::named_after(path, b"MZ".to_vec());
        assert_eq!(part.field, "dropper.exe");
        assert_eq!(part.file_name, "dropper.exe");
        assert_eq!(part.content, b"MZ");
        assert!(format!("{:?}", part).contains("bytes: 2"));
    }

    #[test]
    fn test_response_json() {
        let res = Response::ok_json(&json!({ "status": "ok" }));
        assert!(res.is_ok());
        let value: serde_json::Value = res.json().unwrap();
        assert_eq!(value["status"], "ok");

        let bad = Response::new(200, "<html>");
        assert!(bad.json::<serde_json::Value>().is_err());
        assert!(!Response::new(500, "").is_ok());
    }
}

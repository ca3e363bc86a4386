//! network transport backed by `reqwest`'s blocking client

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Error, Result};
use crate::transport::{FilePart, Response, Transport};

/// user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("reversenote-client/", env!("CARGO_PKG_VERSION"));

/// HTTP transport over a shared `reqwest` client
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn finish(response: reqwest::blocking::Response) -> Result<Response> {
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        tracing::debug!(status, bytes = body.len(), "response received");
        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send()?;
        Self::finish(response)
    }

    fn post(
        &self,
        url: &str,
        form: &[(String, String)],
        file: Option<&FilePart>,
    ) -> Result<Response> {
        let request = self.client.post(url);
        let request = match file {
            None => request.form(form),
            Some(part) => {
                let mut multipart = multipart::Form::new();
                for (key, value) in form {
                    multipart = multipart.text(key.clone(), value.clone());
                }
                let file_part =
                    multipart::Part::bytes(part.content.clone()).file_name(part.file_name.clone());
                request.multipart(multipart.part(part.field.clone(), file_part))
            }
        };
        Self::finish(request.send()?)
    }
}

/// options for building an `HttpTransport`
#[derive(Clone, Debug)]
pub struct HttpTransportBuilder {
    user_agent: String,
    timeout: Option<Duration>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl HttpTransportBuilder {
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// bound on the whole request; unset means wait indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&self.user_agent).map_err(|e| Error::Transport {
            message: format!("invalid user agent {:?}: {}", self.user_agent, e),
        })?;
        headers.insert(USER_AGENT, agent);

        // blocking clients default to a 30s timeout, clear it unless asked
        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        Ok(HttpTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = HttpTransport::builder();
        assert!(builder.user_agent.starts_with("reversenote-client/"));
        assert!(builder.timeout.is_none());
    }

    #[test]
    fn test_builder_rejects_bad_user_agent() {
        let err = HttpTransport::builder()
            .user_agent("bad\nagent")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}

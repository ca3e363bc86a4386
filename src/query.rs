//! request url construction
//!
//! the api takes its parameters as an ordered query string: `token` first,
//! then `action`, then whatever the operation needs.

use url::form_urlencoded;

/// ordered list of query parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// start a query carrying the credential
    pub fn with_token(token: &str) -> Self {
        Self::new().param("token", token)
    }

    pub fn action(self, action: &str) -> Self {
        self.param("action", action)
    }

    /// append a parameter, keeping insertion order
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// urlencoded form, spaces as `+`
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// join onto an endpoint with `?`
    pub fn to_url(&self, endpoint: &str) -> String {
        if self.pairs.is_empty() {
            return endpoint.to_string();
        }
        format!("{}?{}", endpoint, self.encode())
    }
}

/// copy of a url with the token value masked, for logging
pub(crate) fn redact_token(url: &str, token: &str) -> String {
    if token.is_empty() {
        return url.to_string();
    }
    let encoded: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
    url.replace(&encoded, "***")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_order_preserved() {
        let q = Query::with_token("secret")
            .action("getfiles")
            .param("page", 3)
            .param("tags", "ransom");
        let keys: Vec<&str> = q.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["token", "action", "page", "tags"]);
        assert_eq!(q.encode(), "token=secret&action=getfiles&page=3&tags=ransom");
    }

    #[test]
    fn test_query_encoding() {
        let q = Query::with_token("a b").param("tags", "x,y&z");
        assert_eq!(q.encode(), "token=a+b&tags=x%2Cy%26z");
    }

    #[test]
    fn test_to_url() {
        let url = Query::new()
            .action("uploadfiles")
            .to_url("http://repo.local/api.php");
        assert_eq!(url, "http://repo.local/api.php?action=uploadfiles");

        assert_eq!(Query::new().to_url("http://repo.local/api.php"), "http://repo.local/api.php");
    }

    #[test]
    fn test_redact_token() {
        let url = Query::with_token("s3cr3t")
            .action("getfile")
            .to_url("http://repo.local/api.php");
        let redacted = redact_token(&url, "s3cr3t");
        assert_eq!(redacted, "http://repo.local/api.php?token=***&action=getfile");
        assert_eq!(redact_token(&url, ""), url);
    }
}

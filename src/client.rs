use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::hash::{is_valid_hash, FileHash};
use crate::listing::TagListing;
use crate::query::{redact_token, Query};
use crate::transport::{FilePart, HttpTransport, Response, Transport};
use crate::types::{FileEnvelope, FileRecord, MetadataUpdate, Page, UploadDescriptor};

/// api endpoint of the public reversenote repository
pub const DEFAULT_ENDPOINT: &str = "http://malware.reversenote.info/api.php";

/// largest file the service accepts (31 MiB)
pub const MAX_UPLOAD_SIZE: u64 = 32_505_856;

/// authentication token attached to every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// whether the token has the 64 hex character shape of an api key
    pub fn is_api_key_shaped(&self) -> bool {
        is_valid_hash(&self.0, true)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// client for a sample repository `api.php` endpoint
///
/// every operation blocks until the transport answers. a hash argument is
/// validated before anything is sent; a bad one fails with
/// [`Error::InvalidIdentity`] and the transport is never touched.
pub struct RepoClient<T = HttpTransport> {
    credential: Credential,
    endpoint: String,
    transport: T,
}

impl RepoClient<HttpTransport> {
    /// client for the default endpoint over http
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_transport(Credential::new(token), DEFAULT_ENDPOINT, HttpTransport::new()?)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()?;
        let credential = Credential::new(config.token.clone());
        if !credential.is_api_key_shaped() {
            warn!("configured token does not look like an api key");
        }
        Self::with_transport(credential, &config.endpoint, transport)
    }
}

impl<T: Transport> RepoClient<T> {
    pub fn with_transport(credential: Credential, endpoint: &str, transport: T) -> Result<Self> {
        url::Url::parse(endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        Ok(Self {
            credential,
            endpoint: endpoint.to_string(),
            transport,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// fetch a stored sample by hash
    #[instrument(level = "debug", skip(self))]
    pub fn download(&self, hash: &str) -> Result<Value> {
        let hash = FileHash::parse(hash)?;
        let query = self.query().action("downloadfile").param("file", &hash);
        self.get_json(&query)
    }

    /// upload a file with its tags, comment and scan options
    ///
    /// the file is read once; the size limit, the hash and the uploaded part
    /// all see the same bytes. files larger than [`MAX_UPLOAD_SIZE`] are
    /// refused before anything is sent.
    #[instrument(level = "debug", skip(self, descriptor), fields(tags = %descriptor.tags))]
    pub fn upload(&self, path: &Path, descriptor: &UploadDescriptor) -> Result<Value> {
        let content = read_upload(path)?;
        let size = content.len();
        let hash = FileHash::of_bytes(&content);
        let files_data = serde_json::to_string(&descriptor.files_data())?;
        let form = vec![
            ("hash".to_string(), hash.to_string()),
            ("comment".to_string(), descriptor.comment.clone()),
            ("token".to_string(), self.credential.as_str().to_string()),
            ("files_data".to_string(), files_data),
        ];

        let url = Query::new().action("uploadfiles").to_url(&self.endpoint);
        debug!(%hash, size, "uploading");
        let part = FilePart::named_after(path, content);
        let response = self.transport.post(&url, &form, Some(&part))?;
        decode(response)
    }

    /// ask the server to remove a sample
    ///
    /// the server side of this call does not work at the moment; the request
    /// is still sent and its answer returned as is.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, hash: &str) -> Result<Value> {
        let hash = FileHash::parse(hash)?;
        let query = self.query().param("file", &hash);
        self.get_json(&query)
    }

    /// current metadata of one sample
    #[instrument(level = "debug", skip(self))]
    pub fn get_file(&self, hash: &str) -> Result<FileRecord> {
        let hash = FileHash::parse(hash)?;
        let query = self.query().action("getfile").param("hash", &hash);
        let envelope: FileEnvelope = self.get_json(&query)?;
        Ok(envelope.file)
    }

    /// one page of the tag-filtered listing, `page` counting from zero
    #[instrument(level = "debug", skip(self))]
    pub fn get_page(&self, tags: &str, page: usize) -> Result<Page> {
        let query = self
            .query()
            .action("getfiles")
            .param("page", page)
            .param("tags", tags);
        self.get_json(&query)
    }

    /// every sample carrying `tags`, fetched page by page as the iterator is
    /// drained
    pub fn list_by_tags(&self, tags: &str) -> TagListing<'_, T> {
        TagListing::new(self, tags)
    }

    /// replace the tag string of a sample
    #[instrument(level = "debug", skip(self))]
    pub fn overwrite_tags(&self, hash: &str, tags: &str) -> Result<Value> {
        let hash = FileHash::parse(hash)?;
        self.update_field(&hash, "tags", tags.to_string())
    }

    /// append tags to the ones already on the server
    ///
    /// reads the record then writes it back. a change made by someone else in
    /// between is overwritten.
    #[instrument(level = "debug", skip(self))]
    pub fn add_tags(&self, hash: &str, tags: &str) -> Result<Value> {
        let hash = FileHash::parse(hash)?;
        let current = self.get_file(hash.as_str())?;
        self.update_field(&hash, "tags", current.merged_tags(tags))
    }

    /// append a line to the sample's comment, same read-then-write as
    /// [`add_tags`](Self::add_tags)
    #[instrument(level = "debug", skip(self))]
    pub fn add_comment(&self, hash: &str, comment: &str) -> Result<Value> {
        let hash = FileHash::parse(hash)?;
        let current = self.get_file(hash.as_str())?;
        self.update_field(&hash, "comment", current.merged_comment(comment))
    }

    /// general metadata update, not supported
    ///
    /// the server names fields differently when reading and writing a record
    /// and there is no settled mapping between the two. always fails with
    /// [`Error::MetadataUpdateUnsupported`] without sending anything; use
    /// [`overwrite_tags`](Self::overwrite_tags), [`add_tags`](Self::add_tags)
    /// or [`add_comment`](Self::add_comment) instead.
    pub fn update_metadata(&self, _hash: &str, _desired: &MetadataUpdate) -> Result<Value> {
        Err(Error::MetadataUpdateUnsupported)
    }

    fn query(&self) -> Query {
        Query::with_token(self.credential.as_str())
    }

    fn get_json<R: DeserializeOwned>(&self, query: &Query) -> Result<R> {
        let url = query.to_url(&self.endpoint);
        debug!(url = %redact_token(&url, self.credential.as_str()), "GET");
        decode(self.transport.get(&url)?)
    }

    fn update_field(&self, hash: &FileHash, field: &str, value: String) -> Result<Value> {
        let url = self.query().action("updatefile").to_url(&self.endpoint);
        let form = vec![
            ("hash".to_string(), hash.to_string()),
            (field.to_string(), value),
        ];
        debug!(url = %redact_token(&url, self.credential.as_str()), field, "POST");
        decode(self.transport.post(&url, &form, None)?)
    }
}

impl<T> fmt::Debug for RepoClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoClient")
            .field("credential", &self.credential)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// contents of a file to upload, refused past [`MAX_UPLOAD_SIZE`]
fn read_upload(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_path(path)?;
    let declared = file.metadata().with_path(path)?.len();
    if declared > MAX_UPLOAD_SIZE {
        return Err(too_large(path, declared));
    }
    // the file may have grown since the metadata was read
    let content = read_limited(file, MAX_UPLOAD_SIZE).with_path(path)?;
    if content.len() as u64 > MAX_UPLOAD_SIZE {
        return Err(too_large(path, content.len() as u64));
    }
    Ok(content)
}

/// read at most `limit + 1` bytes, so an overrun shows in the length
fn read_limited<R: Read>(reader: R, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut content = Vec::new();
    reader.take(limit + 1).read_to_end(&mut content)?;
    Ok(content)
}

fn too_large(path: &Path, size: u64) -> Error {
    Error::PayloadTooLarge {
        path: path.to_path_buf(),
        size,
        limit: MAX_UPLOAD_SIZE,
    }
}

/// anything but 200 is a rejection, whatever the reason
fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
    if !response.is_ok() {
        return Err(Error::Rejected {
            status: response.status,
        });
    }
    response.json()
}

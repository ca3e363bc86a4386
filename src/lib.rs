//! reversenote - sample repository client
//!
//! a blocking client for Malware Repository Framework style sample
//! repositories: upload and download samples by hash, read and amend their
//! tags and comments, and walk every sample carrying a tag.
//!
//! # Core concepts
//!
//! - **FileHash**: a validated md5, sha1 or sha256 hex string identifying a sample
//! - **FileRecord**: the metadata the server keeps for one sample
//! - **TagListing**: a lazy iterator over a paged, tag-filtered listing
//! - **Transport**: the blocking GET/POST seam; `HttpTransport` for the network,
//!   `MemoryTransport` for scripted tests
//!
//! # Failures
//!
//! bad input (malformed hash, oversized upload) fails before anything is
//! sent, see [`Error::is_precondition`]. every non-200 answer and network
//! problem is a soft failure, see [`Error::is_soft_failure`], so a batch over
//! many samples can skip and carry on. nothing is retried.
//!
//! # Example usage
//!
//! ```no_run
//! use reversenote::{RepoClient, UploadDescriptor};
//! use std::path::Path;
//!
//! let token = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
//! let client = RepoClient::new(token).unwrap();
//!
//! // upload a sample, tagged, without forwarding it to the external scanner
//! let descriptor = UploadDescriptor::new().tags("emotet,dropper");
//! client.upload(Path::new("/samples/invoice.doc"), &descriptor).unwrap();
//!
//! // walk every sample with a tag
//! for record in client.list_by_tags("emotet") {
//!     println!("{} {}", record.hash, record.tags);
//! }
//! ```

mod client;
mod config;
mod error;
mod hash;
mod listing;
mod query;

pub mod transport;
pub mod types;

pub use client::{Credential, RepoClient, DEFAULT_ENDPOINT, MAX_UPLOAD_SIZE};
pub use config::{Config, ENDPOINT_ENV, TOKEN_ENV};
pub use error::{Error, IoResultExt, Result};
pub use hash::{
    compute_file_hash, compute_file_hash_with, hash_reader, is_valid_hash, FileHash, HashKind,
    BLOCK_SIZE,
};
pub use listing::TagListing;
pub use query::Query;
pub use transport::{HttpTransport, MemoryTransport, Transport};
pub use types::{FileRecord, FilesDataEntry, MetadataUpdate, Page, UploadDescriptor};

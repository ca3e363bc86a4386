use std::path::PathBuf;

/// error type for sample repository operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid file hash: {0:?}")]
    InvalidIdentity(String),

    #[error("file too large to upload: {path} is {size} bytes (limit {limit})")]
    PayloadTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("general metadata update is not supported, use the tag or comment operations")]
    MetadataUpdateUnsupported,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request rejected with status {status}")]
    Rejected { status: u16 },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// caller input was rejected before anything was sent
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentity(_)
                | Error::PayloadTooLarge { .. }
                | Error::MetadataUpdateUnsupported
                | Error::Io { .. }
        )
    }

    /// the service or the network failed; safe to skip and continue a batch
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            Error::Rejected { .. } | Error::Http(_) | Error::Transport { .. } | Error::Json(_)
        )
    }

    /// raw http status for rejected requests
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Rejected { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tiers() {
        assert!(Error::InvalidIdentity("zz".into()).is_precondition());
        assert!(Error::MetadataUpdateUnsupported.is_precondition());
        assert!(!Error::InvalidIdentity("zz".into()).is_soft_failure());

        let rejected = Error::Rejected { status: 404 };
        assert!(rejected.is_soft_failure());
        assert!(!rejected.is_precondition());
        assert_eq!(rejected.status(), Some(404));
        assert_eq!(Error::MetadataUpdateUnsupported.status(), None);
    }

    #[test]
    fn test_with_path() {
        let res: std::io::Result<()> = Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        let err = res.with_path("/missing/sample.bin").unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, PathBuf::from("/missing/sample.bin")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

mod record;
mod upload;

pub(crate) use record::FileEnvelope;
pub use record::{FileRecord, Page};
pub use upload::{FilesDataEntry, MetadataUpdate, UploadDescriptor};

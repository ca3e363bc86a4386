use serde::{Deserialize, Serialize};

/// per-upload options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadDescriptor {
    /// forward the sample to the external scan service
    pub vt_submit: bool,
    /// comma-delimited tags
    pub tags: String,
    pub comment: String,
}

impl UploadDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vt_submit(mut self, submit: bool) -> Self {
        self.vt_submit = submit;
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// internal classification runs exactly when the external scan does not
    pub fn ck_submit(&self) -> bool {
        !self.vt_submit
    }

    /// the single-entry `files_data` list sent alongside the file
    pub fn files_data(&self) -> Vec<FilesDataEntry> {
        vec![FilesDataEntry {
            index: 0,
            vtsubmit: self.vt_submit,
            cksubmit: self.ck_submit(),
            tags: self.tags.clone(),
        }]
    }
}

/// one element of the `files_data` upload field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesDataEntry {
    pub index: u32,
    pub vtsubmit: bool,
    pub cksubmit: bool,
    pub tags: String,
}

/// requested changes for a general metadata update
///
/// accepted by `RepoClient::update_metadata`, which does not apply it: the
/// server reads and writes these fields under different names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub favorite: Option<bool>,
    pub vendor: Option<String>,
    pub user: Option<String>,
    pub comment: Option<String>,
    pub tags: Option<String>,
    pub urls: Option<String>,
    pub locked: Option<bool>,
}

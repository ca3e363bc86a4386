//! lazy tag-filtered listing
//!
//! pages are requested one at a time, only once the records of the previous
//! page have all been handed out. an empty page ends the listing; so does any
//! failure, which is logged and otherwise swallowed.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::client::RepoClient;
use crate::transport::Transport;
use crate::types::FileRecord;

/// iterator over every record matching a tag filter
///
/// forward-only; start over with another `list_by_tags` call. nothing is held
/// on the server, so dropping it early is fine.
pub struct TagListing<'a, T> {
    client: &'a RepoClient<T>,
    tags: String,
    page: usize,
    buffer: VecDeque<FileRecord>,
    finished: bool,
}

impl<'a, T: Transport> TagListing<'a, T> {
    pub(crate) fn new(client: &'a RepoClient<T>, tags: &str) -> Self {
        Self {
            client,
            tags: tags.to_string(),
            page: 0,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    /// index of the next page to be requested
    pub fn page(&self) -> usize {
        self.page
    }

    fn fetch_page(&mut self) {
        match self.client.get_page(&self.tags, self.page) {
            Ok(page) if page.is_last() => {
                debug!(tags = %self.tags, page = self.page, "listing exhausted");
                self.finished = true;
            }
            Ok(page) => {
                self.buffer.extend(page.files);
                self.page += 1;
            }
            Err(e) => {
                warn!(tags = %self.tags, page = self.page, error = %e, "listing stopped");
                self.finished = true;
            }
        }
    }
}

impl<T: Transport> Iterator for TagListing<'_, T> {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(record);
            }
            if self.finished {
                return None;
            }
            self.fetch_page();
        }
    }
}

impl<T: Transport> FusedIterator for TagListing<'_, T> {}

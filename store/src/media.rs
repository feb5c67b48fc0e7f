//! Linked photo policy.
//!
//! The store appends whatever it is given. Callers adding photos on the
//! user's behalf go through [`MediaPolicy`], which resolves the drive file
//! id, refuses duplicates, and caps the list.

use std::sync::OnceLock;

use regex_lite::Regex;
use thiserror::Error;

use crate::backend::KeyValueBackend;
use crate::records::{MediaReference, NewMediaReference};
use crate::store::RecordStore;

/// Maximum number of linked photos.
pub const MAX_MEDIA_ITEMS: usize = 6;

/// Minimum length of a bare drive file id.
const MIN_BARE_FILE_ID_LEN: usize = 25;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaRejection {
    #[error("invalid Google Drive file ID or URL")]
    InvalidFileId,

    #[error("this photo has already been added ({file_id})")]
    Duplicate { file_id: String },

    #[error("maximum {limit} photos allowed")]
    LimitReached { limit: usize },
}

fn url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"/file/d/([a-zA-Z0-9_-]+)",
            r"id=([a-zA-Z0-9_-]+)",
            r"/d/([a-zA-Z0-9_-]+)",
        ]
        .into_iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Resolve a drive file id from a bare id or a share/view URL.
///
/// A bare id is at least 25 characters of `[A-Za-z0-9_-]` after trimming.
/// Otherwise URL patterns are tried in turn: `/file/d/<id>`, `id=<id>`,
/// `/d/<id>`.
pub fn extract_drive_file_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.len() >= MIN_BARE_FILE_ID_LEN && trimmed.chars().all(is_id_char) {
        return Some(trimmed.to_string());
    }

    url_patterns().iter().find_map(|re| {
        re.captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPolicy {
    pub max_items: usize,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_items: MAX_MEDIA_ITEMS,
        }
    }
}

impl MediaPolicy {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    /// Validate `input` against the stored list and append it.
    ///
    /// Checks run in order: id resolution, duplicate, limit. Returns the
    /// full list after the append.
    pub fn add<B: KeyValueBackend>(
        &self,
        store: &RecordStore<B>,
        input: &str,
        caption: Option<&str>,
    ) -> Result<Vec<MediaReference>, MediaRejection> {
        let file_id = extract_drive_file_id(input).ok_or(MediaRejection::InvalidFileId)?;

        let current = store.get_media();
        if current.iter().any(|m| m.file_id == file_id) {
            return Err(MediaRejection::Duplicate { file_id });
        }
        if current.len() >= self.max_items {
            return Err(MediaRejection::LimitReached {
                limit: self.max_items,
            });
        }

        let caption = caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        tracing::debug!(file_id = %file_id, count = current.len() + 1, "adding linked photo");
        Ok(store.add_media(NewMediaReference {
            caption,
            order: Some(u32::try_from(current.len()).unwrap_or(u32::MAX)),
            ..NewMediaReference::new(file_id)
        }))
    }

    /// Whether another photo may be added.
    pub fn has_room(&self, current: &[MediaReference]) -> bool {
        current.len() < self.max_items
    }
}

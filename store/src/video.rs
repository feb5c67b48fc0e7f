//! Introduction video linking.

use std::sync::OnceLock;

use regex_lite::Regex;
use thiserror::Error;

use crate::backend::KeyValueBackend;
use crate::records::VideoReference;
use crate::store::RecordStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VideoRejection {
    #[error("not a valid YouTube video ID or URL")]
    InvalidVideoId,

    #[error("the video needs a title")]
    MissingTitle,

    #[error("the video must be set to unlisted")]
    NotConfirmedUnlisted,
}

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
            r"^([a-zA-Z0-9_-]{11})$",
        ]
        .into_iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Extract the 11 character video id from a watch, short or embed URL, or
/// accept a bare id. Both forms yield the same string.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    patterns().iter().find_map(|re| {
        re.captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// A user's request to link their introduction video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSubmission {
    pub input: String,
    pub title: String,
    pub confirmed_unlisted: bool,
}

impl VideoSubmission {
    /// Validate and save, replacing any linked video.
    pub fn submit<B: KeyValueBackend>(
        &self,
        store: &RecordStore<B>,
    ) -> Result<VideoReference, VideoRejection> {
        let video_id = extract_video_id(&self.input).ok_or(VideoRejection::InvalidVideoId)?;
        let title = self.title.trim();
        if title.is_empty() {
            return Err(VideoRejection::MissingTitle);
        }
        if !self.confirmed_unlisted {
            return Err(VideoRejection::NotConfirmedUnlisted);
        }

        let video = VideoReference {
            video_id,
            title: Some(title.to_string()),
            added_at: store.timestamp(),
        };
        store.save_video(&video);
        Ok(video)
    }
}

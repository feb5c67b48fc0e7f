//! Local record store for the HalalMatches profile application.
//!
//! All user data lives on the user's device as JSON values under a fixed set
//! of namespaced keys:
//! - [`RecordStore`] reads and writes typed records through an injected
//!   [`KeyValueBackend`] and never fails outward: unavailable storage,
//!   rejected writes and malformed text all degrade to "absent"
//! - [`calculate_profile_completion`] scores a profile out of 100
//! - [`Readiness`] turns the stored state into the dashboard checklist
//! - [`MediaPolicy`] and [`VideoSubmission`] validate user-supplied links
//!   before they reach the store
//! - [`INTRO_TEMPLATES`] is the catalogue introductions are written from
//!
//! Backends: [`MemoryBackend`] (optionally quota-limited),
//! [`UnavailableBackend`] and the durable [`SqliteBackend`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod backend;
pub mod clock;
pub mod completion;
pub mod config;
pub mod errors;
pub mod events;
pub mod ids;
pub mod keys;
pub mod media;
pub mod patch;
pub mod readiness;
pub mod records;
pub mod sqlite;
pub mod store;
pub mod templates;
pub mod video;

pub use backend::{KeyValueBackend, MemoryBackend, UnavailableBackend};
pub use clock::{Clock, ManualClock, SystemClock, iso_timestamp};
pub use completion::{
    CompletionCheck, CompletionField, calculate_profile_completion, completion_checks,
    missing_fields,
};
pub use config::StoreConfig;
pub use errors::{BackendError, ErrorCategory, Result, StoreError};
pub use events::{ChangeKind, ChangeOrigin, EVENT_CHANNEL_CAPACITY, StoreEvent};
pub use ids::generate_id;
pub use keys::{DEFAULT_KEY_PREFIX, KeyNamespace, StorageKey};
pub use media::{MAX_MEDIA_ITEMS, MediaPolicy, MediaRejection, extract_drive_file_id};
pub use patch::{IslamicPracticePatch, ProfilePatch};
pub use readiness::{
    DEFAULT_READINESS_THRESHOLD, Readiness, ReadinessStep, StepId, ready_for_introductions,
};
pub use records::{
    AgeRange, AppState, Gender, HijabNiqab, IntroductionRecord, IntroductionStatus,
    IslamicPractice, MediaReference, NewIntroduction, NewMediaReference, NewWaitlistEntry,
    PrayerFrequency, Profile, ProfileWaliStatus, ReligiousPractice, VideoReference,
    WaitlistEntry, WaliPath, WaliStatusRecord,
};
pub use sqlite::SqliteBackend;
pub use store::RecordStore;
pub use templates::{
    CUSTOM_TEMPLATE_LABEL, DEFAULT_TEMPLATE_ID, INTRO_TEMPLATES, IntroTemplate, template_label,
};
pub use video::{VideoRejection, VideoSubmission, extract_video_id};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

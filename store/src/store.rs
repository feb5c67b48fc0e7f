//! Record store over an injected key-value backend.
//!
//! ## Key Layout
//!
//! ```text
//! {prefix}profile            Profile              (JSON object)
//! {prefix}drive_media        [MediaReference]     (JSON array)
//! {prefix}youtube_video      VideoReference       (JSON object)
//! {prefix}introductions      [IntroductionRecord] (JSON array)
//! {prefix}wali_status        WaliStatusRecord     (JSON object)
//! {prefix}waitlist           [WaitlistEntry]      (JSON array)
//! {prefix}onboarding         "true" | "false"
//! {prefix}dark_mode          "true" | "false"
//! {prefix}google_connected   "true" | "false"
//! ```
//!
//! ## Failure policy
//!
//! The `try_*` primitives return [`crate::Result`]. Every public record
//! operation goes through them and then collapses `Err` to the absent value:
//! reads yield `None` or an empty list, writes are dropped after logging.
//! Nothing here panics or returns an error to the caller.
//!
//! List appends and removals never overwrite a value they could not read.
//! Single entries that fail to decode are hidden from readers but written
//! back as they were.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::backend::KeyValueBackend;
use crate::clock::{Clock, SystemClock, iso_timestamp};
use crate::config::StoreConfig;
use crate::errors::{BackendError, ErrorCategory, Result, StoreError};
use crate::events::{ChangeKind, ChangeOrigin, EVENT_CHANNEL_CAPACITY, StoreEvent};
use crate::ids::generate_id;
use crate::keys::{KeyNamespace, StorageKey};
use crate::patch::ProfilePatch;
use crate::records::{
    AppState, IntroductionRecord, IntroductionStatus, MediaReference, NewIntroduction,
    NewMediaReference, NewWaitlistEntry, Profile, VideoReference, WaitlistEntry, WaliStatusRecord,
};

/// Typed, fail-closed access to every persisted record.
pub struct RecordStore<B> {
    backend: B,
    namespace: KeyNamespace,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<StoreEvent>,
}

impl<B: KeyValueBackend> RecordStore<B> {
    /// Store with the default key prefix and the system clock.
    pub fn new(backend: B) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            namespace: KeyNamespace::default(),
            clock: Arc::new(SystemClock),
            events,
        }
    }

    /// Store using the key prefix from `cfg`.
    pub fn with_config(backend: B, cfg: &StoreConfig) -> Self {
        Self::new(backend).with_namespace(cfg.namespace())
    }

    pub fn with_namespace(mut self, namespace: KeyNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    /// Current time from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current time rendered as a stored timestamp.
    pub fn timestamp(&self) -> String {
        iso_timestamp(self.now())
    }

    /// Fresh record id stamped with the current time.
    pub fn new_id(&self) -> String {
        generate_id(self.now())
    }

    // ── Primitives ───────────────────────────────────────────────────────

    /// Read and decode the value under `key`.
    pub fn try_read<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let Some(text) = self.try_read_raw(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: self.namespace.key(key),
                source,
            })
    }

    /// Encode and write `value` under `key`.
    pub fn try_write<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: self.namespace.key(key),
            source,
        })?;
        self.try_write_raw(key, &text)
    }

    /// Delete `key`.
    pub fn try_remove(&self, key: StorageKey) -> Result<()> {
        let full = self.namespace.key(key);
        self.backend
            .remove_item(&full)
            .map_err(|e| StoreError::backend(&full, e))?;
        self.emit(key, ChangeKind::Removed);
        Ok(())
    }

    fn try_read_raw(&self, key: StorageKey) -> Result<Option<String>> {
        let full = self.namespace.key(key);
        self.backend
            .get_item(&full)
            .map_err(|e| StoreError::backend(&full, e))
    }

    fn try_write_raw(&self, key: StorageKey, text: &str) -> Result<()> {
        let full = self.namespace.key(key);
        self.backend
            .set_item(&full, text)
            .map_err(|e| StoreError::backend(&full, e))?;
        self.emit(key, ChangeKind::Written);
        Ok(())
    }

    // ── Fail-closed collapse ─────────────────────────────────────────────

    fn read_or_absent<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(err) => {
                log_read_failure(&err);
                None
            }
        }
    }

    /// Read a list key, keeping entries that fail to decode as raw JSON.
    fn try_read_entries<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Vec<ListEntry<T>>> {
        let entries: Vec<ListEntry<T>> = self.try_read(key)?.unwrap_or_default();
        let skipped = entries
            .iter()
            .filter(|e| matches!(e, ListEntry::Unrecognized(_)))
            .count();
        if skipped > 0 {
            tracing::warn!(
                key = %self.namespace.key(key),
                skipped,
                "ignoring list entries that do not decode"
            );
        }
        Ok(entries)
    }

    fn read_list<T: DeserializeOwned>(&self, key: StorageKey) -> Vec<T> {
        match self.try_read_entries(key) {
            Ok(entries) => records_of(entries),
            Err(err) => {
                log_read_failure(&err);
                Vec::new()
            }
        }
    }

    /// Read-modify-write of a list key. `mutate` returns whether to write.
    ///
    /// Undecodable entries are written back untouched. When the stored value
    /// cannot be read at all the write is skipped so it is never replaced.
    fn update_list<T, F>(&self, key: StorageKey, mutate: F) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<ListEntry<T>>) -> bool,
    {
        let mut entries = match self.try_read_entries::<T>(key) {
            Ok(entries) => entries,
            Err(err) => {
                log_read_failure(&err);
                tracing::debug!(key = %self.namespace.key(key), "list update skipped");
                return Vec::new();
            }
        };
        if mutate(&mut entries) {
            self.write_or_log(key, &entries);
        }
        records_of(entries)
    }

    fn write_or_log<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        if let Err(err) = self.try_write(key, value) {
            log_write_failure(&err);
        }
    }

    fn remove_or_log(&self, key: StorageKey) {
        if let Err(err) = self.try_remove(key) {
            log_write_failure(&err);
        }
    }

    fn read_flag(&self, key: StorageKey) -> bool {
        match self.try_read_raw(key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                log_read_failure(&err);
                false
            }
        }
    }

    fn write_flag(&self, key: StorageKey, enabled: bool) {
        let text = if enabled { "true" } else { "false" };
        if let Err(err) = self.try_write_raw(key, text) {
            log_write_failure(&err);
        }
    }

    // ── Profile ──────────────────────────────────────────────────────────

    pub fn get_profile(&self) -> Option<Profile> {
        self.read_or_absent(StorageKey::Profile)
    }

    /// Overwrite the stored profile. The caller owns every field,
    /// including timestamps.
    pub fn save_profile(&self, profile: &Profile) {
        self.write_or_log(StorageKey::Profile, profile);
    }

    /// Merge `patch` onto the stored profile and restamp `updatedAt`.
    /// Returns `None` without writing when no profile exists yet.
    pub fn update_profile(&self, patch: ProfilePatch) -> Option<Profile> {
        let mut profile = self.get_profile()?;
        patch.apply(&mut profile);
        profile.updated_at = self.timestamp();
        self.save_profile(&profile);
        Some(profile)
    }

    pub fn remove_profile(&self) {
        self.remove_or_log(StorageKey::Profile);
    }

    // ── Media ────────────────────────────────────────────────────────────

    /// Linked photos in stored (display) order.
    pub fn get_media(&self) -> Vec<MediaReference> {
        self.read_list(StorageKey::DriveMedia)
    }

    /// Append a photo reference and return the full list. The store does
    /// not enforce the photo limit or `fileId` uniqueness; see
    /// [`crate::MediaPolicy`].
    pub fn add_media(&self, media: NewMediaReference) -> Vec<MediaReference> {
        let id = media.id.unwrap_or_else(|| self.new_id());
        let added_at = self.timestamp();
        self.update_list(StorageKey::DriveMedia, |entries| {
            let order = media
                .order
                .unwrap_or_else(|| u32::try_from(entries.len()).unwrap_or(u32::MAX));
            entries.push(ListEntry::Record(MediaReference {
                id,
                file_id: media.file_id,
                file_name: media.file_name,
                mime_type: media.mime_type,
                caption: media.caption,
                order,
                added_at,
                is_approved: media.is_approved,
            }));
            true
        })
    }

    /// Drop every reference to `file_id` and return the remaining list.
    /// `order` values of the survivors are left as they were.
    pub fn remove_media(&self, file_id: &str) -> Vec<MediaReference> {
        self.update_list(StorageKey::DriveMedia, |entries| {
            entries.retain(|e: &ListEntry<MediaReference>| !matches!(e, ListEntry::Record(m) if m.file_id == file_id));
            true
        })
    }

    // ── Video ────────────────────────────────────────────────────────────

    pub fn get_video(&self) -> Option<VideoReference> {
        self.read_or_absent(StorageKey::YoutubeVideo)
    }

    pub fn save_video(&self, video: &VideoReference) {
        self.write_or_log(StorageKey::YoutubeVideo, video);
    }

    pub fn remove_video(&self) {
        self.remove_or_log(StorageKey::YoutubeVideo);
    }

    // ── Introductions ────────────────────────────────────────────────────

    pub fn get_introductions(&self) -> Vec<IntroductionRecord> {
        self.read_list(StorageKey::Introductions)
    }

    /// Append an introduction with a generated id and `createdAt`.
    pub fn add_introduction(&self, intro: NewIntroduction) -> Vec<IntroductionRecord> {
        let now = self.timestamp();
        let record = IntroductionRecord {
            id: self.new_id(),
            recipient_id: intro.recipient_id,
            recipient_name: intro.recipient_name,
            template_used: intro.template_used,
            sent_at: intro.sent_at.unwrap_or_else(|| now.clone()),
            created_at: now,
            status: intro.status,
            message: intro.message,
        };
        self.update_list(StorageKey::Introductions, |entries| {
            entries.push(ListEntry::Record(record));
            true
        })
    }

    /// Record a reply to the introduction `id`. An unknown id leaves the
    /// list untouched and writes nothing.
    pub fn set_introduction_status(
        &self,
        id: &str,
        status: IntroductionStatus,
    ) -> Vec<IntroductionRecord> {
        self.update_list(StorageKey::Introductions, |entries| {
            let found =
                entries
                    .iter_mut()
                    .find_map(|e: &mut ListEntry<IntroductionRecord>| match e {
                        ListEntry::Record(intro) if intro.id == id => Some(intro),
                        _ => None,
                    });
            let Some(intro) = found else {
                tracing::debug!(id, "introduction not found, status unchanged");
                return false;
            };
            intro.status = status;
            true
        })
    }

    // ── Wali status ──────────────────────────────────────────────────────

    pub fn get_wali_status(&self) -> Option<WaliStatusRecord> {
        self.read_or_absent(StorageKey::WaliStatus)
    }

    pub fn save_wali_status(&self, status: &WaliStatusRecord) {
        self.write_or_log(StorageKey::WaliStatus, status);
    }

    pub fn remove_wali_status(&self) {
        self.remove_or_log(StorageKey::WaliStatus);
    }

    // ── Waitlist ─────────────────────────────────────────────────────────

    pub fn get_waitlist(&self) -> Vec<WaitlistEntry> {
        self.read_list(StorageKey::Waitlist)
    }

    pub fn add_to_waitlist(&self, entry: NewWaitlistEntry) -> Vec<WaitlistEntry> {
        let record = WaitlistEntry {
            email: entry.email,
            gender: entry.gender,
            country: entry.country,
            has_wali: entry.has_wali,
            submitted_at: self.timestamp(),
        };
        self.update_list(StorageKey::Waitlist, |entries| {
            entries.push(ListEntry::Record(record));
            true
        })
    }

    // ── Flags ────────────────────────────────────────────────────────────

    pub fn dark_mode(&self) -> bool {
        self.read_flag(StorageKey::DarkMode)
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        self.write_flag(StorageKey::DarkMode, enabled);
    }

    pub fn onboarding_completed(&self) -> bool {
        self.read_flag(StorageKey::Onboarding)
    }

    pub fn set_onboarding_completed(&self, completed: bool) {
        self.write_flag(StorageKey::Onboarding, completed);
    }

    pub fn google_connected(&self) -> bool {
        self.read_flag(StorageKey::GoogleConnected)
    }

    pub fn set_google_connected(&self, connected: bool) {
        self.write_flag(StorageKey::GoogleConnected, connected);
    }

    // ── Whole store ──────────────────────────────────────────────────────

    /// Snapshot of everything the application renders from.
    pub fn app_state(&self) -> AppState {
        AppState {
            profile: self.get_profile(),
            media: self.get_media(),
            video: self.get_video(),
            introductions: self.get_introductions(),
            wali_status: self.get_wali_status(),
            onboarding_completed: self.onboarding_completed(),
            dark_mode: self.dark_mode(),
            google_connected: self.google_connected(),
        }
    }

    /// Delete every namespaced key. Keys outside the namespace are kept.
    pub fn clear_all(&self) {
        for key in StorageKey::ALL {
            self.remove_or_log(key);
        }
        tracing::info!(
            prefix = self.namespace.prefix(),
            "cleared all stored records"
        );
    }

    // ── Change notification ──────────────────────────────────────────────

    /// Receiver for every successful write or removal made after this call.
    /// Drop it to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Forward a change another view made to `raw_key`. Keys outside this
    /// namespace are ignored; returns whether the key was recognised.
    pub fn notify_external_change(&self, raw_key: &str, change: ChangeKind) -> bool {
        let Some(key) = self.namespace.parse(raw_key) else {
            return false;
        };
        let _ = self.events.send(StoreEvent {
            key,
            change,
            origin: ChangeOrigin::External,
        });
        true
    }

    fn emit(&self, key: StorageKey, change: ChangeKind) {
        // No receivers is not an error.
        let _ = self.events.send(StoreEvent {
            key,
            change,
            origin: ChangeOrigin::Local,
        });
    }
}

/// Stored list element. Entries this build cannot decode are carried as raw
/// JSON so a rewrite of the list preserves them.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ListEntry<T> {
    Record(T),
    Unrecognized(serde_json::Value),
}

fn records_of<T>(entries: Vec<ListEntry<T>>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|e| match e {
            ListEntry::Record(record) => Some(record),
            ListEntry::Unrecognized(_) => None,
        })
        .collect()
}

fn log_read_failure(err: &StoreError) {
    match err {
        StoreError::Backend {
            key,
            source: BackendError::Unavailable,
        } => {
            tracing::debug!(
                key = %key,
                category = err.category().as_str(),
                "storage unavailable, treating as absent"
            );
        }
        _ => {
            tracing::warn!(
                category = err.category().as_str(),
                error = %err,
                "failed to read stored record, treating as absent"
            );
        }
    }
}

fn log_write_failure(err: &StoreError) {
    if err.category() == ErrorCategory::BackendUnavailable {
        tracing::debug!(
            category = err.category().as_str(),
            error = %err,
            "storage unavailable, write dropped"
        );
    } else {
        tracing::warn!(
            category = err.category().as_str(),
            error = %err,
            "failed to persist record, write dropped"
        );
    }
}

//! Storage key namespace.
//!
//! Every record type lives under one fixed key, rendered as
//! `{prefix}{suffix}`. The default prefix keeps the store from colliding
//! with unrelated data sharing the same storage scope.

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "halalmatches_";

/// Logical storage keys, one per persisted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    Profile,
    DriveMedia,
    YoutubeVideo,
    Introductions,
    WaliStatus,
    Onboarding,
    DarkMode,
    GoogleConnected,
    Waitlist,
}

impl StorageKey {
    /// Every namespaced key, in declaration order.
    pub const ALL: [StorageKey; 9] = [
        StorageKey::Profile,
        StorageKey::DriveMedia,
        StorageKey::YoutubeVideo,
        StorageKey::Introductions,
        StorageKey::WaliStatus,
        StorageKey::Onboarding,
        StorageKey::DarkMode,
        StorageKey::GoogleConnected,
        StorageKey::Waitlist,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::DriveMedia => "drive_media",
            Self::YoutubeVideo => "youtube_video",
            Self::Introductions => "introductions",
            Self::WaliStatus => "wali_status",
            Self::Onboarding => "onboarding",
            Self::DarkMode => "dark_mode",
            Self::GoogleConnected => "google_connected",
            Self::Waitlist => "waitlist",
        }
    }

    /// Parse from the suffix representation
    pub fn from_suffix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.suffix() == s)
    }
}

/// Renders and parses prefixed keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespace {
    prefix: String,
}

impl Default for KeyNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full backend key for `key`.
    pub fn key(&self, key: StorageKey) -> String {
        format!("{}{}", self.prefix, key.suffix())
    }

    /// Map a raw backend key back to a [`StorageKey`]. Keys outside this
    /// namespace return `None`.
    pub fn parse(&self, raw: &str) -> Option<StorageKey> {
        raw.strip_prefix(self.prefix.as_str())
            .and_then(StorageKey::from_suffix)
    }

    /// All full keys in this namespace.
    pub fn all_keys(&self) -> Vec<String> {
        StorageKey::ALL.iter().map(|k| self.key(*k)).collect()
    }
}

//! Persisted record types.
//!
//! Field names, optionality and enum literals are part of the stored JSON
//! contract: structs serialize camelCase, absent optionals are omitted, and
//! enum values use the exact literals the rest of the application reads.

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

/// Select inputs write `""` when nothing is chosen. Read that as absent
/// instead of failing the whole record.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.is_empty() => {
            let literal: serde::de::value::StringDeserializer<D::Error> = text.into_deserializer();
            T::deserialize(literal).map(Some)
        }
        _ => Ok(None),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReligiousPractice {
    VeryPracticing,
    Practicing,
    ModeratelyPracticing,
    Learning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PrayerFrequency {
    FiveDaily,
    MostPrayers,
    SomePrayers,
    WorkingOnIt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HijabNiqab {
    Hijab,
    Niqab,
    Neither,
    Considering,
}

/// Wali arrangement declared on the profile itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileWaliStatus {
    HasWali,
    NoWali,
    Limited,
}

/// Wali path chosen on the wali settings record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaliPath {
    /// Father or male relative acts as wali
    Traditional,
    /// Local imam acts as wali
    Imam,
    /// Limited wali involvement
    Limited,
}

impl WaliPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traditional => "traditional",
            Self::Imam => "imam",
            Self::Limited => "limited",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "traditional" => Some(Self::Traditional),
            "imam" => Some(Self::Imam),
            "limited" => Some(Self::Limited),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntroductionStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl IntroductionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IslamicPractice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijab_beard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quran_reading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sect: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

/// The singleton user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,

    // Basic info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,

    // Education & career
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,

    // Marital status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wants_children: Option<bool>,

    // Religious practice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub islamic_practice: Option<IslamicPractice>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub religious_practice: Option<ReligiousPractice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sect: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub prayer_frequency: Option<PrayerFrequency>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub hijab_niqab: Option<HijabNiqab>,

    // About
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub looking_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_breakers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    // Marriage preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_age_range: Option<AgeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub willing_to_relocate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locations: Option<Vec<String>>,

    // Wali info
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub wali_status: Option<ProfileWaliStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_contact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<u8>,
}

impl Profile {
    /// A profile with identity and timestamps set and every other field
    /// empty. Scores 0% completion.
    pub fn new(id: impl Into<String>, now: impl Into<String>) -> Self {
        let now = now.into();
        Self {
            id: id.into(),
            created_at: now.clone(),
            updated_at: now,
            ..Self::default()
        }
    }

    /// Add a language, ignoring blanks and duplicates. Returns whether the
    /// list changed.
    pub fn add_language(&mut self, language: &str) -> bool {
        let language = language.trim();
        if language.is_empty() {
            return false;
        }
        let languages = self.languages.get_or_insert_with(Vec::new);
        if languages.iter().any(|l| l == language) {
            return false;
        }
        languages.push(language.to_string());
        true
    }

    /// Remove a language. Returns whether it was present.
    pub fn remove_language(&mut self, language: &str) -> bool {
        let Some(languages) = self.languages.as_mut() else {
            return false;
        };
        let before = languages.len();
        languages.retain(|l| l != language);
        languages.len() != before
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Media and video
// ─────────────────────────────────────────────────────────────────────────────

/// A photo referenced by its external file id. The file itself never
/// leaves the owner's drive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    pub id: String,
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub order: u32,
    pub added_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
}

/// Input for [`crate::RecordStore::add_media`]. `id` is generated and
/// `order` defaults to the append position when omitted; `addedAt` is
/// always stamped by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMediaReference {
    pub id: Option<String>,
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub order: Option<u32>,
    pub is_approved: Option<bool>,
}

impl NewMediaReference {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub added_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Introductions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionRecord {
    pub id: String,
    pub recipient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_used: Option<String>,
    pub sent_at: String,
    pub created_at: String,
    pub status: IntroductionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Input for [`crate::RecordStore::add_introduction`]. `sent_at` defaults
/// to the write time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIntroduction {
    pub recipient_id: String,
    pub recipient_name: Option<String>,
    pub template_used: Option<String>,
    pub sent_at: Option<String>,
    pub status: IntroductionStatus,
    pub message: Option<String>,
}

impl NewIntroduction {
    /// A pending introduction addressed to `recipient_id`. The recipient
    /// name defaults to the local part of an email address.
    pub fn to_recipient(recipient_id: impl Into<String>) -> Self {
        let recipient_id = recipient_id.into();
        let recipient_name = recipient_id
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .filter(|local| !local.is_empty());
        Self {
            recipient_id,
            recipient_name,
            ..Self::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wali status and waitlist
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WaliStatusRecord {
    pub path: WaliPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wali_contact: Option<String>,
    pub verified: bool,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub email: String,
    pub gender: Gender,
    pub country: String,
    pub has_wali: bool,
    pub submitted_at: String,
}

/// Input for [`crate::RecordStore::add_to_waitlist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaitlistEntry {
    pub email: String,
    pub gender: Gender,
    pub country: String,
    pub has_wali: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the application renders from, read in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub profile: Option<Profile>,
    #[serde(rename = "driveMedia")]
    pub media: Vec<MediaReference>,
    #[serde(rename = "youtubeVideo")]
    pub video: Option<VideoReference>,
    pub introductions: Vec<IntroductionRecord>,
    pub wali_status: Option<WaliStatusRecord>,
    pub onboarding_completed: bool,
    pub dark_mode: bool,
    pub google_connected: bool,
}

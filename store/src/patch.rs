//! Partial profile updates.
//!
//! A [`ProfilePatch`] carries only the fields a caller wants to change.
//! Top-level fields replace the stored value. `islamicPractice` is merged
//! field by field, so patching `prayer` keeps a stored `sect`. Identity
//! (`id`, `createdAt`) cannot be patched and `updatedAt` is stamped by the
//! store. An empty string for an enum field leaves the stored value alone.

use serde::Deserialize;

use crate::records::{
    AgeRange, Gender, HijabNiqab, IslamicPractice, PrayerFrequency, Profile, ProfileWaliStatus,
    ReligiousPractice, empty_as_none,
};

/// Copy every `Some` field of `$patch` onto `$target`.
macro_rules! merge_fields {
    ($patch:ident, $target:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IslamicPracticePatch {
    pub prayer: Option<String>,
    pub hijab_beard: Option<String>,
    pub quran_reading: Option<String>,
    pub sect: Option<String>,
}

impl IslamicPracticePatch {
    fn merge_into(self, target: &mut IslamicPractice) {
        let patch = self;
        merge_fields!(patch, target; prayer, hijab_beard, quran_reading, sect);
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    #[serde(deserialize_with = "empty_as_none")]
    pub gender: Option<Gender>,
    pub location: Option<String>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,
    pub education: Option<String>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub has_children: Option<bool>,
    pub wants_children: Option<bool>,
    pub islamic_practice: Option<IslamicPracticePatch>,
    #[serde(deserialize_with = "empty_as_none")]
    pub religious_practice: Option<ReligiousPractice>,
    pub sect: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub prayer_frequency: Option<PrayerFrequency>,
    #[serde(deserialize_with = "empty_as_none")]
    pub hijab_niqab: Option<HijabNiqab>,
    pub about_me: Option<String>,
    pub looking_for: Option<String>,
    pub deal_breakers: Option<String>,
    pub family_background: Option<String>,
    pub languages: Option<Vec<String>>,
    pub preferred_age_range: Option<AgeRange>,
    pub willing_to_relocate: Option<bool>,
    pub preferred_locations: Option<Vec<String>>,
    #[serde(deserialize_with = "empty_as_none")]
    pub wali_status: Option<ProfileWaliStatus>,
    pub wali_name: Option<String>,
    pub wali_relation: Option<String>,
    pub wali_contact: Option<String>,
    pub completion_percentage: Option<u8>,
}

impl ProfilePatch {
    /// Whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge onto `profile`. Does not touch `updatedAt`.
    pub fn apply(self, profile: &mut Profile) {
        let mut patch = self;
        if let Some(practice) = patch.islamic_practice.take() {
            practice.merge_into(profile.islamic_practice.get_or_insert_with(Default::default));
        }

        merge_fields!(
            patch, profile;
            name,
            display_name,
            age,
            gender,
            location,
            ethnicity,
            nationality,
            education,
            occupation,
            marital_status,
            has_children,
            wants_children,
            religious_practice,
            sect,
            prayer_frequency,
            hijab_niqab,
            about_me,
            looking_for,
            deal_breakers,
            family_background,
            languages,
            preferred_age_range,
            willing_to_relocate,
            preferred_locations,
            wali_status,
            wali_name,
            wali_relation,
            wali_contact,
            completion_percentage,
        );
    }
}

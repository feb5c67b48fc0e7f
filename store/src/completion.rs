//! Profile completion scoring.
//!
//! Ten fixed predicates, each worth an equal share. The score is
//! `round(100 * satisfied / 10)`, rounding half up.

use crate::records::Profile;

/// A field the completion score looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionField {
    Name,
    Age,
    Gender,
    Location,
    Education,
    Occupation,
    AboutMe,
    LookingFor,
    Prayer,
    WaliStatus,
}

impl CompletionField {
    /// Scoring order.
    pub const ALL: [CompletionField; 10] = [
        Self::Name,
        Self::Age,
        Self::Gender,
        Self::Location,
        Self::Education,
        Self::Occupation,
        Self::AboutMe,
        Self::LookingFor,
        Self::Prayer,
        Self::WaliStatus,
    ];

    /// Stored field name, as a form would label it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Location => "location",
            Self::Education => "education",
            Self::Occupation => "occupation",
            Self::AboutMe => "aboutMe",
            Self::LookingFor => "lookingFor",
            Self::Prayer => "islamicPractice.prayer",
            Self::WaliStatus => "waliStatus",
        }
    }

    fn is_satisfied(self, profile: &Profile) -> bool {
        match self {
            Self::Name => filled(&profile.name) || filled(&profile.display_name),
            Self::Age => profile.age.is_some_and(|age| age > 0),
            Self::Gender => profile.gender.is_some(),
            Self::Location => filled(&profile.location),
            Self::Education => filled(&profile.education),
            Self::Occupation => filled(&profile.occupation),
            Self::AboutMe => filled(&profile.about_me),
            Self::LookingFor => filled(&profile.looking_for),
            Self::Prayer => profile
                .islamic_practice
                .as_ref()
                .is_some_and(|p| filled(&p.prayer)),
            Self::WaliStatus => profile.wali_status.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCheck {
    pub field: CompletionField,
    pub satisfied: bool,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

/// Evaluate every predicate in scoring order.
pub fn completion_checks(profile: &Profile) -> [CompletionCheck; 10] {
    CompletionField::ALL.map(|field| CompletionCheck {
        field,
        satisfied: field.is_satisfied(profile),
    })
}

/// Fields still missing, in scoring order.
pub fn missing_fields(profile: &Profile) -> Vec<CompletionField> {
    completion_checks(profile)
        .into_iter()
        .filter(|c| !c.satisfied)
        .map(|c| c.field)
        .collect()
}

/// Completion percentage in `0..=100`.
pub fn calculate_profile_completion(profile: &Profile) -> u8 {
    let checks = completion_checks(profile);
    let total = checks.len();
    let satisfied = checks.iter().filter(|c| c.satisfied).count();
    let percent = (satisfied * 100 + total / 2) / total;
    u8::try_from(percent).unwrap_or(100)
}

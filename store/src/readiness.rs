//! Dashboard checklist gating introductions.
//!
//! Introductions open once every required step is complete: the profile
//! scores at least the threshold and a wali arrangement is recorded.

use serde::Serialize;

use crate::completion::calculate_profile_completion;
use crate::records::AppState;

/// Completion percentage at which the profile step counts as done.
pub const DEFAULT_READINESS_THRESHOLD: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Profile,
    Wali,
    Photos,
    Video,
    Introductions,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Wali => "wali",
            Self::Photos => "photos",
            Self::Video => "video",
            Self::Introductions => "introductions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Profile => "Complete your profile",
            Self::Wali => "Set wali status",
            Self::Photos => "Add photos",
            Self::Video => "Add introduction video",
            Self::Introductions => "Start introductions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessStep {
    pub id: StepId,
    pub completed: bool,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub completion: u8,
    pub steps: Vec<ReadinessStep>,
    pub completed_steps: usize,
    pub required_steps: usize,
    pub required_completed: usize,
    pub ready_for_introductions: bool,
}

impl Readiness {
    pub fn evaluate(state: &AppState, threshold: u8) -> Self {
        let completion = state
            .profile
            .as_ref()
            .map(calculate_profile_completion)
            .unwrap_or(0);

        let steps = vec![
            ReadinessStep {
                id: StepId::Profile,
                completed: completion >= threshold,
                required: true,
            },
            ReadinessStep {
                id: StepId::Wali,
                completed: state.wali_status.is_some(),
                required: true,
            },
            ReadinessStep {
                id: StepId::Photos,
                completed: !state.media.is_empty(),
                required: false,
            },
            ReadinessStep {
                id: StepId::Video,
                completed: state.video.is_some(),
                required: false,
            },
            // Never auto-completes; the user starts introductions themselves.
            ReadinessStep {
                id: StepId::Introductions,
                completed: false,
                required: false,
            },
        ];

        let completed_steps = steps.iter().filter(|s| s.completed).count();
        let required_steps = steps.iter().filter(|s| s.required).count();
        let required_completed = steps.iter().filter(|s| s.required && s.completed).count();

        Self {
            completion,
            ready_for_introductions: required_completed == required_steps,
            steps,
            completed_steps,
            required_steps,
            required_completed,
        }
    }

    /// Required steps still outstanding.
    pub fn blocking_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps
            .iter()
            .filter(|s| s.required && !s.completed)
            .map(|s| s.id)
    }
}

/// Shorthand for `Readiness::evaluate(..).ready_for_introductions`.
pub fn ready_for_introductions(state: &AppState, threshold: u8) -> bool {
    Readiness::evaluate(state, threshold).ready_for_introductions
}

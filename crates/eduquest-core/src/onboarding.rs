//! Preference collection for the student flow.

use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::is_cancelled;
use crate::model::{Preferences, ASSESSMENT_STYLES, CONTENT_FORMATS};
use crate::notify::Notifier;
use crate::progress::with_ticker;
use crate::traits::LearningApi;

pub const MISSING_SELECTION: &str = "Please select at least one preference from each category";
const NOTES_STATUS: &str = "Creating course notes based on your preferences...";

/// Why preferences could not be collected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("no content format selected")]
    EmptyContentFormat,
    #[error("no assessment style selected")]
    EmptyAssessmentStyle,
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// The two checklists of the onboarding screen.
#[derive(Debug, Default)]
pub struct PreferenceCollector {
    selected: Preferences,
}

impl PreferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick or untick a content format.
    pub fn toggle_content_format(&mut self, label: &str) -> Result<(), OnboardingError> {
        toggle(&mut self.selected.content_format, &CONTENT_FORMATS, label)
    }

    /// Tick or untick an assessment style.
    pub fn toggle_assessment_style(&mut self, label: &str) -> Result<(), OnboardingError> {
        toggle(&mut self.selected.assessment_style, &ASSESSMENT_STYLES, label)
    }

    pub fn selected(&self) -> &Preferences {
        &self.selected
    }

    /// Hand the selection upward. Both checklists need at least one tick;
    /// otherwise the user is notified and nothing is forwarded.
    pub fn complete(&self, notifier: &dyn Notifier) -> Result<Preferences, OnboardingError> {
        let err = if self.selected.content_format.is_empty() {
            Some(OnboardingError::EmptyContentFormat)
        } else if self.selected.assessment_style.is_empty() {
            Some(OnboardingError::EmptyAssessmentStyle)
        } else {
            None
        };

        match err {
            Some(e) => {
                notifier.error(MISSING_SELECTION);
                Err(e)
            }
            None => Ok(self.selected.clone()),
        }
    }
}

fn toggle(list: &mut Vec<String>, options: &[&str], label: &str) -> Result<(), OnboardingError> {
    let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(label.trim())) else {
        return Err(OnboardingError::UnknownOption(label.to_string()));
    };
    if let Some(pos) = list.iter().position(|s| s == option) {
        list.remove(pos);
    } else {
        list.push(option.to_string());
    }
    Ok(())
}

/// Ask the API for course notes matching `preferences`, with a synthetic
/// progress ticker running meanwhile.
pub async fn request_notes(
    api: &dyn LearningApi,
    preferences: &Preferences,
    tick: Duration,
    notifier: &dyn Notifier,
    cancel: &CancellationToken,
) -> Result<String> {
    info!("requesting course notes");
    let result = with_ticker(
        api.generate_notes(preferences, cancel),
        tick,
        NOTES_STATUS,
        notifier,
    )
    .await;

    match result {
        Ok(notes) => {
            notifier.progress(100, NOTES_STATUS);
            notifier.success("Course notes generated successfully!");
            Ok(notes)
        }
        Err(e) if is_cancelled(&e) => Err(e),
        Err(e) => {
            warn!("failed to generate notes: {e:#}");
            notifier.error("Failed to generate course notes");
            Err(e)
        }
    }
}

//! Portal orchestrator: sequences the wizard steps for a role.
//!
//! ```text
//! student: Onboarding ──┐
//!                       ├─> Qa ─> Assessment
//! admin:   Upload ──────┘
//! ```
//!
//! Entering `Qa` needs both a document and preferences. Entering `Assessment`
//! stages both into the session store. Nothing moves backwards on its own;
//! `back` is the only way to revisit a step.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::model::Preferences;
use crate::routes::Route;
use crate::session::SessionStore;

/// Who is using the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalRole {
    Admin,
    Student,
}

impl PortalRole {
    /// Role served by a route, if any.
    pub fn for_route(route: Route) -> Option<Self> {
        match route {
            Route::Admin => Some(PortalRole::Admin),
            Route::Student => Some(PortalRole::Student),
            Route::Landing | Route::Assessment => None,
        }
    }

    fn first_step(self) -> Step {
        match self {
            PortalRole::Admin => Step::Upload,
            PortalRole::Student => Step::Onboarding,
        }
    }
}

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Onboarding,
    Upload,
    Qa,
    Assessment,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Onboarding => write!(f, "onboarding"),
            Step::Upload => write!(f, "upload"),
            Step::Qa => write!(f, "qa"),
            Step::Assessment => write!(f, "assessment"),
        }
    }
}

/// A refused transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot do that during the {0} step")]
    WrongStep(Step),
    #[error("a document is required first")]
    MissingDocument,
    #[error("preferences are required first")]
    MissingPreferences,
    #[error("preferences were already chosen")]
    PreferencesLocked,
    #[error("there is no earlier step")]
    NoPriorStep,
}

/// Single-page state machine for one role.
#[derive(Debug)]
pub struct Portal {
    role: PortalRole,
    step: Step,
    history: Vec<Step>,
    preferences: Option<Preferences>,
    document_text: Option<String>,
}

impl Portal {
    pub fn new(role: PortalRole) -> Self {
        Self {
            role,
            step: role.first_step(),
            history: Vec::new(),
            preferences: None,
            document_text: None,
        }
    }

    pub fn role(&self) -> PortalRole {
        self.role
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn preferences(&self) -> Option<&Preferences> {
        self.preferences.as_ref()
    }

    pub fn document_text(&self) -> Option<&str> {
        self.document_text.as_deref()
    }

    /// Record preferences. Allowed once, before `Qa`.
    pub fn set_preferences(&mut self, preferences: Preferences) -> Result<(), TransitionError> {
        self.ensure_entry_step()?;
        if self.preferences.is_some() {
            return Err(TransitionError::PreferencesLocked);
        }
        self.preferences = Some(preferences);
        Ok(())
    }

    /// Record the document to study. A later upload replaces an earlier one.
    pub fn attach_document(&mut self, text: impl Into<String>) -> Result<(), TransitionError> {
        self.ensure_entry_step()?;
        self.document_text = Some(text.into());
        Ok(())
    }

    /// Move to `Qa` once both a document and preferences are present.
    pub fn enter_qa(&mut self) -> Result<(), TransitionError> {
        self.ensure_entry_step()?;
        if self.document_text.is_none() {
            return Err(TransitionError::MissingDocument);
        }
        if self.preferences.is_none() {
            return Err(TransitionError::MissingPreferences);
        }
        self.advance(Step::Qa);
        Ok(())
    }

    /// Move from `Qa` to `Assessment`, staging document and preferences into
    /// the session store for the assessment screen.
    pub fn enter_assessment(&mut self, session: &mut SessionStore) -> Result<()> {
        if self.step != Step::Qa {
            return Err(TransitionError::WrongStep(self.step).into());
        }
        let document = self
            .document_text
            .as_deref()
            .ok_or(TransitionError::MissingDocument)?;
        let preferences = self
            .preferences
            .as_ref()
            .ok_or(TransitionError::MissingPreferences)?;
        session.stage(document, preferences)?;
        self.advance(Step::Assessment);
        Ok(())
    }

    /// Manual return to the previous step.
    pub fn back(&mut self) -> Result<Step, TransitionError> {
        let prior = self.history.pop().ok_or(TransitionError::NoPriorStep)?;
        info!(from = %self.step, to = %prior, "stepping back");
        self.step = prior;
        Ok(prior)
    }

    fn ensure_entry_step(&self) -> Result<(), TransitionError> {
        if self.step == self.role.first_step() {
            Ok(())
        } else {
            Err(TransitionError::WrongStep(self.step))
        }
    }

    fn advance(&mut self, next: Step) {
        info!(role = ?self.role, from = %self.step, to = %next, "step");
        self.history.push(self.step);
        self.step = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences {
        Preferences {
            content_format: vec!["Real-world examples".into()],
            assessment_style: vec!["Open-ended questions".into()],
        }
    }

    #[test]
    fn roles_start_at_different_steps() {
        assert_eq!(Portal::new(PortalRole::Admin).step(), Step::Upload);
        assert_eq!(Portal::new(PortalRole::Student).step(), Step::Onboarding);
        assert_eq!(PortalRole::for_route(Route::Admin), Some(PortalRole::Admin));
        assert_eq!(PortalRole::for_route(Route::Landing), None);
    }

    #[test]
    fn qa_needs_document_and_preferences() {
        let mut portal = Portal::new(PortalRole::Student);
        assert_eq!(portal.enter_qa(), Err(TransitionError::MissingDocument));

        portal.attach_document("text").unwrap();
        assert_eq!(portal.enter_qa(), Err(TransitionError::MissingPreferences));

        portal.set_preferences(prefs()).unwrap();
        portal.enter_qa().unwrap();
        assert_eq!(portal.step(), Step::Qa);
    }

    #[test]
    fn preferences_are_immutable() {
        let mut portal = Portal::new(PortalRole::Student);
        portal.set_preferences(prefs()).unwrap();
        assert_eq!(
            portal.set_preferences(Preferences::default()),
            Err(TransitionError::PreferencesLocked)
        );
        assert_eq!(portal.preferences(), Some(&prefs()));
    }

    #[test]
    fn assessment_stages_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionStore::open(&dir.path().join("s.json")).unwrap();

        let mut portal = Portal::new(PortalRole::Admin);
        assert!(portal.enter_assessment(&mut session).is_err());

        portal.attach_document("doc").unwrap();
        portal.set_preferences(prefs()).unwrap();
        portal.enter_qa().unwrap();
        portal.enter_assessment(&mut session).unwrap();

        assert_eq!(portal.step(), Step::Assessment);
        let staged = session.rehydrate().unwrap();
        assert_eq!(staged.document_text, "doc");
        assert_eq!(staged.preferences, prefs());
    }

    #[test]
    fn back_walks_history() {
        let mut portal = Portal::new(PortalRole::Admin);
        assert_eq!(portal.back(), Err(TransitionError::NoPriorStep));

        portal.attach_document("doc").unwrap();
        portal.set_preferences(prefs()).unwrap();
        portal.enter_qa().unwrap();
        assert_eq!(
            portal.attach_document("other"),
            Err(TransitionError::WrongStep(Step::Qa))
        );

        assert_eq!(portal.back(), Ok(Step::Upload));
        portal.attach_document("replacement").unwrap();
        assert_eq!(portal.document_text(), Some("replacement"));
    }
}

//! The assessment screen: load questions, collect answers, submit.
//!
//! ```text
//! Loading -> Error
//!         -> Ready -> Results
//! ```

use anyhow::Result;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::is_cancelled;
use crate::model::{AnswerMap, Preferences, Question};
use crate::notify::Notifier;
use crate::scoring::{score_assessment, AssessmentResult};
use crate::traits::LearningApi;

/// Where the assessment screen is.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentState {
    Loading,
    Error(String),
    Ready,
    Results(AssessmentResult),
}

/// Local refusals of the assessment runner.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("assessment is not ready")]
    NotReady,
    #[error("question {index} does not exist (assessment has {count})")]
    NoSuchQuestion { index: usize, count: usize },
    #[error("{unanswered} question(s) still unanswered")]
    Incomplete { unanswered: usize },
}

/// Drives one assessment from generation to results.
#[derive(Debug)]
pub struct AssessmentRunner {
    state: AssessmentState,
    questions: Vec<Question>,
    answers: AnswerMap,
}

impl Default for AssessmentRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentRunner {
    pub fn new() -> Self {
        Self {
            state: AssessmentState::Loading,
            questions: Vec::new(),
            answers: AnswerMap::new(),
        }
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Generate the question set. Moves to `Ready`, or to `Error` when the
    /// API fails or returns no questions.
    pub async fn load(
        &mut self,
        api: &dyn LearningApi,
        preferences: &Preferences,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.state = AssessmentState::Loading;
        match api.generate_assessment(preferences, cancel).await {
            Ok(questions) if questions.is_empty() => {
                warn!("assessment generation returned no questions");
                notifier.error("Failed to generate assessment");
                self.state = AssessmentState::Error("no questions were generated".into());
            }
            Ok(questions) => {
                info!(count = questions.len(), "assessment generated");
                self.questions = questions;
                self.answers = AnswerMap::new();
                self.state = AssessmentState::Ready;
                notifier.success("Assessment generated successfully!");
            }
            Err(e) if is_cancelled(&e) => return Err(e),
            Err(e) => {
                warn!("assessment generation failed: {e:#}");
                notifier.error("Failed to generate assessment");
                self.state = AssessmentState::Error(format!("{e:#}"));
            }
        }
        Ok(())
    }

    /// Record an answer for a 1-based question index.
    pub fn answer(&mut self, index: usize, text: impl Into<String>) -> Result<(), AssessmentError> {
        if self.state != AssessmentState::Ready {
            return Err(AssessmentError::NotReady);
        }
        let count = self.questions.len();
        if index == 0 || index > count {
            return Err(AssessmentError::NoSuchQuestion { index, count });
        }
        self.answers.set(index, text);
        Ok(())
    }

    /// True when every question has a non-blank answer.
    pub fn can_submit(&self) -> bool {
        self.state == AssessmentState::Ready && self.answers.is_complete(self.questions.len())
    }

    /// Score the answers and move to `Results`.
    ///
    /// Refused while [`can_submit`](Self::can_submit) is false. If any scoring
    /// call fails the runner stays `Ready` with its answers untouched.
    pub async fn submit(
        &mut self,
        api: &dyn LearningApi,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> Result<AssessmentResult> {
        if self.state != AssessmentState::Ready {
            return Err(AssessmentError::NotReady.into());
        }
        if !self.can_submit() {
            let unanswered = (1..=self.questions.len())
                .filter(|&i| !matches!(self.answers.get(i), Some(a) if !a.trim().is_empty()))
                .count();
            return Err(AssessmentError::Incomplete { unanswered }.into());
        }

        match score_assessment(&self.questions, &self.answers, api, cancel).await {
            Ok(result) => {
                info!(score = result.score, "assessment scored");
                notifier.success("Assessment submitted successfully!");
                self.state = AssessmentState::Results(result.clone());
                Ok(result)
            }
            Err(e) if is_cancelled(&e) => Err(e),
            Err(e) => {
                warn!("assessment submission failed: {e:#}");
                notifier.error("Failed to submit assessment");
                Err(e)
            }
        }
    }
}

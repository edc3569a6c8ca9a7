//! Assessment scoring.
//!
//! Every question scores between 0 and 100. Multiple-choice answers are
//! checked locally; open-ended answers are scored by the API, one request at a
//! time. The overall score is the mean over all questions.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ApiError;
use crate::model::{AnswerMap, AssessmentKind, Question};
use crate::traits::{LearningApi, ScoreRequest};

/// Exact match after trimming, ignoring case. No partial credit.
pub fn answers_match(given: &str, correct: &str) -> bool {
    given.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// 100 for a matching answer, 0 otherwise.
pub fn score_multiple_choice(given: &str, correct: &str) -> f64 {
    if answers_match(given, correct) {
        100.0
    } else {
        0.0
    }
}

/// Mean of `scores`, 0 for an empty slice.
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Percentage rounded for display (66.67 becomes 67).
pub fn display_percent(score: f64) -> u32 {
    score.clamp(0.0, 100.0).round() as u32
}

/// Score for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    /// 1-based question index.
    pub index: usize,
    pub kind: AssessmentKind,
    pub answer: String,
    pub score: f64,
}

/// Outcome of a submitted assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Overall percentage, 0 to 100.
    pub score: f64,
    pub kind: AssessmentKind,
    pub per_question: Vec<QuestionScore>,
}

impl AssessmentResult {
    pub fn display_percent(&self) -> u32 {
        display_percent(self.score)
    }

    /// Number of questions that scored full marks.
    pub fn full_marks(&self) -> usize {
        self.per_question
            .iter()
            .filter(|q| q.score >= 100.0)
            .count()
    }
}

/// Clamp an API score into `0..=100`. NaN and infinities are rejected
/// rather than clamped.
pub fn bounded_score(raw: f64) -> Result<f64, ApiError> {
    if !raw.is_finite() {
        return Err(ApiError::InvalidResponse(format!(
            "score is not a finite number: {raw}"
        )));
    }
    Ok(raw.clamp(0.0, 100.0))
}

/// Score a fully answered question set.
///
/// Open-ended questions are sent to the API sequentially; the first failure
/// aborts the whole run and no partial result is returned. Returned scores are
/// clamped to `0..=100`.
pub async fn score_assessment(
    questions: &[Question],
    answers: &AnswerMap,
    api: &dyn LearningApi,
    cancel: &CancellationToken,
) -> Result<AssessmentResult> {
    let kind = AssessmentKind::of(questions)
        .ok_or_else(|| anyhow::anyhow!("cannot score an empty assessment"))?;

    let mut per_question = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        let index = i + 1;
        let answer = answers.get(index).unwrap_or_default().to_string();
        let score = match question {
            Question::MultipleChoice(q) => score_multiple_choice(&answer, &q.correct_answer),
            Question::OpenEnded(q) => {
                let request = ScoreRequest {
                    model_answer: q.model_answer.clone(),
                    student_answer: answer.clone(),
                };
                let raw = api.score_answer(&request, cancel).await?;
                debug!(index, raw, "open-ended answer scored");
                bounded_score(raw)?
            }
        };
        per_question.push(QuestionScore {
            index,
            kind: question.kind(),
            answer,
            score,
        });
    }

    let scores: Vec<f64> = per_question.iter().map(|q| q.score).collect();
    Ok(AssessmentResult {
        score: mean(&scores),
        kind,
        per_question,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_and_whitespace() {
        assert!(answers_match("  paris ", "Paris"));
        assert!(answers_match("LONDON", "london"));
        assert!(!answers_match("Pariss", "Paris"));
        assert!(!answers_match("", "Paris"));
    }

    #[test]
    fn two_of_three_displays_as_67() {
        let given = ["Paris", "Paris", "london"];
        let correct = ["Paris", "Berlin", "London"];
        let scores: Vec<f64> = given
            .iter()
            .zip(correct)
            .map(|(g, c)| score_multiple_choice(g, c))
            .collect();
        let overall = mean(&scores);
        assert!((overall - 66.666).abs() < 0.01);
        assert_eq!(display_percent(overall), 67);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn api_scores_are_bounded() {
        assert_eq!(bounded_score(130.0).unwrap(), 100.0);
        assert_eq!(bounded_score(-5.0).unwrap(), 0.0);
        assert_eq!(bounded_score(72.5).unwrap(), 72.5);
        assert!(matches!(
            bounded_score(f64::NAN),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(bounded_score(f64::INFINITY).is_err());
        assert!(bounded_score(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn display_percent_clamps() {
        assert_eq!(display_percent(120.0), 100);
        assert_eq!(display_percent(-3.0), 0);
        assert_eq!(display_percent(49.5), 50);
    }
}

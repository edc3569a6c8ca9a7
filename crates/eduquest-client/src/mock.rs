//! Mock learning API for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use eduquest_core::error::ApiError;
use eduquest_core::model::{CourseDocument, Preferences, Question, UploadReceipt};
use eduquest_core::traits::{LearningApi, ScoreRequest, UploadRequest};

/// A mock learning API for exercising the wizard without a server.
///
/// Answers are matched on question substrings; open-ended scores on the
/// student answer. Any endpoint can be switched to fail.
pub struct MockLearningApi {
    /// Map of question substring → answer.
    answers: HashMap<String, String>,
    /// Answer when no question matches.
    default_answer: String,
    /// Map of student answer → score.
    scores: HashMap<String, f64>,
    default_score: f64,
    questions: Vec<Question>,
    document: CourseDocument,
    notes: String,
    failing: Mutex<Vec<&'static str>>,
    call_count: AtomicU32,
    calls: Mutex<Vec<String>>,
    last_upload: Mutex<Option<UploadRequest>>,
}

impl Default for MockLearningApi {
    fn default() -> Self {
        Self {
            answers: HashMap::new(),
            default_answer: "I could not find that in the material.".to_string(),
            scores: HashMap::new(),
            default_score: 0.0,
            questions: Vec::new(),
            document: CourseDocument::default(),
            notes: "Course notes".to_string(),
            failing: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            last_upload: Mutex::new(None),
        }
    }
}

impl MockLearningApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer questions containing `needle` with `answer`.
    pub fn with_answer(mut self, needle: &str, answer: &str) -> Self {
        self.answers.insert(needle.to_string(), answer.to_string());
        self
    }

    /// Score the open-ended answer `student_answer` with `score`.
    pub fn with_score(mut self, student_answer: &str, score: f64) -> Self {
        self.scores.insert(student_answer.to_string(), score);
        self
    }

    pub fn with_default_score(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }

    pub fn with_document(mut self, content: &str) -> Self {
        self.document = CourseDocument {
            content: Some(content.to_string()),
            notes: None,
        };
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Make calls to `endpoint` (e.g. `"/qa"`) fail with HTTP 500.
    pub fn failing(self, endpoint: &'static str) -> Self {
        self.lock_failing().push(endpoint);
        self
    }

    /// Total number of calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Endpoints called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_upload(&self) -> Option<UploadRequest> {
        self.last_upload
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_failing(&self) -> std::sync::MutexGuard<'_, Vec<&'static str>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, endpoint: &'static str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(endpoint.to_string());
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if self.lock_failing().contains(&endpoint) {
            return Err(ApiError::Http {
                status: 500,
                message: format!("mock failure for {endpoint}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LearningApi for MockLearningApi {
    fn base_url(&self) -> &str {
        "mock://eduquest"
    }

    async fn upload_document(
        &self,
        request: &UploadRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<UploadReceipt> {
        self.record("/documents", cancel)?;
        *self.last_upload.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());
        Ok(UploadReceipt {
            notes: Some(self.notes.clone()),
            message: Some("Document processed successfully".into()),
            chunks_processed: Some(1),
            status: Some("completed".into()),
        })
    }

    async fn latest_document(&self, cancel: &CancellationToken) -> anyhow::Result<CourseDocument> {
        self.record("/documents/latest", cancel)?;
        if self.document.text().is_none() {
            return Err(ApiError::Http {
                status: 404,
                message: "No document found".into(),
            }
            .into());
        }
        Ok(self.document.clone())
    }

    async fn ask(&self, question: &str, cancel: &CancellationToken) -> anyhow::Result<String> {
        self.record("/qa", cancel)?;
        Ok(self
            .answers
            .iter()
            .find(|(needle, _)| question.contains(needle.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| self.default_answer.clone()))
    }

    async fn generate_notes(
        &self,
        _preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<String> {
        self.record("/generate-notes", cancel)?;
        Ok(self.notes.clone())
    }

    async fn generate_assessment(
        &self,
        _preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<Question>> {
        self.record("/generate-assessment", cancel)?;
        Ok(self.questions.clone())
    }

    async fn score_answer(
        &self,
        request: &ScoreRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<f64> {
        self.record("/score-answer", cancel)?;
        Ok(self
            .scores
            .get(&request.student_answer)
            .copied()
            .unwrap_or(self.default_score))
    }
}

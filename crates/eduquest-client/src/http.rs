//! HTTP implementation of the learning API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use eduquest_core::error::ApiError;
use eduquest_core::model::{CourseDocument, Preferences, Question, UploadReceipt};
use eduquest_core::traits::{LearningApi, ScoreRequest, UploadRequest};

/// Learning API reached over HTTP with JSON bodies.
pub struct HttpLearningApi {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpLearningApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a request unless `cancel` fires first.
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> anyhow::Result<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled.into()),
            result = self.execute(request) => result.map_err(Into::into),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
            let message = err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(ApiError::Remote(message));
        }

        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// The `error` field of a JSON error body, or the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[derive(Serialize)]
struct QuestionBody<'a> {
    question: &'a str,
}

#[derive(Serialize)]
struct PreferencesBody<'a> {
    preferences: &'a Preferences,
}

#[derive(Deserialize)]
struct QaResponse {
    answer: String,
    #[serde(default)]
    context: Vec<String>,
}

#[derive(Deserialize)]
struct NotesResponse {
    notes: String,
}

#[derive(Deserialize)]
struct AssessmentResponse {
    assessment: AssessmentPayload,
}

/// Generated assessments arrive either as a bare list or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum AssessmentPayload {
    List(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

impl AssessmentPayload {
    fn into_questions(self) -> Vec<Question> {
        match self {
            AssessmentPayload::List(questions) => questions,
            AssessmentPayload::Wrapped { questions } => questions,
        }
    }
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: ScoreValue,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Number(f64),
    Text(String),
}

impl ScoreValue {
    fn as_f64(&self) -> Result<f64, ApiError> {
        let score = match self {
            ScoreValue::Number(n) => *n,
            ScoreValue::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .parse()
                .map_err(|_| ApiError::InvalidResponse(format!("score is not a number: {s}")))?,
        };
        if !score.is_finite() {
            return Err(ApiError::InvalidResponse(format!(
                "score is not a finite number: {score}"
            )));
        }
        Ok(score)
    }
}

#[async_trait]
impl LearningApi for HttpLearningApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, request, cancel), fields(file = %request.file_name))]
    async fn upload_document(
        &self,
        request: &UploadRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<UploadReceipt> {
        let part = Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)
            .with_context(|| format!("invalid MIME type: {}", request.mime_type))?;
        let mut form = Form::new().part("file", part);
        if let Some(preferences) = &request.preferences {
            form = form.text("preferences", serde_json::to_string(preferences)?);
        }

        debug!(bytes = request.bytes.len(), "POST /documents");
        let req = self.client.post(self.url("/documents")).multipart(form);
        self.call(req, cancel).await
    }

    #[instrument(skip(self, cancel))]
    async fn latest_document(&self, cancel: &CancellationToken) -> anyhow::Result<CourseDocument> {
        let req = self.client.get(self.url("/documents/latest"));
        self.call(req, cancel).await
    }

    #[instrument(skip(self, question, cancel))]
    async fn ask(&self, question: &str, cancel: &CancellationToken) -> anyhow::Result<String> {
        let req = self
            .client
            .post(self.url("/qa"))
            .json(&QuestionBody { question });
        let response: QaResponse = self.call(req, cancel).await?;
        debug!(context_chunks = response.context.len(), "answer received");
        Ok(response.answer)
    }

    #[instrument(skip(self, preferences, cancel))]
    async fn generate_notes(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<String> {
        let req = self
            .client
            .post(self.url("/generate-notes"))
            .json(&PreferencesBody { preferences });
        let response: NotesResponse = self.call(req, cancel).await?;
        Ok(response.notes)
    }

    #[instrument(skip(self, preferences, cancel))]
    async fn generate_assessment(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<Question>> {
        let req = self
            .client
            .post(self.url("/generate-assessment"))
            .json(&PreferencesBody { preferences });
        let response: AssessmentResponse = self.call(req, cancel).await?;
        Ok(response.assessment.into_questions())
    }

    #[instrument(skip(self, request, cancel))]
    async fn score_answer(
        &self,
        request: &ScoreRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<f64> {
        let req = self.client.post(self.url("/score-answer")).json(request);
        let response: ScoreResponse = self.call(req, cancel).await?;
        Ok(response.score.as_f64()?)
    }
}

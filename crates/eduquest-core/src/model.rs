//! Core data model types for eduquest.
//!
//! Everything here is transient: it lives in the state of the running flow or
//! in the session store, and is never persisted durably.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Options offered on the content format checklist.
pub const CONTENT_FORMATS: [&str; 4] = [
    "Detailed comprehensive notes",
    "Concise bullet points",
    "Real-world examples",
    "Step-by-step guides",
];

/// Options offered on the assessment style checklist.
pub const ASSESSMENT_STYLES: [&str; 2] = ["Multiple-choice quizzes", "Open-ended questions"];

/// User-chosen content and assessment style tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Selected entries of [`CONTENT_FORMATS`].
    #[serde(default)]
    pub content_format: Vec<String>,
    /// Selected entries of [`ASSESSMENT_STYLES`].
    #[serde(default)]
    pub assessment_style: Vec<String>,
}

/// A multiple-choice question with a server-supplied correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// An open-ended question scored remotely against a model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenEndedQuestion {
    pub question: String,
    pub model_answer: String,
}

/// A generated assessment question.
///
/// The shape of the JSON decides the variant: `options` + `correctAnswer`
/// means multiple-choice, `modelAnswer` means open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Question {
    MultipleChoice(MultipleChoiceQuestion),
    OpenEnded(OpenEndedQuestion),
}

impl Question {
    /// The question text.
    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.question,
            Question::OpenEnded(q) => &q.question,
        }
    }

    pub fn kind(&self) -> AssessmentKind {
        match self {
            Question::MultipleChoice(_) => AssessmentKind::MultipleChoice,
            Question::OpenEnded(_) => AssessmentKind::OpenEnded,
        }
    }

    /// Question text with the options appended, as shown to the student.
    pub fn prompt(&self) -> String {
        match self {
            Question::MultipleChoice(q) => {
                format!("{}\n\nOptions: {}", q.question, q.options.join(", "))
            }
            Question::OpenEnded(q) => q.question.clone(),
        }
    }
}

/// Which kinds of questions an assessment contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentKind {
    MultipleChoice,
    OpenEnded,
    Mixed,
}

impl AssessmentKind {
    /// Kind of a whole question set. `None` for an empty set.
    pub fn of(questions: &[Question]) -> Option<Self> {
        let mut kinds = questions.iter().map(Question::kind);
        let first = kinds.next()?;
        if kinds.all(|k| k == first) {
            Some(first)
        } else {
            Some(AssessmentKind::Mixed)
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::MultipleChoice => write!(f, "multiple-choice"),
            AssessmentKind::OpenEnded => write!(f, "open-ended"),
            AssessmentKind::Mixed => write!(f, "mixed"),
        }
    }
}

/// Answers keyed by 1-based question index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMap(BTreeMap<usize, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the answer for a 1-based question index.
    pub fn set(&mut self, index: usize, answer: impl Into<String>) {
        self.0.insert(index, answer.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    /// Number of indexes that have been touched, including blank answers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every index in `1..=question_count` has a non-blank answer.
    pub fn is_complete(&self, question_count: usize) -> bool {
        question_count > 0
            && (1..=question_count)
                .all(|i| self.get(i).is_some_and(|a| !a.trim().is_empty()))
    }
}

impl FromIterator<(usize, String)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (usize, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the Q&A log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The most recently uploaded document, as served by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocument {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CourseDocument {
    /// Text to study from: the raw content, falling back to the notes.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .or(self.notes.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// What the upload endpoint reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chunks_processed: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A document accepted by the intake: its text plus the upload receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub text: String,
    pub receipt: UploadReceipt,
}

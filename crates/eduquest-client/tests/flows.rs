//! Wizard flow tests: core components driven through the mock learning API.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use eduquest_client::mock::MockLearningApi;
use eduquest_core::assessment::{AssessmentError, AssessmentRunner, AssessmentState};
use eduquest_core::error::is_cancelled;
use eduquest_core::intake::{DocumentIntake, IntakeConfig, SelectedFile};
use eduquest_core::model::{
    AssessmentKind, Message, MultipleChoiceQuestion, OpenEndedQuestion, Preferences, Question,
};
use eduquest_core::notify::RecordingNotifier;
use eduquest_core::onboarding::request_notes;
use eduquest_core::portal::{Portal, PortalRole, Step};
use eduquest_core::qa::QaPanel;
use eduquest_core::session::SessionStore;

fn prefs() -> Preferences {
    Preferences {
        content_format: vec!["Concise bullet points".into()],
        assessment_style: vec!["Multiple-choice quizzes".into()],
    }
}

fn mc(question: &str, correct: &str) -> Question {
    Question::MultipleChoice(MultipleChoiceQuestion {
        question: question.into(),
        options: vec!["Paris".into(), "Berlin".into(), "London".into()],
        correct_answer: correct.into(),
    })
}

fn open(question: &str, model_answer: &str) -> Question {
    Question::OpenEnded(OpenEndedQuestion {
        question: question.into(),
        model_answer: model_answer.into(),
    })
}

fn text_file() -> SelectedFile {
    SelectedFile {
        name: "biology.txt".into(),
        mime_type: "text/plain".into(),
        bytes: b"Mitochondria produce ATP.".to_vec(),
    }
}

fn fast_intake() -> DocumentIntake {
    DocumentIntake::new(IntakeConfig {
        step_delay: Duration::ZERO,
    })
}

// --- Q&A ---

#[tokio::test]
async fn qa_appends_question_then_answer() {
    let api = MockLearningApi::new().with_answer("ATP", "Energy carrier.");
    let notifier = RecordingNotifier::new();
    let mut panel = QaPanel::new();

    let answer = panel
        .ask("What is ATP?", &api, &notifier, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer.as_deref(), Some("Energy carrier."));
    assert_eq!(
        panel.messages(),
        &[
            Message::user("What is ATP?"),
            Message::assistant("Energy carrier.")
        ]
    );
}

#[tokio::test]
async fn failed_qa_keeps_only_the_user_message() {
    let api = MockLearningApi::new().failing("/qa");
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut panel = QaPanel::new();

    let api_ok = MockLearningApi::new().with_answer("first", "one");
    panel.ask("first", &api_ok, &notifier, &cancel).await.unwrap();

    assert!(panel.ask("second", &api, &notifier, &cancel).await.is_err());
    assert_eq!(
        panel.messages(),
        &[
            Message::user("first"),
            Message::assistant("one"),
            Message::user("second")
        ]
    );
    assert_eq!(notifier.errors(), vec!["Failed to get an answer".to_string()]);
}

#[tokio::test]
async fn blank_question_issues_no_request() {
    let api = MockLearningApi::new();
    let mut panel = QaPanel::new();
    let out = panel
        .ask("   ", &api, &RecordingNotifier::new(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(out.is_none());
    assert!(panel.messages().is_empty());
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn cancelled_qa_is_silent() {
    let api = MockLearningApi::new();
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut panel = QaPanel::new();

    let err = panel.ask("q", &api, &notifier, &cancel).await.unwrap_err();
    assert!(is_cancelled(&err));
    assert!(notifier.errors().is_empty());
    assert_eq!(panel.messages(), &[Message::user("q")]);
}

// --- Document intake ---

#[tokio::test]
async fn upload_forwards_file_and_reports_progress() {
    let api = MockLearningApi::new().with_notes("Summary of mitochondria");
    let notifier = RecordingNotifier::new();
    let mut intake = fast_intake();
    intake.select(text_file(), &notifier).unwrap();

    let doc = intake
        .upload(&api, Some(&prefs()), &notifier, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(doc.text, "Mitochondria produce ATP.");
    assert_eq!(doc.receipt.notes.as_deref(), Some("Summary of mitochondria"));
    let sent = api.last_upload().unwrap();
    assert_eq!(sent.file_name, "biology.txt");
    assert_eq!(sent.preferences, Some(prefs()));
    assert_eq!(notifier.progress_values().last(), Some(&100));
    assert_eq!(
        notifier.successes(),
        vec!["Document processed successfully!".to_string()]
    );
}

#[tokio::test]
async fn rejected_file_issues_no_request() {
    let api = MockLearningApi::new();
    let notifier = RecordingNotifier::new();
    let mut intake = fast_intake();

    let pdf = SelectedFile {
        name: "slides.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: vec![1, 2, 3],
    };
    assert!(intake.select(pdf, &notifier).is_err());
    assert!(intake
        .upload(&api, None, &notifier, &CancellationToken::new())
        .await
        .is_err());

    assert_eq!(api.call_count(), 0);
    assert_eq!(
        notifier.errors(),
        vec![
            "Please upload a .txt file".to_string(),
            "Please select a file first".to_string()
        ]
    );
}

#[tokio::test]
async fn failed_upload_keeps_selection() {
    let api = MockLearningApi::new().failing("/documents");
    let notifier = RecordingNotifier::new();
    let mut intake = fast_intake();
    intake.select(text_file(), &notifier).unwrap();

    assert!(intake
        .upload(&api, None, &notifier, &CancellationToken::new())
        .await
        .is_err());
    assert_eq!(intake.selected().unwrap().name, "biology.txt");
    assert_eq!(notifier.errors(), vec!["Error processing file".to_string()]);
    assert!(!notifier.progress_values().contains(&100));
}

// --- Onboarding notes ---

#[tokio::test(start_paused = true)]
async fn notes_request_reports_completion() {
    let api = MockLearningApi::new().with_notes("Bullet notes");
    let notifier = RecordingNotifier::new();
    let notes = request_notes(
        &api,
        &prefs(),
        Duration::from_millis(500),
        &notifier,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(notes, "Bullet notes");
    assert_eq!(notifier.progress_values().last(), Some(&100));
    assert_eq!(
        notifier.successes(),
        vec!["Course notes generated successfully!".to_string()]
    );
}

#[tokio::test]
async fn failed_notes_request_notifies() {
    let api = MockLearningApi::new().failing("/generate-notes");
    let notifier = RecordingNotifier::new();
    assert!(request_notes(
        &api,
        &prefs(),
        Duration::from_millis(500),
        &notifier,
        &CancellationToken::new()
    )
    .await
    .is_err());
    assert_eq!(
        notifier.errors(),
        vec!["Failed to generate course notes".to_string()]
    );
}

// --- Assessment ---

#[tokio::test]
async fn multiple_choice_two_of_three_is_67_percent() {
    let api = MockLearningApi::new().with_questions(vec![
        mc("Capital of France?", "Paris"),
        mc("Capital of Germany?", "Berlin"),
        mc("Capital of England?", "London"),
    ]);
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut runner = AssessmentRunner::new();

    runner.load(&api, &prefs(), &notifier, &cancel).await.unwrap();
    assert_eq!(runner.state(), &AssessmentState::Ready);

    for (i, answer) in ["Paris", "Paris", "london"].iter().enumerate() {
        assert!(!runner.can_submit());
        runner.answer(i + 1, *answer).unwrap();
    }
    assert!(runner.can_submit());

    let result = runner.submit(&api, &notifier, &cancel).await.unwrap();
    assert_eq!(result.kind, AssessmentKind::MultipleChoice);
    assert!((result.score - 66.67).abs() < 0.01);
    assert_eq!(result.display_percent(), 67);
    assert_eq!(result.full_marks(), 2);
    assert!(matches!(runner.state(), AssessmentState::Results(_)));
    assert!(!api.calls().contains(&"/score-answer".to_string()));
}

#[tokio::test]
async fn incomplete_answers_are_refused() {
    let api = MockLearningApi::new().with_questions(vec![mc("Q1", "Paris"), mc("Q2", "Paris")]);
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut runner = AssessmentRunner::new();
    runner.load(&api, &prefs(), &notifier, &cancel).await.unwrap();
    runner.answer(1, "Paris").unwrap();

    let err = runner.submit(&api, &notifier, &cancel).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<AssessmentError>(),
        Some(&AssessmentError::Incomplete { unanswered: 1 })
    );
    assert_eq!(runner.state(), &AssessmentState::Ready);
}

#[tokio::test]
async fn open_ended_scores_are_averaged_sequentially() {
    let api = MockLearningApi::new()
        .with_questions(vec![
            open("Explain osmosis.", "Water moves across a membrane."),
            open("Explain diffusion.", "Particles spread out."),
        ])
        .with_score("water crosses membranes", 80.0)
        .with_score("things spread", 50.0);
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut runner = AssessmentRunner::new();
    runner.load(&api, &prefs(), &notifier, &cancel).await.unwrap();
    runner.answer(1, "water crosses membranes").unwrap();
    runner.answer(2, "things spread").unwrap();

    let result = runner.submit(&api, &notifier, &cancel).await.unwrap();
    assert_eq!(result.kind, AssessmentKind::OpenEnded);
    assert_eq!(result.score, 65.0);
    assert_eq!(
        api.calls()
            .iter()
            .filter(|c| c.as_str() == "/score-answer")
            .count(),
        2
    );
}

#[tokio::test]
async fn non_finite_score_aborts_submission() {
    let api = MockLearningApi::new()
        .with_questions(vec![open("Explain osmosis.", "Water moves.")])
        .with_score("no idea", f64::NAN);
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut runner = AssessmentRunner::new();
    runner.load(&api, &prefs(), &notifier, &cancel).await.unwrap();
    runner.answer(1, "no idea").unwrap();

    let err = runner.submit(&api, &notifier, &cancel).await.unwrap_err();
    assert!(err.to_string().contains("finite"));
    assert_eq!(runner.state(), &AssessmentState::Ready);
}

#[tokio::test]
async fn one_failed_score_aborts_submission() {
    let api = MockLearningApi::new()
        .with_questions(vec![mc("Q1", "Paris"), open("Q2", "model")])
        .failing("/score-answer");
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();
    let mut runner = AssessmentRunner::new();
    runner.load(&api, &prefs(), &notifier, &cancel).await.unwrap();
    runner.answer(1, "Paris").unwrap();
    runner.answer(2, "mine").unwrap();

    assert!(runner.submit(&api, &notifier, &cancel).await.is_err());
    assert_eq!(runner.state(), &AssessmentState::Ready);
    assert_eq!(runner.answers().get(2), Some("mine"));
    assert!(notifier
        .errors()
        .contains(&"Failed to submit assessment".to_string()));
}

#[tokio::test]
async fn empty_or_failed_generation_moves_to_error() {
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();

    let mut runner = AssessmentRunner::new();
    runner
        .load(&MockLearningApi::new(), &prefs(), &notifier, &cancel)
        .await
        .unwrap();
    assert!(matches!(runner.state(), AssessmentState::Error(_)));

    let mut runner = AssessmentRunner::new();
    let failing = MockLearningApi::new().failing("/generate-assessment");
    runner.load(&failing, &prefs(), &notifier, &cancel).await.unwrap();
    assert!(matches!(runner.state(), AssessmentState::Error(m) if m.contains("500")));
}

// --- Whole portal ---

#[tokio::test]
async fn admin_flow_stages_session_for_assessment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut session = SessionStore::open(&path).unwrap();
    let api = MockLearningApi::new().with_answer("ATP", "Energy.");
    let notifier = RecordingNotifier::new();
    let cancel = CancellationToken::new();

    let mut portal = Portal::new(PortalRole::Admin);
    let mut intake = fast_intake();
    intake.select(text_file(), &notifier).unwrap();
    let doc = intake
        .upload(&api, Some(&prefs()), &notifier, &cancel)
        .await
        .unwrap();
    portal.attach_document(doc.text).unwrap();
    portal.set_preferences(prefs()).unwrap();
    portal.enter_qa().unwrap();

    let mut panel = QaPanel::new();
    panel
        .ask("What is ATP?", &api, &notifier, &cancel)
        .await
        .unwrap();

    portal.enter_assessment(&mut session).unwrap();
    assert_eq!(portal.step(), Step::Assessment);

    let staged = SessionStore::open(&path)
        .unwrap()
        .rehydrate()
        .unwrap();
    assert_eq!(staged.document_text, "Mitochondria produce ATP.");
    assert_eq!(staged.preferences, prefs());
}

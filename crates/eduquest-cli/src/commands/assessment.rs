//! The `eduquest assessment` command.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use comfy_table::{Cell, Table};
use tokio::io::AsyncBufRead;

use eduquest_core::assessment::{AssessmentRunner, AssessmentState};
use eduquest_core::model::{AssessmentKind, Preferences, Question};
use eduquest_core::routes::Route;
use eduquest_core::scoring::AssessmentResult;
use eduquest_core::traits::LearningApi;

use super::{heading, landing, Context};
use crate::console::{self, ConsoleNotifier, Prompter};

pub async fn execute(answers: Option<PathBuf>, ctx: &Context) -> Result<()> {
    let staged = match ctx
        .session()
        .and_then(|session| session.rehydrate().map_err(Into::into))
    {
        Ok(staged) => staged,
        Err(e) => {
            eprintln!("No assessment in progress ({e:#}). Redirecting to {}.", Route::Landing);
            landing::execute();
            return Ok(());
        }
    };

    let api = ctx.api()?;
    let mut input = console::stdin(&ctx.cancel);
    let preset = answers.as_deref().map(read_answers).transpose()?;
    run(&staged.preferences, preset, &api, &mut input, ctx).await
}

async fn run<R: AsyncBufRead + Unpin>(
    preferences: &Preferences,
    preset: Option<Vec<String>>,
    api: &dyn LearningApi,
    input: &mut Prompter<R>,
    ctx: &Context,
) -> Result<()> {
    heading("Assessment");
    let notifier = ConsoleNotifier;
    let mut runner = AssessmentRunner::new();

    runner.load(api, preferences, &notifier, &ctx.cancel).await?;
    if let AssessmentState::Error(reason) = runner.state() {
        anyhow::bail!("could not load the assessment: {reason}");
    }

    match preset {
        Some(answers) => {
            print_questions(runner.questions());
            for (i, answer) in answers.into_iter().enumerate() {
                runner.answer(i + 1, answer)?;
            }
        }
        None => {
            let questions = runner.questions().to_vec();
            'questions: for (i, question) in questions.iter().enumerate() {
                println!("\n{}. {}", i + 1, question.prompt());
                loop {
                    match input.line("Your answer: ").await? {
                        Some(answer) if answer.is_empty() => continue,
                        Some(answer) => {
                            runner.answer(i + 1, answer)?;
                            break;
                        }
                        None => break 'questions,
                    }
                }
            }
        }
    }

    let result = runner.submit(api, &notifier, &ctx.cancel).await?;
    print_results(runner.questions(), &result);
    Ok(())
}

/// Answers file: a JSON array of strings in question order.
fn read_answers(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} must be a JSON array of strings", path.display()))
}

fn print_questions(questions: &[Question]) {
    for (i, question) in questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, question.prompt());
    }
}

fn print_results(questions: &[Question], result: &AssessmentResult) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Your answer", "Score"]);
    for entry in &result.per_question {
        let text = questions
            .get(entry.index - 1)
            .map(Question::text)
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(entry.index),
            Cell::new(text),
            Cell::new(entry.kind),
            Cell::new(&entry.answer),
            Cell::new(format!("{:.0}%", entry.score)),
        ]);
    }

    println!("\nAssessment Results\n{table}");
    println!("\nYour Score: {}%", result.display_percent());
    if result.kind != AssessmentKind::MultipleChoice {
        println!("Note: Open-ended questions are scored based on comparison with model answers.");
    }
    println!("\nReturn home: eduquest open {}", Route::Landing);
}

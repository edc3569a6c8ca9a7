//! The Q&A step, shared by both portals.

use anyhow::Result;
use tokio::io::AsyncBufRead;

use eduquest_core::error::is_cancelled;
use eduquest_core::portal::Portal;
use eduquest_core::qa::QaPanel;
use eduquest_core::traits::LearningApi;

use super::Context;
use crate::console::{ConsoleNotifier, Prompter};

/// How the Q&A step was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Input ran out.
    Finished,
    /// The assessment was staged.
    Assessment,
    /// The user stepped back to the portal's entry step.
    Back,
}

/// Answer `questions` if any were given on the command line, otherwise read
/// them from `input` until it runs out.
pub async fn run<R: AsyncBufRead + Unpin>(
    portal: &mut Portal,
    api: &dyn LearningApi,
    questions: &[String],
    assess: bool,
    input: &mut Prompter<R>,
    ctx: &Context,
) -> Result<Exit> {
    let mut panel = QaPanel::new();
    println!("\nAsk questions about the course material.");

    if questions.is_empty() {
        eprintln!("Type a question, /assessment to take the assessment, or /back to go back.");
        while let Some(line) = input.line("> ").await? {
            match line.as_str() {
                "/assessment" => return stage(portal, ctx),
                "/back" => {
                    portal.back()?;
                    return Ok(Exit::Back);
                }
                question => ask(&mut panel, question, api, ctx).await?,
            }
        }
    } else {
        for question in questions {
            ask(&mut panel, question, api, ctx).await?;
        }
    }

    if assess {
        stage(portal, ctx)
    } else {
        Ok(Exit::Finished)
    }
}

async fn ask(
    panel: &mut QaPanel,
    question: &str,
    api: &dyn LearningApi,
    ctx: &Context,
) -> Result<()> {
    match panel.ask(question, api, &ConsoleNotifier, &ctx.cancel).await {
        Ok(Some(answer)) => println!("\nQ: {question}\nA: {answer}"),
        Ok(None) => {}
        Err(e) if is_cancelled(&e) => return Err(e),
        // Already reported; the next question may still succeed.
        Err(_) => {}
    }
    Ok(())
}

fn stage(portal: &mut Portal, ctx: &Context) -> Result<Exit> {
    let mut session = ctx.session()?;
    portal.enter_assessment(&mut session)?;
    println!(
        "\nAssessment ready. Run `eduquest assessment` to begin (session {}).",
        session.id()
    );
    Ok(Exit::Assessment)
}

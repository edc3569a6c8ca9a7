//! The `eduquest student` command.

use anyhow::Result;
use clap::Args;
use tokio::io::AsyncBufRead;

use eduquest_core::error::ApiError;
use eduquest_core::model::{CourseDocument, ASSESSMENT_STYLES, CONTENT_FORMATS};
use eduquest_core::notify::Notifier;
use eduquest_core::onboarding::{request_notes, PreferenceCollector};
use eduquest_core::portal::{Portal, PortalRole};
use eduquest_core::traits::LearningApi;

use super::study::{self, Exit};
use super::{heading, Context};
use crate::console::{self, ConsoleNotifier, Prompter};

/// Shown when the API has no document to study.
pub const NO_DOCUMENT: &str = "No course material is available yet";

#[derive(Debug, Default, Args)]
pub struct StudentArgs {
    /// Preferred content format (repeatable; prompted for when no preference flag is given)
    #[arg(long = "content-format")]
    pub content_format: Vec<String>,

    /// Preferred assessment style (repeatable)
    #[arg(long = "assessment-style")]
    pub assessment_style: Vec<String>,

    /// Question to ask about the course material (repeatable)
    #[arg(long)]
    pub ask: Vec<String>,

    /// Stage the assessment after the Q&A step
    #[arg(long)]
    pub assess: bool,
}

pub async fn execute(args: StudentArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let mut input = console::stdin(&ctx.cancel);
    run(args, &api, &mut input, ctx).await
}

async fn run<R: AsyncBufRead + Unpin>(
    args: StudentArgs,
    api: &dyn LearningApi,
    input: &mut Prompter<R>,
    ctx: &Context,
) -> Result<()> {
    heading("Student Portal: Learning Preferences");
    let notifier = ConsoleNotifier;

    let mut collector = PreferenceCollector::new();
    if args.content_format.is_empty() && args.assessment_style.is_empty() {
        choose(&mut collector, input).await?;
    } else {
        for label in &args.content_format {
            collector.toggle_content_format(label)?;
        }
        for label in &args.assessment_style {
            collector.toggle_assessment_style(label)?;
        }
    }
    let preferences = collector.complete(&notifier)?;

    let mut portal = Portal::new(PortalRole::Student);
    portal.set_preferences(preferences.clone())?;

    let notes = request_notes(
        api,
        &preferences,
        ctx.config.notes_tick(),
        &notifier,
        &ctx.cancel,
    )
    .await?;
    println!("\nCourse notes:\n{notes}");

    loop {
        let document = match api.latest_document(&ctx.cancel).await {
            Ok(document) => document,
            Err(e) if e.downcast_ref::<ApiError>().and_then(ApiError::status) == Some(404) => {
                CourseDocument::default()
            }
            Err(e) => return Err(e),
        };
        let Some(text) = document.text() else {
            notifier.error(NO_DOCUMENT);
            anyhow::bail!("{NO_DOCUMENT}; an admin must upload a document first");
        };
        portal.attach_document(text)?;
        portal.enter_qa()?;

        match study::run(&mut portal, api, &args.ask, args.assess, input, ctx).await? {
            Exit::Back => println!("\nReloading the course material."),
            Exit::Finished | Exit::Assessment => return Ok(()),
        }
    }
}

/// Interactive checklists: numbered options, comma-separated picks.
async fn choose<R: AsyncBufRead + Unpin>(
    collector: &mut PreferenceCollector,
    input: &mut Prompter<R>,
) -> Result<()> {
    println!("\nHow do you like to learn?");
    for (i, label) in CONTENT_FORMATS.iter().enumerate() {
        println!("  {}. {label}", i + 1);
    }
    if let Some(line) = input.line("Content formats (e.g. 1,3): ").await? {
        for label in picks(&line, &CONTENT_FORMATS) {
            collector.toggle_content_format(label)?;
        }
    }

    println!("\nHow would you like to be assessed?");
    for (i, label) in ASSESSMENT_STYLES.iter().enumerate() {
        println!("  {}. {label}", i + 1);
    }
    if let Some(line) = input.line("Assessment styles (e.g. 1): ").await? {
        for label in picks(&line, &ASSESSMENT_STYLES) {
            collector.toggle_assessment_style(label)?;
        }
    }
    Ok(())
}

/// Map 1-based picks like `"1, 3"` to option labels. Unknown or repeated
/// numbers are ignored.
fn picks<'a>(line: &str, options: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::new();
    for part in line.split(',') {
        let picked = part
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i).copied());
        if let Some(label) = picked {
            if !out.contains(&label) {
                out.push(label);
            }
        }
    }
    out
}

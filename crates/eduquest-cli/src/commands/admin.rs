//! The `eduquest admin` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tokio::io::AsyncBufRead;

use eduquest_core::intake::{DocumentIntake, IntakeConfig, SelectedFile};
use eduquest_core::model::Preferences;
use eduquest_core::onboarding::PreferenceCollector;
use eduquest_core::portal::{Portal, PortalRole};
use eduquest_core::traits::LearningApi;

use super::study::{self, Exit};
use super::{heading, Context};
use crate::console::{self, ConsoleNotifier, Prompter};

#[derive(Debug, Default, Args)]
pub struct AdminArgs {
    /// Plain-text course document to upload (prompted for when omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Declared MIME type of the file (derived from its extension by default)
    #[arg(long)]
    pub mime: Option<String>,

    /// Content format to send with the upload (repeatable)
    #[arg(long = "content-format")]
    pub content_format: Vec<String>,

    /// Assessment style to send with the upload (repeatable)
    #[arg(long = "assessment-style")]
    pub assessment_style: Vec<String>,

    /// Question to ask once the document is processed (repeatable)
    #[arg(long)]
    pub ask: Vec<String>,

    /// Stage the assessment after the Q&A step
    #[arg(long)]
    pub assess: bool,
}

pub async fn execute(args: AdminArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let mut input = console::stdin(&ctx.cancel);
    run(args, &api, &mut input, ctx).await
}

async fn run<R: AsyncBufRead + Unpin>(
    args: AdminArgs,
    api: &dyn LearningApi,
    input: &mut Prompter<R>,
    ctx: &Context,
) -> Result<()> {
    heading("Admin Portal: Upload Course Content");

    let preferences = upload_preferences(&args)?;
    let mut portal = Portal::new(PortalRole::Admin);
    let mut intake = DocumentIntake::new(IntakeConfig {
        step_delay: ctx.config.progress_step(),
    });

    let mut path = args.file.clone();
    loop {
        upload(
            &mut portal,
            &mut intake,
            path.as_deref(),
            &args,
            preferences.as_ref(),
            api,
            input,
            ctx,
        )
        .await?;

        let Some(prefs) = &preferences else {
            println!("\nThe document is available to students.");
            return Ok(());
        };
        if portal.preferences().is_none() {
            portal.set_preferences(prefs.clone())?;
        }
        portal.enter_qa()?;

        match study::run(&mut portal, api, &args.ask, args.assess, input, ctx).await? {
            Exit::Back => {
                println!("\nUpload a replacement document.");
                path = None;
            }
            Exit::Finished | Exit::Assessment => return Ok(()),
        }
    }
}

/// Preferences given on the command line, if any.
fn upload_preferences(args: &AdminArgs) -> Result<Option<Preferences>> {
    if args.content_format.is_empty() && args.assessment_style.is_empty() {
        return Ok(None);
    }
    let mut collector = PreferenceCollector::new();
    for label in &args.content_format {
        collector.toggle_content_format(label)?;
    }
    for label in &args.assessment_style {
        collector.toggle_assessment_style(label)?;
    }
    Ok(Some(collector.complete(&ConsoleNotifier)?))
}

#[allow(clippy::too_many_arguments)]
async fn upload<R: AsyncBufRead + Unpin>(
    portal: &mut Portal,
    intake: &mut DocumentIntake,
    path: Option<&Path>,
    args: &AdminArgs,
    preferences: Option<&Preferences>,
    api: &dyn LearningApi,
    input: &mut Prompter<R>,
    ctx: &Context,
) -> Result<()> {
    let notifier = ConsoleNotifier;
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => input
            .line("Path to a .txt file: ")
            .await?
            .filter(|l| !l.is_empty())
            .map(PathBuf::from),
    };

    if let Some(path) = path {
        let file = SelectedFile::from_path(&path, args.mime.as_deref())?;
        intake.select(file, &notifier)?;
    }

    let document = intake
        .upload(api, preferences, &notifier, &ctx.cancel)
        .await?;
    if let Some(message) = &document.receipt.message {
        println!("{message}");
    }
    if let Some(chunks) = document.receipt.chunks_processed {
        println!("Chunks processed: {chunks}");
    }
    if let Some(notes) = &document.receipt.notes {
        println!("\nCourse notes:\n{notes}");
    }
    portal.attach_document(document.text)?;
    Ok(())
}

//! eduquest CLI — terminal front end for the EduQuest learning platform.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use eduquest_core::error::is_cancelled;

mod commands;
mod console;

use commands::admin::AdminArgs;
use commands::student::StudentArgs;
use commands::Context;

#[derive(Parser)]
#[command(
    name = "eduquest",
    version,
    about = "Upload course material, study it, and take assessments"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides the config file and EDUQUEST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file path
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a route (/, /admin, /student, /assessment) or a landing choice number
    Open {
        /// Route path or landing choice number
        route: String,
    },

    /// Admin portal: upload a course document
    Admin(AdminArgs),

    /// Student portal: onboarding, Q&A and assessment staging
    Student(StudentArgs),

    /// Take the staged assessment
    Assessment {
        /// JSON array of answers, in question order
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// End the current learning session
    Reset,

    /// Create a starter eduquest.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eduquest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = match cli.command {
        None => {
            commands::landing::execute();
            Ok(())
        }
        Some(Commands::Init) => commands::init::execute(),
        Some(command) => {
            match Context::load(cli.config.as_deref(), cli.api_url, cli.session, cancel) {
                Ok(ctx) => run(command, &ctx).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        if is_cancelled(&e) {
            eprintln!("Cancelled.");
            process::exit(130);
        }
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Open { route } => commands::landing::open(&route, ctx).await,
        Commands::Admin(args) => commands::admin::execute(args, ctx).await,
        Commands::Student(args) => commands::student::execute(args, ctx).await,
        Commands::Assessment { answers } => commands::assessment::execute(answers, ctx).await,
        Commands::Reset => commands::reset::execute(ctx),
        Commands::Init => commands::init::execute(),
    }
}

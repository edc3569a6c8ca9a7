//! Terminal notifications and line input.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

use eduquest_core::error::ApiError;
use eduquest_core::notify::Notifier;

/// Prints notifications to stderr, keeping stdout for screen content.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        eprintln!("  OK: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("  ERROR: {message}");
    }

    fn progress(&self, percent: u8, status: &str) {
        eprintln!("  [{percent:>3}%] {status}");
    }
}

/// Reads user input one line at a time.
pub struct Prompter<R> {
    lines: Lines<R>,
    cancel: CancellationToken,
}

/// A prompter over the process's standard input.
pub fn stdin(cancel: &CancellationToken) -> Prompter<BufReader<Stdin>> {
    Prompter::new(BufReader::new(tokio::io::stdin()), cancel.clone())
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R, cancel: CancellationToken) -> Self {
        Self {
            lines: reader.lines(),
            cancel,
        }
    }

    /// Show `prompt` and read the next line, trimmed. `None` at end of input.
    pub async fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        if !prompt.is_empty() {
            eprint!("{prompt}");
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ApiError::Cancelled.into()),
            line = self.lines.next_line() => Ok(line?.map(|l| l.trim().to_string())),
        }
    }
}

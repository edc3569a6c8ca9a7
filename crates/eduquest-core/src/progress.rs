//! Cosmetic progress reporting.
//!
//! Neither helper measures anything: one replays a fixed list of steps on a
//! timer, the other ticks a percentage upward while some work is pending.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::notify::Notifier;

/// Percentage added per ticker interval.
pub const TICK_STEP: u8 = 5;
/// The ticker never goes past this until the work completes.
pub const TICK_CAP: u8 = 90;

/// One step of a scripted progress sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub percent: u8,
    pub status: &'static str,
}

/// Replay `steps`, waiting `delay` before each one. Stops early on cancel.
pub async fn play_steps(
    steps: &[ProgressStep],
    delay: Duration,
    notifier: &dyn Notifier,
    cancel: &CancellationToken,
) {
    for step in steps {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => notifier.progress(step.percent, step.status),
        }
    }
}

/// Drive `work` to completion while a synthetic ticker reports progress.
///
/// The ticker adds [`TICK_STEP`] every `tick` and stops at [`TICK_CAP`]; the
/// caller reports 100% itself once it knows the work succeeded.
pub async fn with_ticker<F, T>(work: F, tick: Duration, status: &str, notifier: &dyn Notifier) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    let mut interval = tokio::time::interval(tick);
    // First tick fires immediately.
    interval.tick().await;

    let mut percent = 0u8;
    loop {
        tokio::select! {
            out = &mut work => return out,
            _ = interval.tick(), if percent < TICK_CAP => {
                percent = percent.saturating_add(TICK_STEP).min(TICK_CAP);
                notifier.progress(percent, status);
            }
        }
    }
}

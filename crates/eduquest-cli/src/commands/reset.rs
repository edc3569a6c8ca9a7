//! The `eduquest reset` command.

use anyhow::Result;
use eduquest_core::session::SessionStore;
use tracing::warn;

use super::Context;

/// End the learning session: staged document and preferences are dropped.
/// A session file that no longer parses is removed as well.
pub fn execute(ctx: &Context) -> Result<()> {
    match ctx.session() {
        Ok(mut session) => {
            let id = session.id();
            session.clear()?;
            println!("Session {id} cleared.");
        }
        Err(e) => {
            warn!("discarding unreadable session: {e:#}");
            SessionStore::discard(&ctx.session_path)?;
            println!("Removed unreadable session {}.", ctx.session_path.display());
        }
    }
    Ok(())
}

//! The landing screen and the `eduquest open` command.

use anyhow::Result;

use eduquest_core::portal::PortalRole;
use eduquest_core::routes::{navigate, Route, LANDING_CHOICES, LANDING_TITLE};

use super::admin::{self, AdminArgs};
use super::student::{self, StudentArgs};
use super::{assessment, heading, Context};

/// Show the landing screen.
pub fn execute() {
    heading(LANDING_TITLE);
    for (i, choice) in LANDING_CHOICES.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, choice.title);
        println!("   {}", choice.blurb);
        println!("   {}: eduquest open {}", choice.action, choice.route);
    }
    println!("\nOr pick by number: eduquest open <1-{}>", LANDING_CHOICES.len());
}

/// Resolve the `open` target: a route path, or a landing choice number as
/// printed by [`execute`].
fn resolve(target: &str) -> Result<Route> {
    let target = target.trim();
    if let Ok(number) = target.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(navigate)
            .ok_or_else(|| anyhow::anyhow!("no landing choice {number}"));
    }
    target.parse().map_err(anyhow::Error::msg)
}

/// Dispatch a route to its screen. Portals opened this way prompt for
/// everything on stdin.
pub async fn open(target: &str, ctx: &Context) -> Result<()> {
    let route = resolve(target)?;
    match PortalRole::for_route(route) {
        Some(PortalRole::Admin) => admin::execute(AdminArgs::default(), ctx).await,
        Some(PortalRole::Student) => student::execute(StudentArgs::default(), ctx).await,
        None if route == Route::Assessment => assessment::execute(None, ctx).await,
        None => {
            execute();
            Ok(())
        }
    }
}

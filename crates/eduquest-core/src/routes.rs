//! Routes and the landing screen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Landing,
    Admin,
    Student,
    Assessment,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Admin => "/admin",
            Route::Student => "/student",
            Route::Assessment => "/assessment",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "/" | "" => Ok(Route::Landing),
            "/admin" => Ok(Route::Admin),
            "/student" => Ok(Route::Student),
            "/assessment" => Ok(Route::Assessment),
            other => Err(format!("unknown route: {other}")),
        }
    }
}

/// One button on the landing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingChoice {
    pub title: &'static str,
    pub blurb: &'static str,
    pub action: &'static str,
    pub route: Route,
}

pub const LANDING_TITLE: &str = "EduQuest Platform";

/// The two portals offered on `/`.
pub const LANDING_CHOICES: [LandingChoice; 2] = [
    LandingChoice {
        title: "Admin Portal",
        blurb: "Upload and manage course content for students.",
        action: "Enter Admin Portal",
        route: Route::Admin,
    },
    LandingChoice {
        title: "Student Portal",
        blurb: "Start your personalized learning journey.",
        action: "Enter Student Portal",
        route: Route::Student,
    },
];

/// Resolve a landing button press (0-based) to its route.
pub fn navigate(choice: usize) -> Option<Route> {
    LANDING_CHOICES.get(choice).map(|c| c.route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_back() {
        for route in [
            Route::Landing,
            Route::Admin,
            Route::Student,
            Route::Assessment,
        ] {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
        assert!("/admin/42".parse::<Route>().is_err());
        assert!("/qa".parse::<Route>().is_err());
    }

    #[test]
    fn landing_buttons_dispatch() {
        assert_eq!(navigate(0), Some(Route::Admin));
        assert_eq!(navigate(1), Some(Route::Student));
        assert_eq!(navigate(2), None);
    }
}

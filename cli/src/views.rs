//! Text views for the session shell.
//!
//! `View::for_session` is the routing guard: nothing is shown while the
//! session is uninitialized or a verification is in flight, the dashboard
//! only for an authenticated user, and the login prompt otherwise.

use session::{Session, SessionPhase, User};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Login,
    Dashboard(&'a User),
}

impl<'a> View<'a> {
    /// Pick the view for `session`, or `None` while it is not settled.
    #[must_use]
    pub fn for_session(session: &'a Session) -> Option<Self> {
        if session.loading || session.phase == SessionPhase::Uninitialized {
            return None;
        }
        match (session.is_authenticated, session.user.as_ref()) {
            (true, Some(user)) => Some(Self::Dashboard(user)),
            _ => Some(Self::Login),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Login => render_login(),
            Self::Dashboard(user) => render_dashboard(user),
        }
    }
}

fn render_login() -> String {
    [
        "Sign in",
        "=======",
        "You are not signed in.",
        "",
        "  dashboard login --username <name> --password <password>",
        "  dashboard register --username <name> --email <email> --password <password>",
    ]
    .join("\n")
}

fn render_dashboard(user: &User) -> String {
    [
        "Dashboard".to_owned(),
        "=========".to_owned(),
        format!("Welcome, {}!", user.username),
        "This is your dashboard. Here you can add your visualizations and data displays.".to_owned(),
        String::new(),
        "Sample Visualization".to_owned(),
        "--------------------".to_owned(),
        "  Add your visualization component here".to_owned(),
        String::new(),
        "User Information".to_owned(),
        "----------------".to_owned(),
        format!("  Username: {}", user.username),
        format!("  Email: {}", user.email),
        String::new(),
        "Run `dashboard logout` to sign out.".to_owned(),
    ]
    .join("\n")
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;

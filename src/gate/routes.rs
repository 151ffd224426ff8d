use std::fmt;

use super::{Decision, decide};
use crate::session::{Role, SessionModel};

/// The portal's pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Logout,
    ConfigureQuestions { page: u32 },
    SetAnswers,
    ResetWithQuestions { username: Option<String> },
}

impl Route {
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::ConfigureQuestions { .. } => Some(Role::Admin),
            Route::SetAnswers => Some(Role::User),
            Route::Home | Route::Login | Route::Logout | Route::ResetWithQuestions { .. } => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Logout => "/logout".to_string(),
            Route::ConfigureQuestions { page } => format!("/configure-questions/{}", page),
            Route::SetAnswers => "/set-answers".to_string(),
            Route::ResetWithQuestions { username: None } => "/reset-with-questions".to_string(),
            Route::ResetWithQuestions {
                username: Some(user),
            } => format!("/reset-with-questions/{}", user),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let mut segments = trimmed.split('/').skip(1);
        let first = segments.next().unwrap_or("");
        let second = segments.next();
        if segments.next().is_some() {
            return None;
        }

        match (first, second) {
            ("", None) => Some(Route::Home),
            ("login", None) => Some(Route::Login),
            ("logout", None) => Some(Route::Logout),
            ("configure-questions", None) => Some(Route::ConfigureQuestions { page: 1 }),
            ("configure-questions", Some(page)) => page
                .parse::<u32>()
                .ok()
                .filter(|p| *p > 0)
                .map(|page| Route::ConfigureQuestions { page }),
            ("set-answers", None) => Some(Route::SetAnswers),
            ("reset-with-questions", user) => Some(Route::ResetWithQuestions {
                username: user.filter(|u| !u.is_empty()).map(str::to_string),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Guards every protected route through the same decision function.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionModel,
}

impl RouteGuard {
    pub fn new(session: SessionModel) -> Self {
        Self { session }
    }

    pub fn check(&self, route: &Route) -> Decision {
        let decision = decide(&self.session.state(), route.required_role(), &route.path());
        if !decision.is_allowed() {
            tracing::debug!(route = %route, ?decision, "navigation redirected");
        }
        decision
    }
}

//! Authorization decisions for navigation.

use crate::session::{Role, SessionState};

mod routes;
pub use self::routes::{Route, RouteGuard};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Not logged in; `return_path` is where login should send the user back to.
    RedirectToLogin { return_path: String },
    /// Logged in with the wrong role.
    RedirectToHome { warning: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn role_warning(required: Role) -> String {
    format!("You must be {} to access that page", required.description())
}

/// Pure decision over the session, the route's required role and the path
/// being visited. Rules apply in order: public route, inactive session,
/// wrong role, allow.
pub fn decide(state: &SessionState, required: Option<Role>, current_path: &str) -> Decision {
    let Some(required) = required else {
        return Decision::Allow;
    };
    let Some(session) = state.session() else {
        return Decision::RedirectToLogin {
            return_path: current_path.to_string(),
        };
    };
    if !session.is_role(required) {
        return Decision::RedirectToHome {
            warning: role_warning(required),
        };
    }
    Decision::Allow
}

#[cfg(test)]
#[path = "tests/gate_tests.rs"]
mod tests;

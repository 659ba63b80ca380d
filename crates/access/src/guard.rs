//! Route guard decisions for protected UI surfaces.

use serde::Serialize;

use velithra_auth::roles::roles_overlap;
use velithra_auth::{Role, SessionState};

use crate::resolver::AccessResolver;

pub const LOGIN_ROUTE: &str = "/login";
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// What a protected surface should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GuardDecision {
    /// Session not hydrated yet: render a loading state, decide later.
    Loading,
    Allow,
    RedirectToLogin,
    /// Signed in but not permitted; send the user to `redirect`.
    Forbidden { redirect: String },
}

impl GuardDecision {
    /// Route to navigate to instead of rendering, if any.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            GuardDecision::RedirectToLogin => Some(LOGIN_ROUTE),
            GuardDecision::Forbidden { redirect } => Some(redirect),
            GuardDecision::Loading | GuardDecision::Allow => None,
        }
    }
}

impl AccessResolver {
    /// Decide access to `route`.
    ///
    /// `allowed_roles` narrows the surface further (any-of); `None` means any
    /// signed-in user whose role prefixes cover the route.
    pub fn guard(&self, route: &str, allowed_roles: Option<&[Role]>) -> GuardDecision {
        let session = match self.session().state() {
            SessionState::Unknown => return GuardDecision::Loading,
            SessionState::Unauthenticated => return GuardDecision::RedirectToLogin,
            SessionState::Authenticated(session) => session,
        };

        let role_ok = allowed_roles.is_none_or(|allowed| roles_overlap(&session.roles, allowed));
        if role_ok && self.can_access_route(route) {
            return GuardDecision::Allow;
        }

        tracing::debug!(route, user = %session.user_name, "route guard denied");
        let redirect = self
            .landing_route()
            .filter(|landing| landing != route)
            .unwrap_or_else(|| UNAUTHORIZED_ROUTE.to_string());
        GuardDecision::Forbidden { redirect }
    }
}

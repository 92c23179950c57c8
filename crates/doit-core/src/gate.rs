//! Access-control decision for protected views.
//!
//! The decision is a pure function over the session status; the navigation
//! side effect is delegated to a [`Navigator`] collaborator.

use crate::session::SessionStatus;

/// Path the gate redirects unauthenticated visitors to.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of gating a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Probe not resolved yet: render nothing conclusive and do not redirect.
    Wait,
    /// No active session: navigate to the contained path.
    Redirect(&'static str),
    /// Active session: render the protected subtree.
    Allow,
}

/// Decides what the presentation layer may render for `status`.
///
/// `Unknown` yields `Wait` rather than `Redirect` so an unresolved probe
/// never causes a flash-redirect to the login page.
pub fn decide(status: SessionStatus) -> GateDecision {
    match status {
        SessionStatus::Unknown => GateDecision::Wait,
        SessionStatus::Unauthenticated => GateDecision::Redirect(LOGIN_PATH),
        SessionStatus::Authenticated => GateDecision::Allow,
    }
}

/// Navigation side effect, performed outside the gate.
pub trait Navigator {
    fn navigate(&self, path: &str);
}

//! Session state resolved from the backend status probe.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::api::ApiClient;
use crate::observe::Subscribers;

/// Tri-state session signal.
///
/// Starts `Unknown`; one probe cycle moves it to exactly one of the two
/// resolved states. Only an explicit [`SessionStore::reset`] returns it to
/// `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Unknown => "unknown",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide holder of the current session status.
///
/// Cheap to clone; clones share the same status cell and subscriber list.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    status: Arc<Mutex<SessionStatus>>,
    subscribers: Arc<Subscribers<SessionStatus>>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            status: Arc::new(Mutex::new(SessionStatus::Unknown)),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Runs the one-shot status probe and resolves the session state.
    ///
    /// Any transport or protocol error resolves to `Unauthenticated`: a
    /// failed probe must never read as an active session.
    ///
    /// Call once per application lifetime; re-invocation is undefined.
    pub async fn initialize(&self) {
        let next = match self.api.session_status().await {
            Ok(true) => SessionStatus::Authenticated,
            Ok(false) => SessionStatus::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "session probe failed, treating session as unauthenticated");
                SessionStatus::Unauthenticated
            }
        };
        self.transition(next);
    }

    /// Current status; never blocks on the probe.
    pub fn status(&self) -> SessionStatus {
        *self.status.lock().expect("session status lock poisoned")
    }

    /// Explicitly clears the resolved state (e.g., after logout). The next
    /// probe cycle starts from `Unknown` again.
    pub fn reset(&self) {
        self.transition(SessionStatus::Unknown);
    }

    /// Registers a callback invoked synchronously with the new status after
    /// every status change.
    pub fn subscribe(&self, callback: impl Fn(&SessionStatus) + Send + Sync + 'static) {
        self.subscribers.subscribe(callback);
    }

    fn transition(&self, next: SessionStatus) {
        {
            let mut status = self.status.lock().expect("session status lock poisoned");
            if *status == next {
                return;
            }
            *status = next;
        }
        // Lock released before callbacks run, so subscribers may read back.
        self.subscribers.notify(&next);
    }
}

//! Command handlers and shared gating helpers.

use anyhow::{Result, bail};
use doit_core::api::{ApiClient, ApiConfig};
use doit_core::config::Config;
use doit_core::gate::{self, GateDecision, Navigator};
use doit_core::session::SessionStore;

pub mod config;
pub mod session;
pub mod tasks;
pub mod twofactor;

/// Builds the API client from config file plus environment.
pub(crate) fn api_client() -> Result<ApiClient> {
    let config = Config::load()?;
    let api_config = ApiConfig::from_env(config.backend.base_url.as_deref())?;
    ApiClient::new(api_config)
}

/// Terminal stand-in for the browser's navigation: points the operator at
/// the path the gate chose.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, path: &str) {
        eprintln!("No active session. Sign in at {path} first.");
    }
}

/// Probes the session and applies the route gate before a protected command.
pub(crate) async fn ensure_session(api: &ApiClient) -> Result<()> {
    let session = SessionStore::new(api.clone());
    session.initialize().await;
    match gate::decide(session.status()) {
        GateDecision::Allow => Ok(()),
        GateDecision::Redirect(path) => {
            CliNavigator.navigate(path);
            bail!("not authenticated")
        }
        // The probe has settled by the time we decide.
        GateDecision::Wait => bail!("session status unresolved"),
    }
}

//! Session status command.

use anyhow::Result;
use doit_core::session::SessionStore;

use super::api_client;

pub async fn status() -> Result<()> {
    let api = api_client()?;
    let session = SessionStore::new(api);
    session.initialize().await;
    println!("Session: {}", session.status());
    Ok(())
}

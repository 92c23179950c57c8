//! Two-factor enrollment commands.

use anyhow::{Context, Result};

use super::api_client;

pub async fn setup() -> Result<()> {
    let api = api_client()?;
    let setup = api.setup_two_factor().await.context("fetch 2FA setup")?;
    // Rendering the QR image is the browser's job; print the payload.
    println!("{}", setup.qr_code);
    Ok(())
}

pub async fn verify(token: &str) -> Result<()> {
    let api = api_client()?;
    let result = api
        .verify_two_factor(token)
        .await
        .context("verify 2FA token")?;
    println!("{}", result.message);
    Ok(())
}

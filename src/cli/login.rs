use zeroize::Zeroize;

use super::Console;
use crate::endpoints;
use crate::error::{DeskError, Result};
use crate::session::decode_claim;
use crate::storage::TOKEN_KEY;

pub fn run(email: &str) -> Result<()> {
    let mut console = Console::open()?;
    let mut password = rpassword::prompt_password("Password: ")?;
    let request = endpoints::token(email.trim(), &password);
    password.zeroize();

    let body = match console.fetch(None, &request) {
        Err(DeskError::Api(message)) if message.starts_with("error 401") => {
            tracing::info!(%message, "token request refused");
            return Err(DeskError::Api("Login failed: wrong email or password.".to_string()));
        }
        other => other?,
    };
    drop(request);
    let token = endpoints::read_token(body)?;
    console.storage.set(TOKEN_KEY, &token)?;
    tracing::info!(email = %email, "logged in");

    let level = decode_claim(&token, "level").unwrap_or_else(|| "unknown level".to_string());
    println!("Logged in as {} ({level}).", email.trim());
    Ok(())
}

pub fn reset(email: &str) -> Result<()> {
    let console = Console::open()?;
    console.fetch(None, &endpoints::password_reset(email.trim()))?;
    println!("Password reset requested for {}. Check that inbox for a link.", email.trim());
    Ok(())
}

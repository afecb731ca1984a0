use crate::error::Result;
use crate::settings::storage_path;
use crate::storage::{Storage, TOKEN_KEY};

/// Returns whether a token was actually stored.
pub fn forget_token(storage: &mut Storage) -> Result<bool> {
    Ok(storage.remove(TOKEN_KEY)?.is_some())
}

pub fn run() -> Result<()> {
    let mut storage = Storage::open(&storage_path());
    if forget_token(&mut storage)? {
        tracing::info!("token removed");
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::storage::{Storage, CURRENT_ENTITY_KEY, TOKEN_KEY};

/// Snapshot of the signed-in state, re-read from storage on every navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub current_entity: Option<String>,
}

impl Session {
    /// Returns `None` when no token is stored; callers redirect to login.
    pub fn load(storage: &Storage) -> Option<Self> {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty())?;
        Some(Self {
            token: token.to_string(),
            current_entity: storage
                .get(CURRENT_ENTITY_KEY)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        })
    }

    pub fn level(&self) -> Option<String> {
        decode_claim(&self.token, "level")
    }
}

/// Reads one claim from the token's payload segment without verifying it.
/// The server is the authority; this only picks which menus to show.
pub fn decode_claim(token: &str, property: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    match claims.get(property)? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(claims: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_load_requires_token() {
        let mut storage = Storage::in_memory();
        assert!(Session::load(&storage).is_none());
        storage.set(TOKEN_KEY, "").unwrap();
        assert!(Session::load(&storage).is_none());
        storage.set(TOKEN_KEY, "abc").unwrap();
        let session = Session::load(&storage).unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.current_entity, None);
    }

    #[test]
    fn test_load_reads_current_entity() {
        let mut storage = Storage::in_memory();
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(CURRENT_ENTITY_KEY, "ent-1").unwrap();
        assert_eq!(
            Session::load(&storage).unwrap().current_entity.as_deref(),
            Some("ent-1")
        );
    }

    #[test]
    fn test_decode_level_claim() {
        let token = token_with(r#"{"person_id":"p1","level":"ADMIN","exp":1}"#);
        assert_eq!(decode_claim(&token, "level").as_deref(), Some("ADMIN"));
        assert_eq!(decode_claim(&token, "exp").as_deref(), Some("1"));
        assert_eq!(decode_claim(&token, "missing"), None);
    }

    #[test]
    fn test_decode_garbage_token() {
        assert_eq!(decode_claim("not-a-jwt", "level"), None);
        assert_eq!(decode_claim("a.!!!.c", "level"), None);
    }
}

// src/identity.rs

//! Anonymous user identity.
//!
//! A user id is issued once per store (`user_` + 9 lowercase
//! alphanumerics), kept under `user_id`, and mirrored into a one-year
//! cookie so the server can associate runs with it.

use anyhow::Result;
use uuid::Uuid;

use crate::store::{KeyValueStore, PreferenceStore};

pub const COOKIE_NAME: &str = "user_id";
pub const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

/// Return the stored user id, issuing and persisting a new one if absent.
pub fn ensure_user_id<S: KeyValueStore>(prefs: &PreferenceStore<S>) -> Result<String> {
    if let Some(existing) = prefs.user_id() {
        return Ok(existing);
    }

    let id = new_user_id();
    prefs.set_user_id(&id)?;
    tracing::info!(user_id = %id, "Issued new user id");
    Ok(id)
}

pub fn new_user_id() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("user_{}", &token[..9])
}

/// `user_id=<id>`, as sent in a `Cookie` request header.
pub fn cookie_pair(user_id: &str) -> String {
    format!("{}={}", COOKIE_NAME, user_id)
}

/// Full cookie assignment: `user_id=<id>; path=/; max-age=31536000`.
pub fn identity_cookie(user_id: &str) -> String {
    format!(
        "{}; path=/; max-age={}",
        cookie_pair(user_id),
        COOKIE_MAX_AGE_SECS
    )
}

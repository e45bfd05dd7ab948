// src/session.rs

//! Session-scoped storage for the authenticated principal.
//!
//! Once negotiation succeeds the principal is recorded here *before* user
//! resolution runs, so the host can rely on it even when resolution fails
//! or redirects (e.g. to drive a create-profile flow for a principal with
//! no user record yet). The key names (`authenticatedPrincipal`,
//! `delegatedCredentialsCache`) are the session fields host applications
//! conventionally read.

use std::collections::HashMap;

use crate::engine::DelegatedCredentials;

/// Session key under which the authenticated principal is stored.
pub const AUTHENTICATED_PRINCIPAL: &str = "authenticatedPrincipal";

/// Session key under which the delegated credential-cache name is stored.
pub const DELEGATED_CREDENTIALS_CACHE: &str = "delegatedCredentialsCache";

/// Session-scoped string storage provided by the host.
///
/// The store is expected to serialize mutation per logical session; the
/// strategy performs a single write per successful negotiation.
pub trait Session: Send {
    fn set(&mut self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<&str>;
    fn remove(&mut self, key: &str);
}

/// Record the principal, and the delegation cache name when present, into
/// the session. Runs unconditionally after a successful negotiation,
/// regardless of the later user-resolution outcome.
pub(crate) fn bind_principal(
    session: &mut dyn Session,
    principal: &str,
    delegated: Option<&DelegatedCredentials>,
) {
    log::debug!("binding authenticated principal: {}", principal);
    session.set(AUTHENTICATED_PRINCIPAL, principal.to_owned());

    if let Some(delegated) = delegated {
        log::debug!("binding delegated credential cache: {}", delegated.name());
        session.set(DELEGATED_CREDENTIALS_CACHE, delegated.name().to_owned());
    }
}

/// In-memory [`Session`] backed by a `HashMap`, for hosts without a session
/// middleware and for tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> MemorySession {
        MemorySession::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Session for MemorySession {
    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

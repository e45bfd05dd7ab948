// src/engine.rs

//! Security-context engine capability.
//!
//! The strategy drives one GSSAPI-style acceptor handshake per request
//! through this seam: `init` establishes a server-side context for the
//! configured service principal, `step` consumes the client token, and
//! `clean` disposes the context. The actual cryptography (ticket
//! validation, keytab lookup, S4U2Proxy) lives behind the implementation;
//! the crate never links a Kerberos library itself.
//!
//! The engine is injected into the strategy at construction time so tests
//! can substitute a scripted double.

use std::fmt;

use futures_util::future::BoxFuture;

use crate::error::BoxError;

/// The phase of the negotiation cycle in which an engine call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    Init,
    Step,
    Clean,
}

impl fmt::Display for NegotiationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NegotiationPhase::Init => "init",
            NegotiationPhase::Step => "step",
            NegotiationPhase::Clean => "clean",
        })
    }
}

/// A reference to delegated credentials granted during negotiation.
///
/// Only the credential-cache name is held here; the cache itself belongs to
/// the external engine and outlives the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedCredentials {
    name: String,
}

impl DelegatedCredentials {
    pub fn new(name: impl Into<String>) -> DelegatedCredentials {
        DelegatedCredentials { name: name.into() }
    }

    /// The credential-cache name, e.g. `FILE:/tmp/krb5cc_http_42`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One in-progress server-side negotiation.
///
/// A context is owned exclusively by a single `authenticate` invocation and
/// is never shared across requests. `principal` returns `Some` only once a
/// step has completed successfully.
pub trait SecurityContext: Send {
    /// The authenticated client principal, `name@REALM`.
    fn principal(&self) -> Option<String>;

    /// Delegated credentials granted by the engine, when delegation was
    /// requested at `init` and the client's ticket allows it.
    fn delegated_credentials(&self) -> Option<DelegatedCredentials>;
}

/// External GSSAPI-style acceptor engine.
///
/// Each operation may suspend on the underlying cryptographic engine.
/// `clean` takes the context by value: principal and delegation handle must
/// be captured from the context *before* disposal, because disposal is
/// allowed to wipe context-local state. Ownership makes a post-clean read
/// impossible rather than merely incorrect.
pub trait SecurityContextEngine: Send + Sync {
    type Context: SecurityContext + 'static;

    /// Establish an acceptor context for `spn` (form `service@host`).
    /// `delegate` requests constrained delegation (S4U2Proxy).
    fn init<'a>(
        &'a self,
        spn: &'a str,
        delegate: bool,
    ) -> BoxFuture<'a, Result<Self::Context, BoxError>>;

    /// Consume one client token. On success the context carries the
    /// resolved principal. Single-round completion is assumed; a token that
    /// would require another leg is an error.
    fn step<'a>(
        &'a self,
        ctx: &'a mut Self::Context,
        token: &'a [u8],
    ) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Finalize and dispose the context, releasing engine resources.
    fn clean<'a>(&'a self, ctx: Self::Context) -> BoxFuture<'a, Result<(), BoxError>>;
}

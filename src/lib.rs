// src/lib.rs

//! Server-side HTTP Negotiate (SPNEGO) authentication, RFC 4559.
//!
//! This crate turns an incoming request's `Authorization: Negotiate` header
//! into an authenticated Kerberos principal by driving a single
//! init→step→clean cycle against an injected GSSAPI-style engine, binds the
//! principal (and, with constrained delegation, the delegated
//! credential-cache name) to the session, and applies a configurable policy
//! when authentication succeeds but no application user record exists for
//! the principal.
//!
//! The normal browser flow is request → `401` with
//! `WWW-Authenticate: Negotiate` → re-request with `Authorization:
//! Negotiate <token>` → ok. The missing-header leg is therefore a
//! [`Outcome::Challenge`], not an error.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use negotiate_auth::{AuthenticateOptions, MemorySession, NegotiateStrategyBuilder};
//!
//! let strategy = NegotiateStrategyBuilder::new()
//!     .service_principal_name("HTTP@www.example.com")
//!     .build(engine, Arc::new(user_store))?;
//!
//! let options = AuthenticateOptions::new().no_user_redirect("/manageprofile");
//! let outcome = strategy.authenticate(&request_parts, &mut session, &options).await;
//! match outcome.response() {
//!     Some(response) => send(response),          // challenge, redirect, failure
//!     None => proceed_as(outcome),               // Success { user, .. }
//! }
//! ```
//!
//! The engine capability ([`SecurityContextEngine`]) and the user lookup
//! ([`Verify`]) are the two external seams; the crate implements neither
//! Kerberos cryptography nor user storage.

mod engine;
mod error;
mod outcome;
mod registry;
mod session;
mod strategy;
mod token;
mod verify;

pub use crate::engine::{
    DelegatedCredentials, NegotiationPhase, SecurityContext, SecurityContextEngine,
};
pub use crate::error::{BoxError, Error, Result};
pub use crate::outcome::{challenge, Outcome, ResolvedUser};
pub use crate::registry::{Strategy, StrategyRegistry};
pub use crate::session::{
    MemorySession, Session, AUTHENTICATED_PRINCIPAL, DELEGATED_CREDENTIALS_CACHE,
};
pub use crate::strategy::{AuthenticateOptions, NegotiateStrategy, NegotiateStrategyBuilder};
pub use crate::verify::{Verdict, Verify};

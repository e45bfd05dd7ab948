// src/error.rs

//! Error types for the Negotiate authentication strategy.
//!
//! A single opaque [`Error`] covers every failure class; callers inspect it
//! through the `is_*` predicates and accessors rather than matching on an
//! exposed enum. Construction happens through the `pub(crate)` helpers
//! (`negotiation`, `no_user`, ...) used by the rest of the crate.

use std::error::Error as StdError;
use std::fmt;

use crate::engine::NegotiationPhase;

/// A boxed dynamic error, used at the capability seams (engine, verify).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A `Result` alias where the `Err` case is `negotiate_auth::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// The errors that may occur while authenticating a request.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
    principal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// The security-context engine failed during the given phase.
    Negotiation(NegotiationPhase),
    /// Negotiation succeeded but no application user exists for the principal.
    NoUser,
    /// The verify capability reported an error.
    Resolution,
    /// The strategy or call site is misconfigured.
    Configuration,
}

impl Error {
    fn new(kind: Kind, source: Option<BoxError>) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source,
                principal: None,
            }),
        }
    }

    fn with_principal(mut self, principal: &str) -> Error {
        self.inner.principal = Some(principal.to_owned());
        self
    }

    /// Returns true if the security-context engine failed.
    pub fn is_negotiation(&self) -> bool {
        matches!(self.inner.kind, Kind::Negotiation(_))
    }

    /// The negotiation phase that failed, if this is a negotiation error.
    pub fn negotiation_phase(&self) -> Option<NegotiationPhase> {
        match self.inner.kind {
            Kind::Negotiation(phase) => Some(phase),
            _ => None,
        }
    }

    /// Returns true if authentication succeeded but no application user was
    /// found and no fallback policy applied.
    ///
    /// Host applications can special-case this (for example to offer account
    /// creation) via [`Error::principal`] while still treating the request as
    /// unauthenticated.
    pub fn is_no_user(&self) -> bool {
        matches!(self.inner.kind, Kind::NoUser)
    }

    /// Returns true if the verify capability reported an error.
    pub fn is_resolution(&self) -> bool {
        matches!(self.inner.kind, Kind::Resolution)
    }

    /// Returns true if the strategy or call site was misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::Configuration)
    }

    /// The authenticated principal attached to this error, if any.
    ///
    /// Present on no-user errors, where the negotiation itself succeeded.
    pub fn principal(&self) -> Option<&str> {
        self.inner.principal.as_deref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("negotiate_auth::Error");
        builder.field("kind", &self.inner.kind);
        if let Some(ref principal) = self.inner.principal {
            builder.field("principal", principal);
        }
        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Negotiation(phase) => {
                write!(f, "negotiation failed at operation '{}'", phase)?
            }
            Kind::NoUser => match self.inner.principal {
                Some(ref principal) => {
                    write!(f, "no user object found for principal: {}", principal)?
                }
                None => f.write_str("no user object found for principal")?,
            },
            Kind::Resolution => f.write_str("verify callback reported an error")?,
            Kind::Configuration => f.write_str("strategy configuration error")?,
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {}", source)?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

// constructors

pub(crate) fn negotiation<E: Into<BoxError>>(phase: NegotiationPhase, source: E) -> Error {
    Error::new(Kind::Negotiation(phase), Some(source.into()))
}

pub(crate) fn no_user(principal: &str) -> Error {
    Error::new(Kind::NoUser, None).with_principal(principal)
}

pub(crate) fn resolution<E: Into<BoxError>>(source: E) -> Error {
    Error::new(Kind::Resolution, Some(source.into()))
}

pub(crate) fn configuration(message: &'static str) -> Error {
    Error::new(Kind::Configuration, Some(message.into()))
}

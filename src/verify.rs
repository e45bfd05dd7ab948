// src/verify.rs

//! The verify capability: maps an authenticated principal to an
//! application user record.

use futures_util::future::BoxFuture;
use http::request::Parts;

use crate::error::BoxError;

/// What the verify capability found for a principal.
///
/// `user: None` is not an error; it means negotiation succeeded but the
/// application has no record for this principal, and the no-user policy
/// decides what happens next. `info` is an opaque side channel carried
/// through to a successful outcome.
#[derive(Debug)]
pub struct Verdict<U> {
    pub user: Option<U>,
    pub info: Option<String>,
}

impl<U> Verdict<U> {
    /// A verdict with a resolved user and no extra info.
    pub fn user(user: U) -> Verdict<U> {
        Verdict {
            user: Some(user),
            info: None,
        }
    }

    /// A verdict with no user record for the principal.
    pub fn no_user() -> Verdict<U> {
        Verdict {
            user: None,
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Verdict<U> {
        self.info = Some(info.into());
        self
    }
}

/// External user-resolution capability.
///
/// `request` is `Some` only when the strategy was built with
/// `pass_request_to_verify(true)`.
pub trait Verify<U>: Send + Sync {
    fn verify<'a>(
        &'a self,
        request: Option<&'a Parts>,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<Verdict<U>, BoxError>>;
}

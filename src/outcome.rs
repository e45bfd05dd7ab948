// src/outcome.rs

//! Terminal authentication outcomes and their mapping to HTTP effects.

use http::header::{LOCATION, WWW_AUTHENTICATE};
use http::{Response, StatusCode};

use crate::error::Error;

/// The user bound to a successful outcome.
///
/// `Placeholder` marks the configured empty-user object substituted under
/// the `no_user_ok` policy, as an explicit tag rather than a sentinel value
/// the host would have to compare by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedUser<U> {
    /// A user record resolved by the verify capability.
    Known(U),
    /// The configured empty-user object; no record exists for the principal.
    Placeholder(U),
}

impl<U> ResolvedUser<U> {
    /// The user value, whichever way it was resolved.
    pub fn into_user(self) -> U {
        match self {
            ResolvedUser::Known(user) | ResolvedUser::Placeholder(user) => user,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResolvedUser::Placeholder(_))
    }
}

/// The terminal result of one authentication attempt.
///
/// Exactly one variant results per `authenticate` invocation.
#[derive(Debug)]
pub enum Outcome<U> {
    /// No token yet: answer `401` with a `WWW-Authenticate: Negotiate`
    /// challenge. The expected first leg of the RFC 4559 flow.
    Challenge,
    /// The `Authorization` header was present but not a Negotiate token.
    /// The raw header is kept for server-side logging, never echoed.
    MalformedToken { header: String },
    /// The security-context engine failed; the error reports the phase.
    NegotiationError(Error),
    /// Negotiation succeeded but no user record exists and a redirect
    /// target was configured for that case.
    Redirect { location: String },
    /// Authentication failed: verify error, no-user without fallback, or a
    /// configuration error detected at the point of use.
    Failure(Error),
    /// Authenticated, with a user bound.
    Success {
        user: ResolvedUser<U>,
        info: Option<String>,
    },
}

impl<U> Outcome<U> {
    /// Map this outcome to the HTTP response the host should send, or
    /// `None` for `Success`, where the request proceeds with the user
    /// bound.
    ///
    /// Bodies are generic on purpose: internal cause strings stay in
    /// server-side logs.
    pub fn response(&self) -> Option<Response<String>> {
        match self {
            Outcome::Challenge => Some(challenge()),
            Outcome::MalformedToken { .. } => Some(plain(
                StatusCode::BAD_REQUEST,
                "malformed authorization header",
            )),
            Outcome::Redirect { location } => Some(redirect(location)),
            Outcome::NegotiationError(_) => {
                Some(plain(StatusCode::UNAUTHORIZED, "authentication failed"))
            }
            Outcome::Failure(err) if err.is_configuration() => Some(plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
            )),
            Outcome::Failure(_) => Some(plain(StatusCode::UNAUTHORIZED, "authentication failed")),
            Outcome::Success { .. } => None,
        }
    }
}

/// The `401` challenge answer: `WWW-Authenticate: Negotiate` with an empty
/// challenge value (no continuation token; single-leg flow only).
pub fn challenge() -> Response<String> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(WWW_AUTHENTICATE, "Negotiate")
        .body(String::new())
        .expect("static challenge response")
}

fn redirect(location: &str) -> Response<String> {
    match http::HeaderValue::try_from(location) {
        Ok(value) => Response::builder()
            .status(StatusCode::FOUND)
            .header(LOCATION, value)
            .body(String::new())
            .expect("static redirect response"),
        // a redirect target that cannot be a header value is a
        // configuration problem, not something to panic over per request
        Err(_) => {
            log::error!("no-user redirect target is not a valid Location header: {}", location);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn plain(status: StatusCode, body: &str) -> Response<String> {
    Response::builder()
        .status(status)
        .body(body.to_owned())
        .expect("static response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NegotiationPhase;

    #[test]
    fn test_challenge_response() {
        let resp = Outcome::<()>::Challenge.response().unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(WWW_AUTHENTICATE).unwrap(), "Negotiate");
        assert!(resp.body().is_empty());
    }

    #[test]
    fn test_malformed_response_does_not_echo_header() {
        let outcome = Outcome::<()>::MalformedToken {
            header: "Basic secret".to_owned(),
        };
        let resp = outcome.response().unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.body().contains("secret"));
    }

    #[test]
    fn test_redirect_response() {
        let outcome = Outcome::<()>::Redirect {
            location: "/manageprofile".to_owned(),
        };
        let resp = outcome.response().unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/manageprofile");
    }

    #[test]
    fn test_negotiation_error_hides_cause() {
        let outcome = Outcome::<()>::NegotiationError(crate::error::negotiation(
            NegotiationPhase::Init,
            "keytab not found",
        ));
        let resp = outcome.response().unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!resp.body().contains("keytab"));
    }

    #[test]
    fn test_configuration_failure_is_server_error() {
        let outcome = Outcome::<()>::Failure(crate::error::configuration("bad setup"));
        let resp = outcome.response().unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_success_proceeds() {
        let outcome = Outcome::Success {
            user: ResolvedUser::Known(1u32),
            info: None,
        };
        assert!(outcome.response().is_none());
    }

    #[test]
    fn test_placeholder_user_is_tagged() {
        let user = ResolvedUser::Placeholder("guest");
        assert!(user.is_placeholder());
        assert_eq!(user.into_user(), "guest");
    }
}

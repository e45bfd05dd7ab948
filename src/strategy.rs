// src/strategy.rs

//! The Negotiate authentication strategy: configuration, builder, and the
//! per-request authentication pipeline.
//!
//! One `authenticate` call performs a single init→step→clean cycle against
//! the injected [`SecurityContextEngine`], binds the resolved principal to
//! the session, and applies the no-user policy to the verify capability's
//! result. The strategy itself is immutable configuration and is shared
//! read-only across arbitrarily many concurrent requests; every invocation
//! owns its security context exclusively.

use std::sync::Arc;

use http::request::Parts;

use crate::engine::{
    DelegatedCredentials, NegotiationPhase, SecurityContext, SecurityContextEngine,
};
use crate::outcome::{Outcome, ResolvedUser};
use crate::session::{self, Session};
use crate::token::{self, Extracted};
use crate::verify::Verify;
use crate::{error, Error};

const DEFAULT_SERVICE_PRINCIPAL: &str = "HTTP";

/// Per-call-site options for the no-user policy.
///
/// Supplied at each authentication site rather than at strategy
/// construction, so different routes can apply different policy over the
/// same strategy instance. `no_user_redirect` takes precedence over
/// `no_user_ok`.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions {
    no_user_redirect: Option<String>,
    no_user_ok: Option<bool>,
}

impl AuthenticateOptions {
    pub fn new() -> AuthenticateOptions {
        AuthenticateOptions::default()
    }

    /// Redirect target when negotiation succeeds but no user record exists.
    pub fn no_user_redirect(mut self, location: impl Into<String>) -> AuthenticateOptions {
        self.no_user_redirect = Some(location.into());
        self
    }

    /// Allow success with the configured empty-user object when no user
    /// record exists. Requires `empty_user` on the strategy. An explicit
    /// `false` here overrides a builder-level default of `true`.
    pub fn no_user_ok(mut self, ok: bool) -> AuthenticateOptions {
        self.no_user_ok = Some(ok);
        self
    }

    /// Per-call values win; the builder defaults fill the gaps.
    fn merged(&self, defaults: &AuthenticateOptions) -> AuthenticateOptions {
        AuthenticateOptions {
            no_user_redirect: self
                .no_user_redirect
                .clone()
                .or_else(|| defaults.no_user_redirect.clone()),
            no_user_ok: self.no_user_ok.or(defaults.no_user_ok),
        }
    }
}

struct Config<U> {
    service_principal_name: String,
    pass_request_to_verify: bool,
    constrained_delegation: bool,
    verbose: bool,
    empty_user: Option<U>,
    defaults: AuthenticateOptions,
}

/// Builds a [`NegotiateStrategy`].
pub struct NegotiateStrategyBuilder<U> {
    config: Config<U>,
}

impl<U> NegotiateStrategyBuilder<U> {
    pub fn new() -> NegotiateStrategyBuilder<U> {
        NegotiateStrategyBuilder {
            config: Config {
                service_principal_name: DEFAULT_SERVICE_PRINCIPAL.to_owned(),
                pass_request_to_verify: false,
                constrained_delegation: false,
                verbose: false,
                empty_user: None,
                defaults: AuthenticateOptions::default(),
            },
        }
    }

    /// The service principal, form `service@host` (default `"HTTP"`).
    ///
    /// The service should pretty much always be `HTTP`, but the host part
    /// may need spelling out when CNAMEs or load balancers are in use. The
    /// engine looks this principal up in its keytab during `init`.
    pub fn service_principal_name(mut self, spn: impl Into<String>) -> Self {
        self.config.service_principal_name = spn.into();
        self
    }

    /// Pass the request to the verify capability alongside the principal.
    pub fn pass_request_to_verify(mut self, pass: bool) -> Self {
        self.config.pass_request_to_verify = pass;
        self
    }

    /// Request constrained delegation (S4U2Proxy) during `init`. Requires
    /// keytab and service support on the engine side.
    pub fn constrained_delegation(mut self, delegate: bool) -> Self {
        self.config.constrained_delegation = delegate;
        self
    }

    /// Log the no-user-policy branch decisions at `info` level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// The user object substituted when the `no_user_ok` policy applies.
    pub fn empty_user(mut self, user: U) -> Self {
        self.config.empty_user = Some(user);
        self
    }

    /// Default redirect target when no user record exists, applied when the
    /// call site does not set one.
    pub fn no_user_redirect(mut self, location: impl Into<String>) -> Self {
        self.config.defaults.no_user_redirect = Some(location.into());
        self
    }

    /// Default `no_user_ok` policy, applied when the call site does not set
    /// one. Setting this without [`empty_user`](Self::empty_user) fails at
    /// [`build`](Self::build).
    pub fn no_user_ok(mut self, ok: bool) -> Self {
        self.config.defaults.no_user_ok = Some(ok);
        self
    }

    /// Assemble the strategy over the engine and verify capabilities.
    pub fn build<E>(
        self,
        engine: E,
        verify: Arc<dyn Verify<U>>,
    ) -> Result<NegotiateStrategy<U, E>, Error>
    where
        E: SecurityContextEngine,
    {
        if self.config.defaults.no_user_ok == Some(true) && self.config.empty_user.is_none() {
            return Err(error::configuration(
                "no_user_ok requires an empty_user object to be configured",
            ));
        }

        Ok(NegotiateStrategy {
            config: self.config,
            engine,
            verify,
        })
    }
}

impl<U> Default for NegotiateStrategyBuilder<U> {
    fn default() -> Self {
        NegotiateStrategyBuilder::new()
    }
}

/// Authenticates requests using Negotiate (RFC 4559).
///
/// Applications supply a [`Verify`] capability that maps an authenticated
/// principal (`name@REALM`) to an application user. When negotiation
/// succeeds, the principal is stored in the session under
/// [`AUTHENTICATED_PRINCIPAL`](crate::AUTHENTICATED_PRINCIPAL) before the verify capability runs,
/// so it is available to the host even when no user record exists yet.
///
/// A failure redirect is generally the wrong tool with this strategy: the
/// missing-token leg must answer `401` with `WWW-Authenticate: Negotiate`
/// for the browser to retry with a token. Use
/// [`AuthenticateOptions::no_user_redirect`] for the authenticated-but-no-
/// user case instead.
pub struct NegotiateStrategy<U, E> {
    config: Config<U>,
    engine: E,
    verify: Arc<dyn Verify<U>>,
}

struct Negotiated {
    principal: String,
    delegated: Option<DelegatedCredentials>,
}

impl<U, E> NegotiateStrategy<U, E>
where
    U: Clone,
    E: SecurityContextEngine,
{
    /// Authenticate one request. Exactly one terminal [`Outcome`] results;
    /// the outcome is a pure function of the header value, the
    /// configuration, the per-call options, and what the engine and verify
    /// capabilities return.
    pub async fn authenticate(
        &self,
        request: &Parts,
        session: &mut dyn Session,
        options: &AuthenticateOptions,
    ) -> Outcome<U> {
        let token = match token::extract(request.headers.get(http::header::AUTHORIZATION)) {
            Extracted::Missing => return Outcome::Challenge,
            Extracted::Malformed(header) => {
                log::debug!("malformed authentication token: {}", header);
                return Outcome::MalformedToken { header };
            }
            Extracted::Token(token) => token,
        };

        let negotiated = match self.negotiate(&token).await {
            Ok(negotiated) => negotiated,
            Err(err) => return Outcome::NegotiationError(err),
        };

        // Bind before resolution: the host may need the principal even when
        // no user record exists (e.g. a create-profile flow).
        session::bind_principal(
            session,
            &negotiated.principal,
            negotiated.delegated.as_ref(),
        );

        let options = options.merged(&self.config.defaults);
        self.resolve(request, &negotiated.principal, &options).await
    }

    /// Drive one init→step→clean cycle. The principal and delegation handle
    /// are captured from the context before `clean` disposes it; a context
    /// that was initialized is disposed on every exit path.
    async fn negotiate(&self, token: &[u8]) -> Result<Negotiated, Error> {
        let spn = &self.config.service_principal_name;
        let delegate = self.config.constrained_delegation;

        let mut ctx = match self.engine.init(spn, delegate).await {
            Ok(ctx) => ctx,
            Err(err) => return Err(self.phase_failure(NegotiationPhase::Init, err)),
        };

        if let Err(err) = self.engine.step(&mut ctx, token).await {
            let failure = self.phase_failure(NegotiationPhase::Step, err);
            if let Err(clean_err) = self.engine.clean(ctx).await {
                log::debug!(
                    "context disposal after failed step also failed: {}",
                    clean_err
                );
            }
            return Err(failure);
        }

        // clean wipes the context, so capture its state first
        let principal = ctx.principal();
        let delegated = if delegate {
            ctx.delegated_credentials()
        } else {
            None
        };

        let principal = match principal {
            Some(principal) => principal,
            None => {
                let failure = self.phase_failure(
                    NegotiationPhase::Step,
                    "negotiation completed without a principal",
                );
                if let Err(clean_err) = self.engine.clean(ctx).await {
                    log::debug!(
                        "context disposal after incomplete step also failed: {}",
                        clean_err
                    );
                }
                return Err(failure);
            }
        };

        if let Err(err) = self.engine.clean(ctx).await {
            return Err(self.phase_failure(NegotiationPhase::Clean, err));
        }

        Ok(Negotiated {
            principal,
            delegated,
        })
    }

    fn phase_failure(
        &self,
        phase: NegotiationPhase,
        err: impl Into<crate::BoxError>,
    ) -> Error {
        let err = err.into();
        log::error!(
            "authentication failed at operation '{}' with error: {}",
            phase,
            err
        );
        error::negotiation(phase, err)
    }

    /// Apply the verify capability and the no-user policy.
    async fn resolve(
        &self,
        request: &Parts,
        principal: &str,
        options: &AuthenticateOptions,
    ) -> Outcome<U> {
        let request = self.config.pass_request_to_verify.then_some(request);

        let verdict = match self.verify.verify(request, principal).await {
            Ok(verdict) => verdict,
            Err(err) => return Outcome::Failure(error::resolution(err)),
        };

        if let Some(user) = verdict.user {
            return Outcome::Success {
                user: ResolvedUser::Known(user),
                info: verdict.info,
            };
        }

        if let Some(location) = &options.no_user_redirect {
            if self.config.verbose {
                log::info!("redirecting to {}", location);
            }
            return Outcome::Redirect {
                location: location.clone(),
            };
        }

        if options.no_user_ok.unwrap_or(false) {
            return match &self.config.empty_user {
                Some(user) => {
                    if self.config.verbose {
                        log::info!("proceeding with empty user object for: {}", principal);
                    }
                    Outcome::Success {
                        user: ResolvedUser::Placeholder(user.clone()),
                        info: verdict.info,
                    }
                }
                None => Outcome::Failure(error::configuration(
                    "no_user_ok requires an empty_user object to be configured",
                )),
            };
        }

        Outcome::Failure(error::no_user(principal))
    }
}

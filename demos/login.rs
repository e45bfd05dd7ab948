// demos/login.rs

//! Walkthrough of the Negotiate login flow against an in-memory engine and
//! user store: the challenge leg, a successful login, and the
//! no-user-redirect path followed by profile creation.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example login
//! ```
//!
//! The engine here is a stand-in that treats the token payload as the
//! client principal; a real deployment implements
//! `SecurityContextEngine` over a GSSAPI/SSPI library and a keytab.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use futures_util::future::BoxFuture;
use http::request::Parts;
use negotiate_auth::{
    AuthenticateOptions, BoxError, DelegatedCredentials, MemorySession, NegotiateStrategyBuilder,
    Outcome, SecurityContext, SecurityContextEngine, Session, Verdict, Verify,
    AUTHENTICATED_PRINCIPAL,
};

#[derive(Debug, Clone)]
struct User {
    principal: String,
    email: String,
}

struct DemoContext {
    principal: Option<String>,
}

impl SecurityContext for DemoContext {
    fn principal(&self) -> Option<String> {
        self.principal.clone()
    }

    fn delegated_credentials(&self) -> Option<DelegatedCredentials> {
        None
    }
}

/// Accepts any token and reads the client principal straight out of it.
struct DemoEngine;

impl SecurityContextEngine for DemoEngine {
    type Context = DemoContext;

    fn init<'a>(
        &'a self,
        spn: &'a str,
        _delegate: bool,
    ) -> BoxFuture<'a, Result<DemoContext, BoxError>> {
        Box::pin(async move {
            log::debug!("init acceptor context for {}", spn);
            Ok(DemoContext { principal: None })
        })
    }

    fn step<'a>(
        &'a self,
        ctx: &'a mut DemoContext,
        token: &'a [u8],
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let principal = String::from_utf8(token.to_vec())
                .map_err(|_| "token is not a demo principal")?;
            ctx.principal = Some(principal);
            Ok(())
        })
    }

    fn clean<'a>(&'a self, ctx: DemoContext) -> BoxFuture<'a, Result<(), BoxError>> {
        drop(ctx);
        Box::pin(async { Ok(()) })
    }
}

/// User store shared between the verify capability and the profile routes.
#[derive(Clone, Default)]
struct UserDb {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl UserDb {
    fn insert(&self, user: User) {
        self.users
            .lock()
            .unwrap()
            .insert(user.principal.clone(), user);
    }
}

impl Verify<User> for UserDb {
    fn verify<'a>(
        &'a self,
        _request: Option<&'a Parts>,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<Verdict<User>, BoxError>> {
        Box::pin(async move {
            match self.users.lock().unwrap().get(principal) {
                Some(user) => Ok(Verdict::user(user.clone())),
                None => Ok(Verdict::no_user()),
            }
        })
    }
}

fn request(auth: Option<&str>) -> Parts {
    let mut builder = http::Request::builder().uri("/authenticate-negotiate");
    if let Some(auth) = auth {
        builder = builder.header(http::header::AUTHORIZATION, auth);
    }
    builder.body(()).unwrap().into_parts().0
}

fn negotiate_header(principal: &str) -> String {
    format!(
        "Negotiate {}",
        base64::engine::general_purpose::STANDARD.encode(principal)
    )
}

fn describe<U: std::fmt::Debug>(step: &str, outcome: &Outcome<U>) {
    match outcome.response() {
        Some(response) => println!("{}: HTTP {} {:?}", step, response.status(), response.headers()),
        None => println!("{}: proceed with {:?}", step, outcome),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), BoxError> {
    env_logger::init();

    let db = UserDb::default();
    db.insert(User {
        principal: "alice@EXAMPLE.COM".to_owned(),
        email: "alice@example.com".to_owned(),
    });

    let strategy = NegotiateStrategyBuilder::new()
        .service_principal_name("HTTP@www.example.com")
        .verbose(true)
        .build(DemoEngine, Arc::new(db.clone()) as Arc<dyn Verify<User>>)?;

    let options = AuthenticateOptions::new().no_user_redirect("/manageprofile");

    // Leg 1: the browser arrives without a token and gets the challenge.
    let mut session = MemorySession::new();
    let outcome = strategy
        .authenticate(&request(None), &mut session, &options)
        .await;
    describe("first leg (no token)", &outcome);

    // Leg 2: the browser retries with a token; alice has a user record.
    let outcome = strategy
        .authenticate(
            &request(Some(&negotiate_header("alice@EXAMPLE.COM"))),
            &mut session,
            &options,
        )
        .await;
    describe("alice retries with token", &outcome);

    // bob authenticates fine but has no profile yet: redirected, with the
    // trusted principal kept in the session for the create-profile form.
    let mut session = MemorySession::new();
    let outcome = strategy
        .authenticate(
            &request(Some(&negotiate_header("bob@EXAMPLE.COM"))),
            &mut session,
            &options,
        )
        .await;
    describe("bob without a profile", &outcome);

    let principal = session
        .get(AUTHENTICATED_PRINCIPAL)
        .expect("principal survives the redirect")
        .to_owned();
    let profile = User {
        principal: principal.clone(),
        email: "bob@example.com".to_owned(),
    };
    println!("creating profile for {} <{}>", profile.principal, profile.email);
    db.insert(profile);

    let outcome = strategy
        .authenticate(
            &request(Some(&negotiate_header(&principal))),
            &mut session,
            &options,
        )
        .await;
    describe("bob after creating a profile", &outcome);

    Ok(())
}

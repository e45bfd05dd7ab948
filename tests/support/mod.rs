// tests/support/mod.rs

//! Test doubles for the engine and verify capabilities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use http::request::Parts;
use negotiate_auth::{
    BoxError, DelegatedCredentials, SecurityContext, SecurityContextEngine, Verdict, Verify,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub id: u32,
}

/// Engine call counters, shared with the test body.
#[derive(Default)]
pub struct Calls {
    pub init: AtomicUsize,
    pub step: AtomicUsize,
    pub clean: AtomicUsize,
    /// The `(spn, delegate)` arguments the last `init` received.
    pub init_args: Mutex<Option<(String, bool)>>,
}

impl Calls {
    pub fn init_count(&self) -> usize {
        self.init.load(Ordering::SeqCst)
    }

    pub fn step_count(&self) -> usize {
        self.step.load(Ordering::SeqCst)
    }

    pub fn clean_count(&self) -> usize {
        self.clean.load(Ordering::SeqCst)
    }
}

pub struct MockContext {
    stepped: bool,
    principal: Option<String>,
    delegated: Option<DelegatedCredentials>,
}

impl SecurityContext for MockContext {
    fn principal(&self) -> Option<String> {
        if self.stepped {
            self.principal.clone()
        } else {
            None
        }
    }

    fn delegated_credentials(&self) -> Option<DelegatedCredentials> {
        if self.stepped {
            self.delegated.clone()
        } else {
            None
        }
    }
}

/// A scripted engine: resolves a fixed principal, optionally grants
/// delegated credentials, and can be told to fail any single phase.
pub struct MockEngine {
    principal: Option<String>,
    delegated: Option<DelegatedCredentials>,
    fail_init: Option<String>,
    fail_step: Option<String>,
    fail_clean: Option<String>,
    pub calls: Arc<Calls>,
}

impl MockEngine {
    pub fn resolving(principal: &str) -> MockEngine {
        MockEngine {
            principal: Some(principal.to_owned()),
            delegated: None,
            fail_init: None,
            fail_step: None,
            fail_clean: None,
            calls: Arc::new(Calls::default()),
        }
    }

    /// An engine whose step completes without resolving a principal.
    pub fn resolving_nothing() -> MockEngine {
        MockEngine {
            principal: None,
            delegated: None,
            fail_init: None,
            fail_step: None,
            fail_clean: None,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn granting_delegation(mut self, cache_name: &str) -> MockEngine {
        self.delegated = Some(DelegatedCredentials::new(cache_name));
        self
    }

    pub fn failing_init(mut self, cause: &str) -> MockEngine {
        self.fail_init = Some(cause.to_owned());
        self
    }

    pub fn failing_step(mut self, cause: &str) -> MockEngine {
        self.fail_step = Some(cause.to_owned());
        self
    }

    pub fn failing_clean(mut self, cause: &str) -> MockEngine {
        self.fail_clean = Some(cause.to_owned());
        self
    }
}

impl SecurityContextEngine for MockEngine {
    type Context = MockContext;

    fn init<'a>(
        &'a self,
        spn: &'a str,
        delegate: bool,
    ) -> BoxFuture<'a, Result<MockContext, BoxError>> {
        Box::pin(async move {
            self.calls.init.fetch_add(1, Ordering::SeqCst);
            *self.calls.init_args.lock().unwrap() = Some((spn.to_owned(), delegate));

            if let Some(cause) = &self.fail_init {
                return Err(cause.clone().into());
            }

            Ok(MockContext {
                stepped: false,
                principal: self.principal.clone(),
                delegated: if delegate { self.delegated.clone() } else { None },
            })
        })
    }

    fn step<'a>(
        &'a self,
        ctx: &'a mut MockContext,
        _token: &'a [u8],
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            self.calls.step.fetch_add(1, Ordering::SeqCst);

            if let Some(cause) = &self.fail_step {
                return Err(cause.clone().into());
            }

            ctx.stepped = true;
            Ok(())
        })
    }

    fn clean<'a>(&'a self, ctx: MockContext) -> BoxFuture<'a, Result<(), BoxError>> {
        drop(ctx);
        Box::pin(async move {
            self.calls.clean.fetch_add(1, Ordering::SeqCst);

            if let Some(cause) = &self.fail_clean {
                return Err(cause.clone().into());
            }

            Ok(())
        })
    }
}

/// A map-backed user store, with optional scripted failure and a flag
/// recording whether the request was passed in.
pub struct MapVerify {
    users: HashMap<String, TestUser>,
    info: Option<String>,
    fail: Option<String>,
    pub saw_request: AtomicBool,
}

impl MapVerify {
    pub fn empty() -> MapVerify {
        MapVerify {
            users: HashMap::new(),
            info: None,
            fail: None,
            saw_request: AtomicBool::new(false),
        }
    }

    pub fn with_user(principal: &str, user: TestUser) -> MapVerify {
        let mut users = HashMap::new();
        users.insert(principal.to_owned(), user);
        MapVerify {
            users,
            info: None,
            fail: None,
            saw_request: AtomicBool::new(false),
        }
    }

    pub fn failing(cause: &str) -> MapVerify {
        MapVerify {
            users: HashMap::new(),
            info: None,
            fail: Some(cause.to_owned()),
            saw_request: AtomicBool::new(false),
        }
    }

    /// Attach an info message to every verdict this store returns.
    pub fn announcing(mut self, info: &str) -> MapVerify {
        self.info = Some(info.to_owned());
        self
    }
}

impl Verify<TestUser> for MapVerify {
    fn verify<'a>(
        &'a self,
        request: Option<&'a Parts>,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<Verdict<TestUser>, BoxError>> {
        Box::pin(async move {
            self.saw_request.store(request.is_some(), Ordering::SeqCst);

            if let Some(cause) = &self.fail {
                return Err(cause.clone().into());
            }

            let verdict = match self.users.get(principal) {
                Some(user) => Verdict::user(user.clone()),
                None => Verdict::no_user(),
            };
            Ok(match &self.info {
                Some(info) => verdict.with_info(info.as_str()),
                None => verdict,
            })
        })
    }
}

/// Box a verify double behind the capability trait.
pub fn shared<V: Verify<TestUser> + 'static>(verify: V) -> Arc<dyn Verify<TestUser>> {
    Arc::new(verify)
}

/// Coerce an already-shared verify double behind the capability trait.
pub fn shared_arc<V: Verify<TestUser> + 'static>(verify: Arc<V>) -> Arc<dyn Verify<TestUser>> {
    verify
}

/// Request parts with an optional `Authorization` header.
pub fn request(auth: Option<&str>) -> Parts {
    let mut builder = http::Request::builder().uri("/authenticate-negotiate");
    if let Some(auth) = auth {
        builder = builder.header(http::header::AUTHORIZATION, auth);
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    parts
}

/// A `Negotiate` header carrying valid base64.
pub fn negotiate_header() -> &'static str {
    "Negotiate YIIFzgYGKwYBBQUCoIIFwjCCBb4="
}

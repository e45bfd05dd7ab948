// src/registry.rs

//! Named strategy registry.
//!
//! Hosts register strategies under a name and authenticate against the name
//! at each route, the way web authentication middleware dispatches. The
//! [`Strategy`] trait is the object-safe capability a registry entry must
//! provide; [`NegotiateStrategy`](crate::NegotiateStrategy) implements it.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use http::request::Parts;

use crate::engine::SecurityContextEngine;
use crate::outcome::Outcome;
use crate::session::Session;
use crate::strategy::{AuthenticateOptions, NegotiateStrategy};
use crate::error;

/// An authentication strategy producing a terminal [`Outcome`] per request.
pub trait Strategy<U>: Send + Sync {
    fn authenticate<'a>(
        &'a self,
        request: &'a Parts,
        session: &'a mut (dyn Session + 'a),
        options: &'a AuthenticateOptions,
    ) -> BoxFuture<'a, Outcome<U>>;
}

impl<U, E> Strategy<U> for NegotiateStrategy<U, E>
where
    U: Clone + Send + Sync + 'static,
    E: SecurityContextEngine,
{
    fn authenticate<'a>(
        &'a self,
        request: &'a Parts,
        session: &'a mut (dyn Session + 'a),
        options: &'a AuthenticateOptions,
    ) -> BoxFuture<'a, Outcome<U>> {
        Box::pin(NegotiateStrategy::authenticate(
            self, request, session, options,
        ))
    }
}

/// Strategies keyed by name.
pub struct StrategyRegistry<U> {
    strategies: HashMap<String, Arc<dyn Strategy<U>>>,
}

impl<U> Default for StrategyRegistry<U> {
    fn default() -> Self {
        StrategyRegistry::new()
    }
}

impl<U> StrategyRegistry<U> {
    pub fn new() -> StrategyRegistry<U> {
        StrategyRegistry {
            strategies: HashMap::new(),
        }
    }

    /// Register `strategy` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn Strategy<U>>) {
        self.strategies.insert(name.into(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Strategy<U>>> {
        self.strategies.get(name)
    }

    /// Authenticate against the named strategy. An unknown name is a
    /// configuration failure, not a panic.
    pub async fn authenticate(
        &self,
        name: &str,
        request: &Parts,
        session: &mut dyn Session,
        options: &AuthenticateOptions,
    ) -> Outcome<U> {
        match self.strategies.get(name) {
            Some(strategy) => strategy.authenticate(request, session, options).await,
            None => Outcome::Failure(error::configuration(
                "no strategy registered under that name",
            )),
        }
    }
}

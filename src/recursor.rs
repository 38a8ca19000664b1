//! Racing recursive resolution across all root servers.
//!
//! The [`Recursor`] is the public face of the crate. It owns the suffix
//! cache and the in-flight registry and, for every resolution request,
//! starts one engine run per root server. All runs share the cache, the
//! registry and a cloned [`CancelSignal`]; the first run to succeed wins
//! and flips the signal so the losers retire at their next label
//! boundary. The winner is returned without waiting for the losers to
//! actually stop.

use crate::cache::{Config, SuffixCache};
use crate::client::Client;
use crate::engine::{self, CancelSignal};
use crate::error::Error;
use crate::flight::FlightMap;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, warn};

//------------ Recursor ------------------------------------------------------

/// A caching, deduplicating recursive resolver core.
///
/// Cloning is cheap and every clone shares the same cache and registry,
/// so a `Recursor` can be handed to any number of tasks.
#[derive(Debug)]
pub struct Recursor<C> {
    /// State shared with the spawned per-root runs.
    inner: Arc<Inner<C>>,
}

/// The state shared between a `Recursor` and its running chains.
#[derive(Debug)]
struct Inner<C> {
    /// The external name-service client.
    client: C,

    /// The shared suffix cache.
    cache: SuffixCache,

    /// The shared in-flight registry.
    flights: FlightMap,
}

impl<C> Clone for Recursor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Client> Recursor<C> {
    /// Creates a resolver with default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(Config::default(), client)
    }

    /// Creates a resolver with the given cache configuration.
    pub fn with_config(config: Config, client: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                cache: SuffixCache::with_config(config),
                flights: FlightMap::new(),
            }),
        }
    }

    /// Returns the shared suffix cache.
    pub fn cache(&self) -> &SuffixCache {
        &self.inner.cache
    }

    /// Returns the shared in-flight registry.
    pub fn flights(&self) -> &FlightMap {
        &self.inner.flights
    }

    /// Runs a single resolution chain from the given server.
    ///
    /// This is the primitive [`resolve`][Self::resolve] races once per
    /// root. It consults the cache and the registry like any other run
    /// but starts at `start` instead of a root server, and it polls
    /// `cancel` between label steps. Useful on its own when only one
    /// starting point is known.
    pub async fn resolve_from(
        &self,
        domain: &str,
        start: Ipv4Addr,
        cancel: &CancelSignal,
    ) -> Result<Ipv4Addr, Error> {
        if domain.is_empty() {
            return Err(Error::EmptyDomain);
        }
        engine::resolve(
            &self.inner.client,
            &self.inner.cache,
            &self.inner.flights,
            domain,
            start,
            cancel,
        )
        .await
    }
}

impl<C: Client + 'static> Recursor<C> {
    /// Resolves `domain` to an address.
    ///
    /// One chain is started per root server. The first chain to succeed
    /// determines the result; the others are cancelled cooperatively and
    /// left to clean up after themselves. The call fails only if every
    /// chain fails, with the last failure observed.
    pub async fn resolve(&self, domain: &str) -> Result<Ipv4Addr, Error> {
        if domain.is_empty() {
            return Err(Error::EmptyDomain);
        }
        let roots = self.inner.client.root_servers()?;
        if roots.is_empty() {
            return Err(Error::NoRootServers);
        }
        debug!(%domain, roots = roots.len(), "starting resolution race");

        let cancel = CancelSignal::new();
        let mut runs: FuturesUnordered<_> = roots
            .into_iter()
            .map(|root| {
                let inner = self.inner.clone();
                let domain = domain.to_string();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    engine::resolve(
                        &inner.client,
                        &inner.cache,
                        &inner.flights,
                        &domain,
                        root,
                        &cancel,
                    )
                    .await
                })
            })
            .collect();

        // First success wins. Dropping the join handles detaches the
        // losers; they observe the cancel flag at their next label
        // boundary and retire on their own.
        let mut last_err = None;
        while let Some(joined) = runs.next().await {
            match joined {
                Ok(Ok(addr)) => {
                    cancel.cancel();
                    debug!(%domain, %addr, "resolution complete");
                    return Ok(addr);
                }
                Ok(Err(err)) => {
                    warn!(%domain, %err, "root chain failed");
                    last_err = Some(err);
                }
                Err(err) => {
                    warn!(%domain, %err, "root chain panicked");
                    last_err = Some(Error::ChainAbandoned);
                }
            }
        }
        Err(last_err.expect("there was at least one root chain"))
    }
}

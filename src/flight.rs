//! The in-flight registry.
//!
//! At most one resolution chain may be driving any given domain at a
//! time. The first caller to ask for a domain receives a [`Ticket`] and
//! with it the obligation to drive the chain; every later caller receives
//! a [`Joined`] handle onto the same chain and simply awaits its result.
//! This is what keeps N concurrent requests for one uncached name down to
//! a single sequence of client calls.
//!
//! Entries are transient coordination state, not a cache. They are
//! removed the moment the chain finishes, whether it completed, failed or
//! was cancelled, and are never consulted afterwards.

use crate::error::Error;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use tokio::sync::watch;
use tracing::trace;

//------------ FlightMap -----------------------------------------------------

/// The registry of resolutions currently in flight.
#[derive(Debug, Default)]
pub struct FlightMap {
    /// Pending chains by the domain they are resolving.
    ///
    /// The sender half of each channel lives in the driver's [`Ticket`];
    /// joiners clone the receiver out of this map.
    pending: Mutex<HashMap<String, watch::Receiver<Option<Ipv4Addr>>>>,
}

impl FlightMap {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Default::default()
    }

    /// Joins the in-flight chain for `domain`, or starts one.
    ///
    /// Exactly one concurrent caller per domain receives
    /// [`Flight::Driving`]; everyone else receives [`Flight::Joined`].
    pub fn join(&self, domain: &str) -> Flight<'_> {
        let mut pending = self.pending.lock();
        match pending.entry(domain.to_string()) {
            Entry::Occupied(entry) => {
                trace!(%domain, "joining resolution already in flight");
                Flight::Joined(Joined {
                    rx: entry.get().clone(),
                })
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Flight::Driving(Ticket {
                    map: self,
                    domain: domain.to_string(),
                    tx,
                })
            }
        }
    }

    /// Returns the number of chains currently in flight.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns whether no chain is currently in flight.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Removes the entry for `domain`, if any.
    fn remove(&self, domain: &str) {
        self.pending.lock().remove(domain);
    }
}

//------------ Flight --------------------------------------------------------

/// The outcome of asking to work on a domain.
#[derive(Debug)]
pub enum Flight<'a> {
    /// A chain for this domain is already in flight; await its result.
    Joined(Joined),

    /// No chain was in flight; the caller now drives this domain.
    Driving(Ticket<'a>),
}

//------------ Joined --------------------------------------------------------

/// A handle onto a chain some other caller is driving.
#[derive(Debug)]
pub struct Joined {
    /// The receiver for the driver's single-assignment result.
    rx: watch::Receiver<Option<Ipv4Addr>>,
}

impl Joined {
    /// Waits for the driving chain to publish its result.
    ///
    /// Fails with [`Error::ChainAbandoned`] if the driver went away
    /// without completing, which happens when its chain hit a lookup
    /// failure.
    pub async fn outcome(mut self) -> Result<Ipv4Addr, Error> {
        let value = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::ChainAbandoned)?;
        Ok((*value).expect("wait_for only returns once the value is set"))
    }
}

//------------ Ticket --------------------------------------------------------

/// Permission, and obligation, to drive the chain for one domain.
///
/// Dropping the ticket without calling [`complete`][Self::complete]
/// removes the registry entry and closes the channel, so joiners of a
/// failed chain observe [`Error::ChainAbandoned`] instead of waiting
/// forever.
#[derive(Debug)]
pub struct Ticket<'a> {
    /// The registry holding our entry.
    map: &'a FlightMap,

    /// The domain this ticket is driving.
    domain: String,

    /// The sender half for the chain's result.
    tx: watch::Sender<Option<Ipv4Addr>>,
}

impl Ticket<'_> {
    /// Publishes the chain's final address and retires the entry.
    ///
    /// Joiners holding a receiver keep seeing the published value even
    /// after the entry is gone.
    pub fn complete(self, addr: Ipv4Addr) {
        self.tx.send_replace(Some(addr));
        trace!(domain = %self.domain, %addr, "in-flight chain completed");
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.domain);
    }
}

//============ Tests =========================================================

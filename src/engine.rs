//! The resolution engine.
//!
//! One engine run walks a domain label by label, root first, asking the
//! server reached so far to resolve the next label. The suffix cache can
//! shortcut the front of the walk and the in-flight registry makes sure
//! only one run drives any given name at a time.

use crate::cache::SuffixCache;
use crate::client::Client;
use crate::error::Error;
use crate::flight::{Flight, FlightMap};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

//------------ CancelSignal --------------------------------------------------

/// A cooperative cancellation flag shared by the runs of one race.
///
/// Cloning the signal produces another handle onto the same flag, so
/// cancelling any clone cancels every run holding one. The flag is only
/// polled between label steps; a client call already under way is left to
/// finish and its result is discarded afterwards.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    /// The shared flag.
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    /// Creates a fresh, unset signal.
    pub fn new() -> Self {
        Default::default()
    }

    /// Requests cancellation of every run holding a clone of this signal.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

//------------ resolve -------------------------------------------------------

/// Resolves `domain` by walking its labels from the server at `start`.
///
/// Observing `cancel` mid-chain is a defined early exit: the run stops at
/// the next label boundary and reports the last address it reached.
pub(crate) async fn resolve<C: Client + ?Sized>(
    client: &C,
    cache: &SuffixCache,
    flights: &FlightMap,
    domain: &str,
    start: Ipv4Addr,
    cancel: &CancelSignal,
) -> Result<Ipv4Addr, Error> {
    let mut server = start;
    let mut resolved = String::new();
    let mut remaining = domain;

    // Shortcut over the longest suffix the cache still vouches for.
    if let Some((addr, suffix)) = cache.lookup(client, domain).await {
        if suffix.len() == domain.len() {
            debug!(%domain, %addr, "resolved entirely from cache");
            return Ok(addr);
        }
        server = addr;
        remaining = &domain[..domain.len() - suffix.len() - 1];
        resolved = suffix.to_string();
    }

    // The registry is keyed by the full requested name, not the reduced
    // remainder: names sharing their unresolved leaf labels but nothing
    // else, say www.example.com and www.other.net with both parents
    // cached, must not share a chain.
    let ticket = match flights.join(domain) {
        Flight::Joined(joined) => {
            let addr = joined.outcome().await?;
            debug!(%domain, %addr, "reused in-flight resolution");
            return Ok(addr);
        }
        Flight::Driving(ticket) => ticket,
    };

    // This run now drives the chain: walk the unresolved labels root
    // first, caching each suffix as soon as its address is known. A
    // failed label resolution drops the ticket, which clears the
    // registry entry before the error propagates.
    for label in remaining.rsplit('.') {
        if cancel.is_cancelled() {
            trace!(%domain, "cancelled between label steps");
            break;
        }
        server = client.resolve_label(server, label).await?;
        resolved = if resolved.is_empty() {
            label.to_string()
        } else {
            format!("{}.{}", label, resolved)
        };
        cache.store(&resolved, server).await;
        trace!(suffix = %resolved, addr = %server, "label resolved");
    }

    ticket.complete(server);
    Ok(server)
}

//============ Tests =========================================================

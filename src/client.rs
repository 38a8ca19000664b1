//! The name-service client abstraction.
//!
//! The resolver core never talks to the network itself. Everything it
//! needs from the outside world is captured by the [`Client`] trait: the
//! set of root servers to start from, the ability to ask one server to
//! resolve one label, and a reverse mapping from an address back to the
//! canonical name it serves. Wire formats, transports, timeouts and
//! retries all live behind this trait.
//!
//! All three operations may be invoked concurrently from multiple
//! resolution runs and implementations must be safe under that.

use crate::error::Error;
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::Arc;

/// The boxed future returned by the asynchronous [`Client`] methods.
pub type ClientFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

//------------ Client --------------------------------------------------------

/// A service that can answer single-label questions.
pub trait Client: Send + Sync {
    /// Returns the addresses of the known root servers.
    ///
    /// The list is ordered but the order carries no meaning beyond
    /// determinism. An empty list fails the whole resolution.
    fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error>;

    /// Asks the server at `server` to resolve a single label.
    ///
    /// On success the returned address is the next server to ask, or the
    /// final answer if `label` was the leaf label of the queried name.
    fn resolve_label<'a>(
        &'a self,
        server: Ipv4Addr,
        label: &'a str,
    ) -> ClientFuture<'a, Ipv4Addr>;

    /// Maps an address back to the canonical name it serves.
    ///
    /// Used only to check whether a cached suffix entry is still
    /// trustworthy.
    fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String>;
}

impl<C: Client + ?Sized> Client for &C {
    fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
        (**self).root_servers()
    }

    fn resolve_label<'a>(
        &'a self,
        server: Ipv4Addr,
        label: &'a str,
    ) -> ClientFuture<'a, Ipv4Addr> {
        (**self).resolve_label(server, label)
    }

    fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
        (**self).reverse_lookup(addr)
    }
}

impl<C: Client + ?Sized> Client for Box<C> {
    fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
        (**self).root_servers()
    }

    fn resolve_label<'a>(
        &'a self,
        server: Ipv4Addr,
        label: &'a str,
    ) -> ClientFuture<'a, Ipv4Addr> {
        (**self).resolve_label(server, label)
    }

    fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
        (**self).reverse_lookup(addr)
    }
}

impl<C: Client + ?Sized> Client for Arc<C> {
    fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
        (**self).root_servers()
    }

    fn resolve_label<'a>(
        &'a self,
        server: Ipv4Addr,
        label: &'a str,
    ) -> ClientFuture<'a, Ipv4Addr> {
        (**self).resolve_label(server, label)
    }

    fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
        (**self).reverse_lookup(addr)
    }
}

//! A caching, deduplicating recursive name-resolution core.
//!
//! This crate walks a domain name label by label, root first, the way an
//! iterative resolver follows a delegation chain. It does not speak any
//! wire protocol itself; instead it drives an external [`Client`] that
//! knows how to ask one server about one label and how to map an address
//! back to a name. What the crate adds on top of that client is the
//! interesting part:
//!
//! * a [suffix cache][cache] that remembers the address every suffix of a
//!   resolved name ended up at, revalidated against the client's reverse
//!   mapping before it is trusted,
//! * an [in-flight registry][flight] that lets any number of concurrent
//!   callers for the same name share a single chain of client calls, and
//! * a [fan-out racer][recursor] that starts one chain per root server and
//!   returns the first success, cooperatively cancelling the rest.
//!
//! The main entry point is [`Recursor`]. Give it a client, then call
//! [`resolve`][Recursor::resolve]:
//!
//! ```no_run
//! use recursor::client::{Client, ClientFuture};
//! use recursor::{Error, Recursor};
//! use std::net::Ipv4Addr;
//!
//! struct MyTransport;
//!
//! impl Client for MyTransport {
//!     fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
//!         Ok(vec![Ipv4Addr::new(198, 41, 0, 4)])
//!     }
//!
//!     fn resolve_label<'a>(
//!         &'a self,
//!         server: Ipv4Addr,
//!         label: &'a str,
//!     ) -> ClientFuture<'a, Ipv4Addr> {
//!         Box::pin(async move { todo!("ask `server` about `label`") })
//!     }
//!
//!     fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
//!         Box::pin(async move { todo!("map `addr` back to its name") })
//!     }
//! }
//!
//! # async fn run() -> Result<(), Error> {
//! let resolver = Recursor::new(MyTransport);
//! let addr = resolver.resolve("www.example.com").await?;
//! println!("www.example.com is {addr}");
//! # Ok(())
//! # }
//! ```
//!
//! The cache and the registry are purely in-memory, process-lifetime
//! state. Nothing is persisted and nothing is retried; retry policy, if
//! any, belongs to the client or to the caller.
//!
//! [`Client`]: client::Client

pub mod cache;
pub mod client;
pub mod error;
pub mod flight;
pub mod recursor;

mod engine;
mod utils;

pub use self::engine::CancelSignal;
pub use self::error::Error;
pub use self::recursor::Recursor;

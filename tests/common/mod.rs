//! Shared test fixtures: a scripted name service and logging setup.

use parking_lot::Mutex;
use recursor::client::{Client, ClientFuture};
use recursor::Error;
use std::collections::{HashMap, HashSet};
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Setup logging of events reported by the crate and the test suite.
///
/// Use the RUST_LOG environment variable to override the defaults.
///
/// E.g. to enable trace level logging:
///   RUST_LOG=TRACE
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .try_init()
        .ok();
}

/// A scripted name service.
///
/// Zone data is a table from `(server, label)` to the next address, the
/// reverse table maps each address back to its canonical name. Latencies
/// can be attached per server and every label resolution is counted and
/// logged so tests can assert how much external work actually happened.
pub struct MockService {
    /// The root servers handed to the resolver.
    roots: Vec<Ipv4Addr>,

    /// `(server, label)` to the address that server delegates to.
    zones: HashMap<(Ipv4Addr, String), Ipv4Addr>,

    /// Address to canonical name, as a mutex so tests can poison it.
    reverse: Mutex<HashMap<Ipv4Addr, String>>,

    /// Artificial latency per queried server.
    delays: HashMap<Ipv4Addr, Duration>,

    /// Servers that refuse the connection outright.
    unreachable: HashSet<Ipv4Addr>,

    /// Number of label resolutions performed.
    resolve_calls: AtomicUsize,

    /// Every label resolution as `"server:label"`, in call order.
    resolve_log: Mutex<Vec<String>>,
}

impl MockService {
    pub fn new(roots: &[Ipv4Addr]) -> Self {
        Self {
            roots: roots.to_vec(),
            zones: HashMap::new(),
            reverse: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            unreachable: HashSet::new(),
            resolve_calls: AtomicUsize::new(0),
            resolve_log: Mutex::new(Vec::new()),
        }
    }

    /// Scripts `server` to delegate `label` to `addr`, whose canonical
    /// name is `fqdn`.
    pub fn delegate(
        &mut self,
        server: Ipv4Addr,
        label: &str,
        fqdn: &str,
        addr: Ipv4Addr,
    ) {
        self.zones.insert((server, label.to_string()), addr);
        self.reverse.lock().insert(addr, fqdn.to_string());
    }

    /// Attaches an artificial latency to every question sent to `server`.
    pub fn set_delay(&mut self, server: Ipv4Addr, delay: Duration) {
        self.delays.insert(server, delay);
    }

    /// Makes every question sent to `server` fail at the transport level.
    pub fn set_unreachable(&mut self, server: Ipv4Addr) {
        self.unreachable.insert(server);
    }

    /// Rebinds the reverse mapping of `addr`, simulating a name whose
    /// address binding diverged after it was cached.
    pub fn poison_reverse(&self, addr: Ipv4Addr, name: &str) {
        self.reverse.lock().insert(addr, name.to_string());
    }

    /// The number of label resolutions performed so far.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// A copy of the label resolution log.
    pub fn resolve_log(&self) -> Vec<String> {
        self.resolve_log.lock().clone()
    }
}

impl Client for MockService {
    fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
        Ok(self.roots.clone())
    }

    fn resolve_label<'a>(
        &'a self,
        server: Ipv4Addr,
        label: &'a str,
    ) -> ClientFuture<'a, Ipv4Addr> {
        Box::pin(async move {
            if let Some(delay) = self.delays.get(&server) {
                tokio::time::sleep(*delay).await;
            }
            if self.unreachable.contains(&server) {
                return Err(Error::Transport(Arc::new(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "server unreachable",
                ))));
            }
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            self.resolve_log.lock().push(format!("{server}:{label}"));
            self.zones
                .get(&(server, label.to_string()))
                .copied()
                .ok_or_else(|| Error::LookupFailed(label.to_string()))
        })
    }

    fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
        Box::pin(async move {
            self.reverse
                .lock()
                .get(&addr)
                .cloned()
                .ok_or_else(|| Error::LookupFailed(addr.to_string()))
        })
    }
}

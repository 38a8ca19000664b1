//! The suffix cache.
//!
//! Every time a resolution chain learns the address of a fully-qualified
//! suffix, the pair is stored here. A later resolution of a name sharing
//! that suffix can then skip straight to the deepest server already known
//! instead of starting over at a root.
//!
//! An entry is only trusted after the client confirms that the reverse
//! mapping for its address still equals the suffix. An entry that fails
//! this check, or whose reverse lookup errors out, is passed over as if it
//! were absent and the search continues with the next shorter suffix. The
//! check runs on every read; a hit is never taken on faith.
//!
//! Entries live for the lifetime of the process. There is no TTL and no
//! eviction beyond the configurable capacity limit, which by default is
//! large enough to never matter.

use crate::client::Client;
use crate::utils::config::DefMinMax;
use moka::future::Cache;
use std::net::Ipv4Addr;
use tracing::trace;

/// Configuration limit for the maximum number of cached suffixes.
const MAX_CACHE_ENTRIES: DefMinMax<u64> =
    DefMinMax::new(1 << 20, 1, 1_000_000_000);

//------------ Config --------------------------------------------------------

/// Configuration of a suffix cache.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of cached suffixes.
    max_cache_entries: u64,
}

impl Config {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the maximum number of cached suffixes.
    pub fn max_cache_entries(&self) -> u64 {
        self.max_cache_entries
    }

    /// Sets the maximum number of cached suffixes.
    ///
    /// The value has to be at least one, at most 1,000,000,000 and
    /// defaults to 1,048,576.
    pub fn set_max_cache_entries(&mut self, value: u64) {
        self.max_cache_entries = MAX_CACHE_ENTRIES.limit(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_entries: MAX_CACHE_ENTRIES.default(),
        }
    }
}

//------------ SuffixCache ---------------------------------------------------

/// A map from fully-qualified suffixes to the addresses they resolved to.
///
/// Writes are immediately visible to concurrent lookups; callers need no
/// synchronization of their own.
#[derive(Debug)]
pub struct SuffixCache {
    /// The stored entries.
    entries: Cache<String, Ipv4Addr>,
}

impl SuffixCache {
    /// Creates an empty cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty cache with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            entries: Cache::new(config.max_cache_entries),
        }
    }

    /// Looks up the longest trustworthy suffix of `domain`.
    ///
    /// Starting at the full domain and dropping the leading label on each
    /// step, this checks whether the suffix has a stored address whose
    /// reverse mapping still equals the suffix. The first suffix passing
    /// that check is returned together with its address. A failed reverse
    /// lookup counts as a miss for that suffix only, not as an error.
    pub async fn lookup<'a, C: Client + ?Sized>(
        &self,
        client: &C,
        domain: &'a str,
    ) -> Option<(Ipv4Addr, &'a str)> {
        let mut suffix = domain;
        loop {
            if let Some(addr) = self.entries.get(suffix).await {
                match client.reverse_lookup(addr).await {
                    Ok(name) if name == suffix => {
                        trace!(%suffix, %addr, "suffix cache hit");
                        return Some((addr, suffix));
                    }
                    Ok(name) => {
                        trace!(
                            %suffix, %name,
                            "cached suffix no longer matches reverse mapping"
                        );
                    }
                    Err(err) => {
                        trace!(%suffix, %err, "reverse lookup failed");
                    }
                }
            }
            suffix = match suffix.split_once('.') {
                Some((_, rest)) => rest,
                None => return None,
            };
        }
    }

    /// Stores or overwrites the entry for `suffix`.
    pub async fn store(&self, suffix: &str, addr: Ipv4Addr) {
        self.entries.insert(suffix.to_string(), addr).await;
    }

    /// Returns the stored address for exactly `suffix`, unvalidated.
    pub async fn peek(&self, suffix: &str) -> Option<Ipv4Addr> {
        self.entries.get(suffix).await
    }
}

impl Default for SuffixCache {
    fn default() -> Self {
        Self::new()
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientFuture;
    use crate::error::Error;
    use std::collections::HashMap;

    /// A client that only answers reverse lookups.
    struct ReverseTable(HashMap<Ipv4Addr, String>);

    impl ReverseTable {
        fn new(entries: &[(Ipv4Addr, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|&(addr, name)| (addr, name.to_string()))
                    .collect(),
            )
        }
    }

    impl Client for ReverseTable {
        fn root_servers(&self) -> Result<Vec<Ipv4Addr>, Error> {
            Ok(Vec::new())
        }

        fn resolve_label<'a>(
            &'a self,
            _server: Ipv4Addr,
            label: &'a str,
        ) -> ClientFuture<'a, Ipv4Addr> {
            Box::pin(async move { Err(Error::LookupFailed(label.into())) })
        }

        fn reverse_lookup(&self, addr: Ipv4Addr) -> ClientFuture<'_, String> {
            Box::pin(async move {
                self.0
                    .get(&addr)
                    .cloned()
                    .ok_or_else(|| Error::LookupFailed(addr.to_string()))
            })
        }
    }

    const A1: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 1);
    const A2: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 2);

    #[tokio::test]
    async fn longest_valid_suffix_wins() {
        let client = ReverseTable::new(&[(A1, "b.c"), (A2, "c")]);
        let cache = SuffixCache::new();
        cache.store("b.c", A1).await;
        cache.store("c", A2).await;

        assert_eq!(cache.lookup(&client, "a.b.c").await, Some((A1, "b.c")));
    }

    #[tokio::test]
    async fn full_domain_can_match() {
        let client = ReverseTable::new(&[(A1, "a.b.c")]);
        let cache = SuffixCache::new();
        cache.store("a.b.c", A1).await;

        assert_eq!(cache.lookup(&client, "a.b.c").await, Some((A1, "a.b.c")));
    }

    #[tokio::test]
    async fn stale_entry_is_skipped() {
        // The reverse mapping for A1 moved elsewhere; the shorter suffix
        // must be found instead.
        let client = ReverseTable::new(&[(A1, "evil.example"), (A2, "c")]);
        let cache = SuffixCache::new();
        cache.store("b.c", A1).await;
        cache.store("c", A2).await;

        assert_eq!(cache.lookup(&client, "a.b.c").await, Some((A2, "c")));
    }

    #[tokio::test]
    async fn reverse_failure_is_a_miss() {
        let client = ReverseTable::new(&[]);
        let cache = SuffixCache::new();
        cache.store("b.c", A1).await;

        assert_eq!(cache.lookup(&client, "a.b.c").await, None);
    }

    #[tokio::test]
    async fn empty_cache_misses() {
        let client = ReverseTable::new(&[]);
        let cache = SuffixCache::new();

        assert_eq!(cache.lookup(&client, "a.b.c").await, None);
    }

    #[tokio::test]
    async fn store_overwrites() {
        let client = ReverseTable::new(&[(A2, "c")]);
        let cache = SuffixCache::new();
        cache.store("c", A1).await;
        cache.store("c", A2).await;

        assert_eq!(cache.peek("c").await, Some(A2));
        assert_eq!(cache.lookup(&client, "c").await, Some((A2, "c")));
    }
}

//! Memoization of function results on top of [`ExpiringMap`].
//!
//! Arguments are rendered to canonical JSON and hashed; the hash is the map
//! key. Only return values are cached: side effects of the wrapped function
//! are not replayed on a hit.
//!
//! Positional order matters, `(1, 2)` and `(2, 1)` are different calls.
//! Keyword-style arguments should be passed as a struct (fields render in
//! declaration order) or a `BTreeMap`. A `HashMap` renders in arbitrary
//! order and would defeat the cache.
//!
//! Two different argument lists can hash to the same key. The rendered
//! arguments are stored next to each result and compared on lookup, so a
//! collision is treated as a miss and recomputed rather than answered with
//! the other call's result.

use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::map::ExpiringMap;
use crate::ttl::TtlConfig;

#[derive(Debug, Clone)]
struct Slot<R> {
    args: String,
    value: R,
}

/// Cache of results keyed by argument lists
#[derive(Debug)]
pub struct Memoizer<R> {
    map: ExpiringMap<u64, Slot<R>>,
}

impl<R> Memoizer<R>
where
    R: Clone,
{
    /// Creates a memoizer whose results live for the configured duration.
    ///
    /// An unset config keeps results forever.
    pub fn new(config: &TtlConfig) -> Result<Self> {
        Ok(Self {
            map: ExpiringMap::with_config(config)?,
        })
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            map: ExpiringMap::with_ttl(ttl),
        }
    }

    /// Returns the cached result for `args`, or runs `compute` and caches
    /// what it returns.
    ///
    /// `compute` runs without the lock held, so concurrent misses on the
    /// same arguments may each compute; the last one stored wins.
    pub fn get_or_compute<A, F>(&self, args: &A, compute: F) -> Result<R>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> R,
    {
        let (key, rendered) = cache_key(args)?;
        if let Some(value) = self.lookup(key, &rendered) {
            return Ok(value);
        }

        let value = compute();
        self.store(key, rendered, value.clone());
        Ok(value)
    }

    /// Async variant of [`get_or_compute`](Self::get_or_compute)
    pub async fn get_or_load<A, F, Fut>(&self, args: &A, load: F) -> Result<R>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let (key, rendered) = cache_key(args)?;
        if let Some(value) = self.lookup(key, &rendered) {
            return Ok(value);
        }

        let value = load().await;
        self.store(key, rendered, value.clone());
        Ok(value)
    }

    /// Drops the cached result for `args`. Returns whether one was cached.
    pub fn invalidate<A>(&self, args: &A) -> Result<bool>
    where
        A: Serialize + ?Sized,
    {
        let (key, rendered) = cache_key(args)?;
        Ok(self.lookup(key, &rendered).is_some() && self.map.delete(&key).is_ok())
    }

    /// Number of cached results, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&self) {
        self.map.clear();
    }

    fn lookup(&self, key: u64, rendered: &str) -> Option<R> {
        match self.map.get_opt(&key) {
            Some(slot) if slot.args == rendered => {
                trace!(key, "memo hit");
                Some(slot.value)
            }
            Some(_) => {
                debug!(key, "memo key collision, recomputing");
                None
            }
            None => {
                debug!(key, "memo miss");
                None
            }
        }
    }

    fn store(&self, key: u64, args: String, value: R) {
        self.map.insert(key, Slot { args, value });
    }
}

fn cache_key<A>(args: &A) -> Result<(u64, String)>
where
    A: Serialize + ?Sized,
{
    let rendered = serde_json::to_string(args)?;
    let mut hasher = DefaultHasher::new();
    rendered.hash(&mut hasher);
    Ok((hasher.finish(), rendered))
}

/// A function wrapped with a [`Memoizer`].
///
/// ```
/// use expiring_map::{Memoized, TtlConfig};
///
/// let square = Memoized::new(|x: u64| x * x, &TtlConfig::new().hours(1)).unwrap();
/// assert_eq!(square.call(5).unwrap(), 25);
/// assert_eq!(square.call(5).unwrap(), 25);
/// assert_eq!(square.memoizer().len(), 1);
/// ```
pub struct Memoized<F, R> {
    func: F,
    memo: Memoizer<R>,
}

impl<F, R> Memoized<F, R>
where
    R: Clone,
{
    pub fn new(func: F, config: &TtlConfig) -> Result<Self> {
        Ok(Self {
            func,
            memo: Memoizer::new(config)?,
        })
    }

    pub fn with_ttl(func: F, ttl: Duration) -> Self {
        Self {
            func,
            memo: Memoizer::with_ttl(ttl),
        }
    }

    /// Calls the wrapped function, or returns its cached result for `args`.
    ///
    /// Several arguments are passed as a tuple.
    pub fn call<A>(&self, args: A) -> Result<R>
    where
        A: Serialize,
        F: Fn(A) -> R,
    {
        let (key, rendered) = cache_key(&args)?;
        if let Some(value) = self.memo.lookup(key, &rendered) {
            return Ok(value);
        }

        let value = (self.func)(args);
        self.memo.store(key, rendered, value.clone());
        Ok(value)
    }

    pub fn memoizer(&self) -> &Memoizer<R> {
        &self.memo
    }
}

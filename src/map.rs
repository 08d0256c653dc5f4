use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{CacheError, Result};
use crate::ttl::{Ttl, TtlConfig};

/// Returns true when `t` is set and lies strictly before the current time.
///
/// `None` means "never expires" and is never in the past.
pub fn is_past(t: Option<SystemTime>) -> bool {
    is_past_at(t, SystemTime::now())
}

fn is_past_at(t: Option<SystemTime>, now: SystemTime) -> bool {
    t.is_some_and(|t| t < now)
}

/// A stored value together with its creation and expiration times
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    value: V,
    created_at: SystemTime,
    expires_at: Option<SystemTime>,
}

impl<V> Entry<V> {
    /// Creates a new entry
    pub fn new(value: V, created_at: SystemTime, expires_at: Option<SystemTime>) -> Self {
        Self {
            value,
            created_at,
            expires_at,
        }
    }

    /// Creates an entry that expires after the given duration, starting now
    pub fn with_duration(value: V, duration: Duration) -> Self {
        let created_at = SystemTime::now();
        Self::new(value, created_at, created_at.checked_add(duration))
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Checks if this entry has expired
    pub fn is_expired(&self) -> bool {
        is_past(self.expires_at)
    }

    fn is_expired_at(&self, now: SystemTime) -> bool {
        is_past_at(self.expires_at, now)
    }
}

/// A thread-safe map whose entries expire.
///
/// Expired entries are not swept in the background. They stay in the map,
/// and count towards [`len`](Self::len), until a read path
/// ([`get`](Self::get), [`get_or`](Self::get_or), [`contains`](Self::contains), ...)
/// runs into them or [`purge`](Self::purge) is called.
///
/// Every operation holds one map-wide lock for its whole body. The lock is
/// not reentrant, so no operation calls another locking operation while it
/// holds the guard.
///
/// ```
/// use expiring_map::{ExpiringMap, Ttl};
/// use std::time::Duration;
///
/// let map = ExpiringMap::with_ttl(Duration::from_secs(60));
/// map.put("spam", 42, Ttl::Never);
/// map.put("eggs", 2, Ttl::After(Duration::from_secs(2)));
/// map.insert("beer", 100);
///
/// assert_eq!(map.get("spam").unwrap(), 42);
/// assert_eq!(map.get_or("toast", 0), 0);
/// assert_eq!(map.pop("beer"), Some(100));
/// ```
#[derive(Debug)]
pub struct ExpiringMap<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    default_ttl: Option<Duration>,
}

impl<K, V> Default for ExpiringMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: None,
        }
    }
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a map without a default lifetime: entries inserted with
    /// [`Ttl::Default`] never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map whose entries expire after `ttl` unless told otherwise
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: Some(ttl),
        }
    }

    /// Creates a map whose default lifetime comes from a [`TtlConfig`].
    ///
    /// An unset config behaves like [`ExpiringMap::new`].
    pub fn with_config(config: &TtlConfig) -> Result<Self> {
        Ok(Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: config.to_duration()?,
        })
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: K, value: V, ttl: Ttl) {
        let mut entries = self.entries.lock();

        let created_at = SystemTime::now();
        let lifetime = match ttl {
            Ttl::Never => None,
            Ttl::After(duration) => Some(duration),
            Ttl::Default => self.default_ttl,
        };
        // A lifetime past the end of representable time never expires.
        let expires_at = lifetime.and_then(|d| created_at.checked_add(d));

        entries.insert(key, Entry::new(value, created_at, expires_at));
    }

    /// Stores `value` under `key` with the default lifetime
    pub fn insert(&self, key: K, value: V) {
        self.put(key, value, Ttl::Default);
    }

    /// Returns the live entry for `key`.
    ///
    /// An expired entry is removed and reported as [`CacheError::KeyNotFound`].
    pub fn get_entry<Q>(&self, key: &Q) -> Result<Entry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut entries = self.entries.lock();
        live_entry(&mut *entries, key)
            .cloned()
            .ok_or(CacheError::KeyNotFound)
    }

    /// Returns the value for `key`.
    ///
    /// Fails with [`CacheError::KeyNotFound`] if the key is absent, or if it
    /// had expired (the entry is removed in that case).
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_entry(key).map(Entry::into_value)
    }

    /// Like [`get`](Self::get), but absence and expiry yield `None`
    pub fn get_opt<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut entries = self.entries.lock();
        live_entry(&mut *entries, key).map(|entry| entry.value.clone())
    }

    /// Like [`get`](Self::get), but absence and expiry yield `default`
    pub fn get_or<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_opt(key).unwrap_or(default)
    }

    /// Returns true if `key` holds a live entry.
    ///
    /// Not read-only: an expired entry found here is removed.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.entries.lock();
        live_entry(&mut *entries, key).is_some()
    }

    /// Removes `key` whether or not it has expired
    pub fn delete<Q>(&self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .lock()
            .remove(key)
            .map(|_| ())
            .ok_or(CacheError::KeyNotFound)
    }

    /// Number of stored entries, counting expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Replaces the expiration time of an existing entry, keeping its value
    /// and creation time.
    ///
    /// A time already in the past is accepted; the entry is then dropped by
    /// the next read that touches it.
    pub fn set_expiration<Q>(&self, key: &Q, expires_at: SystemTime) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(key).ok_or(CacheError::KeyNotFound)?;
        entry.expires_at = Some(expires_at);
        Ok(())
    }

    /// Removes every expired entry and returns how many were removed.
    ///
    /// All entries are judged against a single reading of the clock.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = SystemTime::now();

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "purged expired entries");
        }
        removed
    }

    /// Purges, then returns the surviving keys.
    ///
    /// The purge and the read are two separate critical sections. Another
    /// thread may insert in between, and its key may or may not show up.
    pub fn keys(&self) -> HashSet<K>
    where
        K: Clone,
    {
        self.purge();
        self.entries.lock().keys().cloned().collect()
    }

    /// Purges, then returns the surviving values.
    ///
    /// Same two-step behavior as [`keys`](Self::keys).
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.purge();
        self.entries
            .lock()
            .values()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Removes `key` and returns its value.
    ///
    /// The entry is removed even when it has expired, but an expired value
    /// is not handed out: `None` is returned instead.
    pub fn pop<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.entries.lock();
        let entry = entries.remove(key)?;
        if entry.is_expired() {
            trace!("popped expired entry");
            None
        } else {
            Some(entry.value)
        }
    }

    /// Like [`pop`](Self::pop), with `default` standing in for absent or
    /// expired values
    pub fn pop_or<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.pop(key).unwrap_or(default)
    }

    /// Removes every entry
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        debug!(removed = entries.len(), "cleared map");
        entries.clear();
    }
}

/// Looks `key` up, evicting it if it has expired. Caller holds the lock.
fn live_entry<'a, K, V, Q>(entries: &'a mut HashMap<K, Entry<V>>, key: &Q) -> Option<&'a Entry<V>>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    if entries.get(key)?.is_expired() {
        entries.remove(key);
        trace!("evicted expired entry on read");
        return None;
    }
    entries.get(key)
}

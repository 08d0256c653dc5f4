//! A thread-safe map with expiring entries, and a memoizer built on it
//!
//! [`ExpiringMap`] stores values together with an expiration time. Nothing
//! runs in the background: expired entries are thrown out when a read
//! stumbles on them, or in bulk by [`ExpiringMap::purge`].
//!
//! [`Memoizer`] and [`Memoized`] cache function results in an
//! [`ExpiringMap`] keyed by a hash of the arguments.

pub mod error;
pub mod map;
pub mod memoize;
pub mod ttl;

pub use error::{CacheError, Result};
pub use map::{is_past, Entry, ExpiringMap};
pub use memoize::{Memoized, Memoizer};
pub use ttl::{Ttl, TtlConfig};

//! Type aliases for commonly used shared-state types.
//!
//! The editing session itself lives on the interaction thread. Bakes may run
//! on a worker, so the bookkeeping they touch is wrapped in these aliases.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkstamp_core::types::*;
//!
//! let in_flight: ThreadSafeSet<usize> = thread_safe_set();
//! ```

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// =============================================================================
// THREAD-SAFE SHARED COLLECTIONS (Arc<Mutex<_>>)
// =============================================================================

/// A thread-safe hash map for cross-thread key-value storage.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafeMap<K, V> = Arc<Mutex<HashMap<K, V>>>;

/// A thread-safe hash set, used to track which pages are busy.
pub type ThreadSafeSet<T> = Arc<Mutex<HashSet<T>>>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Create a new empty `ThreadSafeMap<K, V>`.
#[inline]
pub fn thread_safe_map<K, V>() -> ThreadSafeMap<K, V> {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Create a new empty `ThreadSafeSet<T>`.
#[inline]
pub fn thread_safe_set<T>() -> ThreadSafeSet<T> {
    Arc::new(Mutex::new(HashSet::new()))
}

//! Per-session key/value store surviving render-function re-invocations
//!
//! The UI runs under a re-render-loop model: the render function is
//! called from scratch on every interaction. `SessionState` is the
//! explicit replacement for framework-level implicit persistence - the
//! surrounding UI driver owns one instance per user session and passes
//! it by mutable reference into the core on every pass.

use std::any::Any;
use std::collections::HashMap;
use tracing::debug;

/// String-keyed store for one user session.
///
/// Values are type-erased so unrelated components can share the map.
/// There is no eviction beyond explicit [`remove`](Self::remove);
/// cardinality is O(1) per session (one readiness outcome, one
/// prediction outcome and their pending task handles), so the map is
/// unbounded for the session's lifetime. Dropping the whole state at
/// session end is the caller's job.
#[derive(Default)]
pub struct SessionState {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl SessionState {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key. Returns `None` when the key is absent
    /// or holds a value of a different type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref())
    }

    /// Mutable lookup, same typing rules as [`get`](Self::get).
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Store a value under `key`, replacing and dropping any previous
    /// entry.
    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        debug!("session state set '{}'", key);
        self.entries.insert(key, Box::new(value));
    }

    /// Remove the entry for `key`, dropping the stored value. Dropping
    /// releases whatever the value owns (temp files, task handles).
    /// Returns whether an entry existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            debug!("session state removed '{}'", key);
        }
        existed
    }

    /// Whether any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live entries, mainly for diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("SessionState").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn set_get_roundtrip() {
        let mut state = SessionState::new();
        assert!(state.is_empty());

        state.set("answer", 42u32);
        assert_eq!(state.get::<u32>("answer"), Some(&42));
        assert!(state.contains("answer"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn get_with_wrong_type_is_absent() {
        let mut state = SessionState::new();
        state.set("answer", 42u32);
        assert_eq!(state.get::<String>("answer"), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut state = SessionState::new();
        state.set("key", "first".to_string());
        state.set("key", "second".to_string());
        assert_eq!(state.get::<String>("key").map(String::as_str), Some("second"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn remove_drops_owned_resources() {
        struct Guard(Arc<AtomicUsize>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let mut state = SessionState::new();
        state.set("guard", Guard(Arc::clone(&drops)));

        assert!(state.remove("guard"));
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(!state.remove("guard"));
    }

    #[test]
    fn get_mut_allows_in_place_update() {
        let mut state = SessionState::new();
        state.set("count", 1u32);
        if let Some(count) = state.get_mut::<u32>("count") {
            *count += 1;
        }
        assert_eq!(state.get::<u32>("count"), Some(&2));
    }
}

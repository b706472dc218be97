//! Latest-value tracking.
//!
//! `Current` is the explicit home for "most recent X" state that would
//! otherwise hide inside an event handler. Readers take a cheap atomic
//! snapshot; writers replace the whole value.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Holds the most recently observed value of type `T`.
#[derive(Debug)]
pub struct Current<T> {
    slot: ArcSwapOption<T>,
}

impl<T> Current<T> {
    /// Create an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Replace the held value.
    pub fn set(&self, value: Arc<T>) {
        self.slot.store(Some(value));
    }

    /// Snapshot the held value, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    /// Drop the held value.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Check whether a value is held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl<T> Default for Current<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_starts_empty() {
        let current: Current<String> = Current::new();
        assert!(!current.is_set());
        assert!(current.get().is_none());
    }

    #[test]
    fn test_current_set_and_get() {
        let current = Current::new();
        current.set(Arc::new("first".to_string()));
        assert_eq!(current.get().unwrap().as_str(), "first");

        current.set(Arc::new("second".to_string()));
        assert_eq!(current.get().unwrap().as_str(), "second");
    }

    #[test]
    fn test_current_clear() {
        let current = Current::new();
        current.set(Arc::new(42));
        assert!(current.is_set());

        current.clear();
        assert!(!current.is_set());
    }

    #[test]
    fn test_current_snapshot_outlives_replacement() {
        let current = Current::new();
        current.set(Arc::new(1));

        let snapshot = current.get().unwrap();
        current.set(Arc::new(2));

        // The old snapshot is still readable
        assert_eq!(*snapshot, 1);
        assert_eq!(*current.get().unwrap(), 2);
    }
}

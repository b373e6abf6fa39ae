//! Scoped query cursors.
//!
//! A [`Cursor`] is a finite, non-restartable sequence over a query result.
//! Opening one registers it with the invocation's [`CursorTracker`]; it is
//! released by [`Cursor::close`] or, on any other exit path, when dropped.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::LedgerResult;

/// Counts the cursors currently open within one invocation.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    open: Arc<AtomicUsize>,
}

impl CursorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cursors opened and not yet released.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::Acquire)
    }
}

/// Releases its slot in the tracker exactly once.
#[derive(Debug)]
struct Release {
    open: Arc<AtomicUsize>,
}

impl Drop for Release {
    fn drop(&mut self) {
        let before = self.open.fetch_sub(1, Ordering::AcqRel);
        tracing::debug!(still_open = before.saturating_sub(1), "Cursor released");
    }
}

/// Lazy, single-pass sequence of query results.
#[derive(Debug)]
pub struct Cursor<T> {
    items: std::vec::IntoIter<T>,
    release: Option<Release>,
}

impl<T> Cursor<T> {
    /// Open a cursor over `items`, registered with `tracker`.
    #[must_use]
    pub fn new(items: Vec<T>, tracker: &CursorTracker) -> Self {
        tracker.open.fetch_add(1, Ordering::AcqRel);
        Self {
            items: items.into_iter(),
            release: Some(Release {
                open: Arc::clone(&tracker.open),
            }),
        }
    }

    /// Results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Release the cursor explicitly.
    pub fn close(mut self) {
        self.release.take();
    }

    /// Drain every result, then release.
    ///
    /// Stops at the first error; the cursor is released either way.
    pub fn collect_all(mut self) -> LedgerResult<Vec<T>> {
        let mut out = Vec::with_capacity(self.remaining());
        for item in self.by_ref() {
            out.push(item?);
        }
        self.close();
        Ok(out)
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = LedgerResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_releases_slot() {
        let tracker = CursorTracker::new();
        let cursor = Cursor::new(vec![1, 2, 3], &tracker);
        assert_eq!(tracker.open_count(), 1);
        cursor.close();
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn drop_releases_slot_on_early_exit() {
        let tracker = CursorTracker::new();
        {
            let mut cursor = Cursor::new(vec!["a", "b"], &tracker);
            assert_eq!(cursor.next().unwrap().unwrap(), "a");
            assert_eq!(tracker.open_count(), 1);
        }
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn collect_all_drains_and_releases() {
        let tracker = CursorTracker::new();
        let a = Cursor::new(vec![1, 2], &tracker);
        let b = Cursor::new(vec![3], &tracker);
        assert_eq!(tracker.open_count(), 2);
        assert_eq!(a.collect_all().unwrap(), vec![1, 2]);
        assert_eq!(tracker.open_count(), 1);
        drop(b);
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn cursor_is_not_restartable() {
        let tracker = CursorTracker::new();
        let mut cursor = Cursor::new(vec![1], &tracker);
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_none());
        assert!(cursor.next().is_none());
        assert_eq!(cursor.remaining(), 0);
    }
}

//! Bounded history of widget creation and disposal.
//!
//! [`Context`](super::Context) appends an entry when a widget enters the
//! tree and when it leaves it. Only the most recent entries are kept, so a
//! long-running `Ui` that never drains the log does not grow without bound.

use std::collections::VecDeque;

use tracing::trace;

use super::WidgetId;
use crate::logging::targets;

/// Entries kept when no capacity is configured.
pub const DEFAULT_LIFECYCLE_HISTORY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created { id: WidgetId },
    Disposed { id: WidgetId },
}

/// Ring buffer of [`LifecycleEvent`]s; the oldest entry falls out first.
#[derive(Debug)]
pub struct LifecycleLog {
    entries: VecDeque<LifecycleEvent>,
    capacity: usize,
}

impl Default for LifecycleLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LIFECYCLE_HISTORY)
    }
}

impl LifecycleLog {
    /// A log holding at most `capacity` entries. Zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LIFECYCLE_HISTORY)),
            capacity,
        }
    }

    /// Change the bound, dropping the oldest entries that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn created(&mut self, id: WidgetId) {
        self.record(LifecycleEvent::Created { id });
    }

    pub fn disposed(&mut self, id: WidgetId) {
        self.record(LifecycleEvent::Disposed { id });
    }

    fn record(&mut self, event: LifecycleEvent) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(event);
        self.trim();
    }

    fn trim(&mut self) {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.entries.drain(..excess);
            trace!(target: targets::WIDGET, dropped = excess, "lifecycle history full");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every entry, oldest first.
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        self.entries.drain(..).collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<WidgetId> {
        let mut map = SlotMap::<WidgetId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn drain_returns_entries_oldest_first() {
        let ids = ids(2);
        let (a, b) = (ids[0], ids[1]);
        let mut log = LifecycleLog::default();
        log.created(a);
        log.created(b);
        log.disposed(a);

        assert_eq!(
            log.drain(),
            vec![
                LifecycleEvent::Created { id: a },
                LifecycleEvent::Created { id: b },
                LifecycleEvent::Disposed { id: a },
            ]
        );
        assert!(log.is_empty());
    }

    #[test]
    fn full_log_drops_oldest() {
        let ids = ids(5);
        let mut log = LifecycleLog::with_capacity(2);
        for &id in &ids {
            log.created(id);
        }
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.drain(),
            vec![
                LifecycleEvent::Created { id: ids[3] },
                LifecycleEvent::Created { id: ids[4] },
            ]
        );
    }

    #[test]
    fn shrinking_capacity_trims_and_zero_disables() {
        let ids = ids(3);
        let mut log = LifecycleLog::default();
        for &id in &ids {
            log.disposed(id);
        }
        log.set_capacity(1);
        assert_eq!(log.drain(), vec![LifecycleEvent::Disposed { id: ids[2] }]);

        log.set_capacity(0);
        log.created(ids[0]);
        assert!(log.is_empty());
    }
}

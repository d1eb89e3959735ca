//! Observer lists: [`EventPublisher`] and its subscription side, [`Event`].
//!
//! A widget owns one `EventPublisher` per kind of notification and hands out
//! the matching [`Event`] so application code can subscribe. Publishing is
//! synchronous and runs on the UI thread:
//!
//! - observers run in subscription order;
//! - the observer list is snapshotted before the first call, so observers may
//!   subscribe or unsubscribe while a publish is running without affecting it;
//! - there is no error containment: a panicking observer unwinds through
//!   [`EventPublisher::publish`] and the remaining observers do not run;
//! - an observer that is still running when the same event is published again
//!   (re-entrant publish) is skipped for the nested publish.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::logging::targets;

/// Identifies one subscription on one [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Rc<RefCell<dyn FnMut()>>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer)>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Subscription side of an [`EventPublisher`].
///
/// Cloning an `Event` yields another handle to the same observer list.
#[derive(Clone, Default)]
pub struct Event {
    observers: Rc<RefCell<Observers>>,
}

impl Event {
    /// Register `observer`; it runs on every subsequent publish.
    pub fn subscribe(&self, observer: impl FnMut() + 'static) -> SubscriptionId {
        let mut observers = self.observers.borrow_mut();
        let id = SubscriptionId(observers.next_id);
        observers.next_id += 1;
        let observer: Observer = Rc::new(RefCell::new(observer));
        observers.entries.push((id, observer));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.entries.len();
        observers.entries.retain(|(entry, _)| *entry != id);
        observers.entries.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.observers.borrow().entries.len()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventPublisher
// ---------------------------------------------------------------------------

/// Publishing side of an observer list.
#[derive(Debug, Default)]
pub struct EventPublisher {
    event: Event,
}

impl EventPublisher {
    /// A publisher with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The subscription side, for handing to application code.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Call every observer subscribed at the time of the call.
    pub fn publish(&self) {
        let snapshot: Vec<Observer> = self
            .event
            .observers
            .borrow()
            .entries
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        trace!(target: targets::EVENT, observers = snapshot.len(), "publish");

        for observer in snapshot {
            match observer.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(),
                Err(_) => trace!(target: targets::EVENT, "skipping observer already running"),
            }
        }
    }

    /// Detach every observer.
    pub fn clear(&self) {
        self.event.observers.borrow_mut().entries.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    fn counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn publish_without_observers_is_noop() {
        let publisher = EventPublisher::new();
        publisher.publish();
        assert_eq!(publisher.event().subscriber_count(), 0);
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let publisher = EventPublisher::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            publisher.event().subscribe(move || log.borrow_mut().push(name));
        }
        publisher.publish();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn every_publish_reaches_every_observer() {
        let publisher = EventPublisher::new();
        let hits = counter();
        let h = Rc::clone(&hits);
        publisher.event().subscribe(move || h.set(h.get() + 1));
        publisher.publish();
        publisher.publish();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let publisher = EventPublisher::new();
        let hits = counter();
        let h = Rc::clone(&hits);
        let id = publisher.event().subscribe(move || h.set(h.get() + 1));
        assert!(publisher.event().unsubscribe(id));
        assert!(!publisher.event().unsubscribe(id));
        publisher.publish();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn subscribe_during_publish_waits_for_next_publish() {
        let publisher = EventPublisher::new();
        let late_hits = counter();
        let event = publisher.event().clone();
        let late = Rc::clone(&late_hits);
        let subscribed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&subscribed);
        publisher.event().subscribe(move || {
            if !flag.get() {
                flag.set(true);
                let late = Rc::clone(&late);
                event.subscribe(move || late.set(late.get() + 1));
            }
        });

        publisher.publish();
        assert_eq!(late_hits.get(), 0);
        assert_eq!(publisher.event().subscriber_count(), 2);

        publisher.publish();
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn unsubscribe_during_publish_does_not_skip_snapshot() {
        let publisher = EventPublisher::new();
        let second_hits = counter();
        let second_id = Rc::new(Cell::new(None));

        let event = publisher.event().clone();
        let target = Rc::clone(&second_id);
        publisher.event().subscribe(move || {
            if let Some(id) = target.get() {
                event.unsubscribe(id);
            }
        });
        let hits = Rc::clone(&second_hits);
        second_id.set(Some(publisher.event().subscribe(move || hits.set(hits.get() + 1))));

        publisher.publish();
        assert_eq!(second_hits.get(), 1);
        assert_eq!(publisher.event().subscriber_count(), 1);

        publisher.publish();
        assert_eq!(second_hits.get(), 1);
    }

    #[test]
    fn reentrant_publish_skips_running_observer() {
        let publisher = Rc::new(EventPublisher::new());
        let hits = counter();
        let inner = Rc::clone(&publisher);
        let h = Rc::clone(&hits);
        publisher.event().subscribe(move || {
            h.set(h.get() + 1);
            if h.get() == 1 {
                inner.publish();
            }
        });
        publisher.publish();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    #[should_panic(expected = "observer failed")]
    fn observer_panic_propagates() {
        let publisher = EventPublisher::new();
        publisher.event().subscribe(|| panic!("observer failed"));
        publisher.publish();
    }

    #[test]
    fn clear_detaches_everything() {
        let publisher = EventPublisher::new();
        publisher.event().subscribe(|| {});
        publisher.event().subscribe(|| {});
        publisher.clear();
        assert_eq!(publisher.event().subscriber_count(), 0);
    }

    #[test]
    fn event_debug_shows_count() {
        let publisher = EventPublisher::new();
        publisher.event().subscribe(|| {});
        assert_eq!(format!("{:?}", publisher.event()), "Event { subscribers: 1 }");
    }
}

#![forbid(unsafe_code)]

//! Observable state cells.
//!
//! An [`Observable`] is a shared, single-threaded value with a subscriber list.
//! Writing a new value notifies every subscriber in registration order. This
//! is the only reactivity the drag controller assumes: a host that has its own
//! reactive system mirrors the cells into it by subscribing.
//!
//! # Invariants
//!
//! 1. Subscribers are called after the new value is stored, so a subscriber
//!    reading *any* cell sees the write that triggered it.
//! 2. No borrow of the cell is held while subscribers run; a subscriber may
//!    read or write the cell it is subscribed to.
//! 3. Dropping a [`Subscription`] removes the subscriber. A subscriber removed
//!    while a notification is in progress still sees that notification.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Subscriber writes its own cell | Feedback loop in host code | Nested notification, no panic |
//! | Subscription outlives the cell | Cell dropped first | Dropping the guard is a no-op |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    next_id: Cell<u64>,
}

/// A shared value cell that notifies subscribers when written.
///
/// Cloning an `Observable` produces another handle to the same cell.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Store `value` and notify subscribers unconditionally.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.notify(&value);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Register `f` to run after every write.
    ///
    /// The subscriber stays registered until the returned guard is dropped.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
            }
        })
    }

    fn notify(&self, value: &T) {
        let subscribers: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in subscribers {
            cb(value);
        }
    }
}

impl<T: PartialEq + Clone + 'static> Observable<T> {
    /// Store `value` only if it differs from the current one.
    ///
    /// Returns `true` if the cell was written (and subscribers notified).
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

/// Guard that keeps a subscriber registered.
///
/// Dropping the guard unsubscribes. Guards for cells of different value
/// types share this one type so callers can keep them in a single `Vec`.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set() {
        let cell = Observable::new(1);
        assert_eq!(cell.get(), 1);
        cell.set(2);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn clones_share_the_value() {
        let a = Observable::new(String::from("x"));
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
    }

    #[test]
    fn subscribers_see_new_value() {
        let cell = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = cell.subscribe(move |v| sink.borrow_mut().push(*v));

        cell.set(1);
        cell.set(1);
        cell.set(6);
        assert_eq!(*seen.borrow(), vec![1, 1, 6]);
    }

    #[test]
    fn set_if_changed_skips_equal_values() {
        let cell = Observable::new(3);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = cell.subscribe(move |_| c.set(c.get() + 1));

        assert!(!cell.set_if_changed(3));
        assert!(cell.set_if_changed(4));
        assert_eq!(count.get(), 1);
        assert_eq!(cell.get(), 4);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let cell = Observable::new(0);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = cell.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(cell.subscriber_count(), 1);

        cell.set(1);
        drop(sub);
        cell.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_may_read_and_write_its_own_cell() {
        let cell = Observable::new(0);
        let handle = cell.clone();
        let _sub = cell.subscribe(move |v| {
            if *v < 3 {
                assert_eq!(handle.get(), *v);
                handle.set(*v + 1);
            }
        });
        cell.set(1);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn subscription_outliving_cell_is_harmless() {
        let cell = Observable::new(0);
        let sub = cell.subscribe(|_| {});
        drop(cell);
        sub.cancel();
    }
}

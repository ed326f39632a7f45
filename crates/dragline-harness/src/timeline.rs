#![forbid(unsafe_code)]

//! Publish history of an observable cell.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dragline_core::observable::{Observable, Subscription};

/// Every value a cell published after recording began.
pub struct Timeline<T> {
    values: Rc<RefCell<Vec<T>>>,
    _subscription: Subscription,
}

impl<T: Clone + 'static> Timeline<T> {
    /// Start recording `cell`.
    #[must_use]
    pub fn record(cell: &Observable<T>) -> Self {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        let subscription = cell.subscribe(move |v: &T| sink.borrow_mut().push(v.clone()));
        Self {
            values,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Timeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.borrow().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_publishes_only() {
        let cell = Observable::new(0u32);
        let timeline = Timeline::record(&cell);
        assert!(timeline.is_empty());
        cell.set(1);
        cell.set(1);
        cell.set_if_changed(1);
        cell.set(2);
        assert_eq!(timeline.values(), vec![1, 1, 2]);
        assert_eq!(timeline.last(), Some(2));
    }

    #[test]
    fn dropping_stops_recording() {
        let cell = Observable::new(0u32);
        drop(Timeline::record(&cell));
        assert_eq!(cell.subscriber_count(), 0);
    }
}

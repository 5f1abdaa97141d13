use std::fmt;
use std::panic::{self, AssertUnwindSafe};

// ---------------------------------------------------------------------------
// NotificationBus – synchronous "data changed" fan-out
// ---------------------------------------------------------------------------

/// Opaque subscription handle returned by [`NotificationBus::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut()>;

/// Registered callbacks run in registration order, with no arguments, on
/// the caller's thread.
///
/// A listener that panics is logged and skipped; the remaining listeners
/// are still notified and the panicking listener stays registered.
#[derive(Default)]
pub struct NotificationBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the handle was unknown (already removed).
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify(&mut self) {
        for (id, listener) in &mut self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener()));
            if outcome.is_err() {
                log::error!("listener {:?} panicked during notification; continuing", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();
        for tag in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            bus.add_listener(move || calls.borrow_mut().push(tag));
        }

        bus.notify();
        assert_eq!(*calls.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn same_callback_registered_twice_runs_twice() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = NotificationBus::new();
        let a = {
            let count = Rc::clone(&count);
            bus.add_listener(move || *count.borrow_mut() += 1)
        };
        let b = {
            let count = Rc::clone(&count);
            bus.add_listener(move || *count.borrow_mut() += 1)
        };
        assert_ne!(a, b);

        bus.notify();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = NotificationBus::new();
        let id = {
            let count = Rc::clone(&count);
            bus.add_listener(move || *count.borrow_mut() += 1)
        };

        assert!(bus.remove_listener(id));
        assert!(!bus.remove_listener(id));
        bus.notify();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_rest() {
        let reached = Rc::new(RefCell::new(false));
        let mut bus = NotificationBus::new();
        bus.add_listener(|| panic!("listener failure"));
        {
            let reached = Rc::clone(&reached);
            bus.add_listener(move || *reached.borrow_mut() = true);
        }

        bus.notify();
        assert!(*reached.borrow());
        assert_eq!(bus.listener_count(), 2);
    }
}

//! Synchronous notification channels.
//!
//! A [`Signal`] delivers each emitted value to the listeners subscribed at
//! the time of emission. Late subscribers do not see earlier values. A
//! one-shot signal (see [`Signal::once`]) completes after its first
//! emission and ignores everything after that.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use tokio::sync::oneshot;

pub struct Signal<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

struct Inner<T> {
    listeners: Vec<Listener<T>>,
    once: bool,
    fired: bool,
    completed: bool,
}

struct Listener<T> {
    active: Rc<Cell<bool>>,
    once: bool,
    callback: Rc<dyn Fn(&T)>,
}

/// Keeps a listener registered. Dropping it unsubscribes, unless
/// [`Subscription::detach`] was called.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
    detached: bool,
}

impl Subscription {
    fn inactive() -> Self {
        Self {
            active: Rc::new(Cell::new(false)),
            detached: true,
        }
    }

    /// Stop receiving values.
    pub fn unsubscribe(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Keep the listener registered for the signal's lifetime.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.active.set(false);
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("listeners", &inner.listeners.len())
            .field("once", &inner.once)
            .field("completed", &inner.completed)
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self::with_mode(false)
    }

    /// A signal that completes after its first emission.
    pub fn once() -> Self {
        Self::with_mode(true)
    }

    fn with_mode(once: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                listeners: Vec::new(),
                once,
                fired: false,
                completed: false,
            })),
        }
    }

    fn register(&self, once: bool, callback: Rc<dyn Fn(&T)>) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        if inner.completed {
            return Subscription::inactive();
        }
        inner.listeners.retain(|l| l.active.get());
        let active = Rc::new(Cell::new(true));
        inner.listeners.push(Listener {
            active: Rc::clone(&active),
            once,
            callback,
        });
        Subscription {
            active,
            detached: false,
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.register(false, Rc::new(callback))
    }

    /// Receive only the next emitted value.
    pub fn subscribe_once(&self, callback: impl FnOnce(&T) + 'static) -> Subscription {
        let slot = RefCell::new(Some(callback));
        self.register(
            true,
            Rc::new(move |value: &T| {
                let callback = slot.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(value);
                }
            }),
        )
    }

    pub fn emit(&self, value: &T) {
        let snapshot: Vec<_> = {
            let mut inner = self.inner.borrow_mut();
            if inner.completed {
                return;
            }
            inner.fired = true;
            let snapshot = inner
                .listeners
                .iter()
                .filter(|l| l.active.get())
                .map(|l| (Rc::clone(&l.active), l.once, Rc::clone(&l.callback)))
                .collect();
            if inner.once {
                inner.completed = true;
                inner.listeners.clear();
            }
            snapshot
        };

        // No borrow is held here: listeners may subscribe, unsubscribe or emit.
        for (active, once, callback) in snapshot {
            if !active.get() {
                continue;
            }
            if once {
                active.set(false);
            }
            callback(value);
        }
    }

    /// Drop every listener and refuse further emissions.
    pub fn complete(&self) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.completed = true;
            std::mem::take(&mut inner.listeners)
        };
        for listener in &listeners {
            listener.active.set(false);
        }
    }

    pub fn is_completed(&self) -> bool {
        self.inner.borrow().completed
    }

    /// Whether anything has ever been emitted.
    pub fn has_fired(&self) -> bool {
        self.inner.borrow().fired
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.active.get())
            .count()
    }

    /// Resolves with `true` on the next emission. A one-shot signal that has
    /// already fired resolves with `true` immediately; a signal that
    /// completes without emitting resolves with `false`.
    pub fn wait(&self) -> impl Future<Output = bool> + 'static {
        let ready = {
            let inner = self.inner.borrow();
            if inner.once && inner.fired {
                Some(true)
            } else if inner.completed {
                Some(false)
            } else {
                None
            }
        };

        let (tx, rx) = oneshot::channel::<()>();
        let subscription = match ready {
            Some(_) => None,
            None => Some(self.subscribe_once(move |_| {
                let _ = tx.send(());
            })),
        };

        async move {
            if let Some(ready) = ready {
                return ready;
            }
            let _subscription = subscription;
            rx.await.is_ok()
        }
    }
}

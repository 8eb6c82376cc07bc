//! Cooperative single-threaded event loop with a virtual clock.
//!
//! Work is split into the same phases a browser uses: microtasks (and local
//! futures), animation frames, render passes followed by after-render
//! callbacks, and timers. Nothing runs until the owner drives the loop with
//! [`EventLoop::run_until_idle`], [`EventLoop::advance`] or
//! [`EventLoop::run_to_completion`].
//!
//! The driving methods are not reentrant: calling them from inside a task
//! panics on the inner `RefCell`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

type Task = Box<dyn FnOnce()>;

/// Handle returned by [`EventLoop::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Handle returned by [`EventLoop::add_render_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHookId(u64);

#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<Inner>,
}

struct Inner {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    microtasks: RefCell<VecDeque<Task>>,
    frames: RefCell<Vec<Task>>,
    after_render: RefCell<Vec<Task>>,
    render_hooks: RefCell<Vec<(RenderHookId, Rc<dyn Fn()>)>>,
    render_requested: Cell<bool>,
    render_count: Cell<u64>,
    /// Keyed by (deadline, id) so equal deadlines fire in scheduling order.
    timers: RefCell<BTreeMap<(Duration, u64), Task>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .field("render_count", &self.render_count())
            .finish()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            inner: Rc::new(Inner {
                now: Cell::new(Duration::ZERO),
                next_id: Cell::new(0),
                microtasks: RefCell::new(VecDeque::new()),
                frames: RefCell::new(Vec::new()),
                after_render: RefCell::new(Vec::new()),
                render_hooks: RefCell::new(Vec::new()),
                render_requested: Cell::new(false),
                render_count: Cell::new(0),
                timers: RefCell::new(BTreeMap::new()),
                pool: RefCell::new(pool),
                spawner,
            }),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        id
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.inner.microtasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run `task` before the next render pass.
    pub fn request_animation_frame(&self, task: impl FnOnce() + 'static) {
        self.inner.frames.borrow_mut().push(Box::new(task));
    }

    /// Run `task` right after the next render pass. Requests a render.
    pub fn after_next_render(&self, task: impl FnOnce() + 'static) {
        self.inner.after_render.borrow_mut().push(Box::new(task));
        self.inner.render_requested.set(true);
    }

    pub fn request_render(&self) {
        self.inner.render_requested.set(true);
    }

    /// Register a callback that runs on every render pass.
    pub fn add_render_hook(&self, hook: impl Fn() + 'static) -> RenderHookId {
        let id = RenderHookId(self.next_id());
        self.inner.render_hooks.borrow_mut().push((id, Rc::new(hook)));
        id
    }

    pub fn remove_render_hook(&self, id: RenderHookId) {
        self.inner.render_hooks.borrow_mut().retain(|(hook, _)| *hook != id);
    }

    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerId {
        let id = self.next_id();
        let deadline = self.now() + delay;
        self.inner
            .timers
            .borrow_mut()
            .insert((deadline, id), Box::new(task));
        TimerId(id)
    }

    pub fn clear_timeout(&self, id: TimerId) {
        self.inner
            .timers
            .borrow_mut()
            .retain(|(_, timer), _| *timer != id.0);
    }

    /// Spawn a future on the loop's local executor. It is polled during the
    /// microtask phase.
    pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) {
        if let Err(e) = self.inner.spawner.spawn_local(future) {
            log::warn!("spawn_local failed: {e}");
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Number of render passes run so far.
    pub fn render_count(&self) -> u64 {
        self.inner.render_count.get()
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .timers
            .borrow()
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Run everything that is due at the current virtual time.
    pub fn run_until_idle(&self) {
        loop {
            self.drain_microtasks();
            if self.run_frames() {
                continue;
            }
            if self.render_pending() {
                self.render();
                continue;
            }
            if self.fire_due_timer() {
                continue;
            }
            break;
        }
    }

    /// Move the clock forward by `duration`, firing timers in deadline order.
    pub fn advance(&self, duration: Duration) {
        let target = self.now() + duration;
        self.run_until_idle();
        while let Some(deadline) = self.next_deadline() {
            if deadline > target {
                break;
            }
            if deadline > self.now() {
                self.inner.now.set(deadline);
            }
            self.run_until_idle();
        }
        self.inner.now.set(target);
        self.run_until_idle();
    }

    /// Advance until no timers remain.
    pub fn run_to_completion(&self) {
        self.run_until_idle();
        while let Some(deadline) = self.next_deadline() {
            if deadline > self.now() {
                self.inner.now.set(deadline);
            }
            self.run_until_idle();
        }
    }

    fn drain_microtasks(&self) {
        loop {
            let task = self.inner.microtasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => {
                    // Local futures may queue microtasks and vice versa.
                    self.inner.pool.borrow_mut().run_until_stalled();
                    if self.inner.microtasks.borrow().is_empty() {
                        break;
                    }
                }
            }
        }
    }

    fn run_frames(&self) -> bool {
        let frames = std::mem::take(&mut *self.inner.frames.borrow_mut());
        if frames.is_empty() {
            return false;
        }
        for frame in frames {
            frame();
            self.drain_microtasks();
        }
        true
    }

    fn render_pending(&self) -> bool {
        self.inner.render_requested.get() || !self.inner.after_render.borrow().is_empty()
    }

    fn render(&self) {
        self.inner.render_requested.set(false);
        self.inner
            .render_count
            .set(self.inner.render_count.get() + 1);
        log::trace!("render pass {}", self.inner.render_count.get());

        let hooks: Vec<_> = self
            .inner
            .render_hooks
            .borrow()
            .iter()
            .map(|(_, hook)| Rc::clone(hook))
            .collect();
        for hook in hooks {
            hook();
        }
        self.drain_microtasks();

        let callbacks = std::mem::take(&mut *self.inner.after_render.borrow_mut());
        for callback in callbacks {
            callback();
            self.drain_microtasks();
        }
    }

    fn fire_due_timer(&self) -> bool {
        let now = self.now();
        let due = {
            let mut timers = self.inner.timers.borrow_mut();
            match timers.keys().next().copied() {
                Some(key) if key.0 <= now => timers.remove(&key),
                _ => None,
            }
        };
        match due {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

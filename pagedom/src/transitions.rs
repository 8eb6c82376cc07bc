//! Class-driven CSS transitions on live nodes.
//!
//! A transition is started by a `start` callback that applies the initial
//! state (usually by toggling classes) and may hand back an end callback.
//! The end callback runs once the transition is over, however it ends.
//! At most one transition runs per node.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use crate::document::{Document, ListenerId, NodeId};
use crate::event::EventType;
use crate::event_loop::TimerId;

/// Grace period after the computed duration before a missing
/// `transitionend` is assumed.
pub const TIMEOUT_MARGIN: Duration = Duration::from_millis(5);

/// What to do when a transition is requested while one is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningTransition {
    /// Let the running transition continue, ignore the new request.
    #[default]
    Continue,
    /// End the running transition now and start the new one.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    pub animation: bool,
    pub running: RunningTransition,
}

impl TransitionOptions {
    pub fn new(animation: bool, running: RunningTransition) -> Self {
        Self { animation, running }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Finished,
    /// Cut short by a later `Stop` request.
    Stopped,
    /// Never started: another transition was already running.
    Skipped,
}

pub type EndFn = Box<dyn FnOnce()>;

type SettleCallback = Box<dyn FnOnce(TransitionOutcome)>;

/// Completion handle for a transition. Clones share the same state.
#[derive(Clone)]
pub struct Transition {
    state: Rc<RefCell<State>>,
}

#[derive(Default)]
struct State {
    outcome: Option<TransitionOutcome>,
    callbacks: Vec<SettleCallback>,
    wakers: Vec<Waker>,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("outcome", &self.outcome())
            .finish()
    }
}

impl Transition {
    pub(crate) fn pending() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// An already settled transition.
    pub fn settled(outcome: TransitionOutcome) -> Self {
        let transition = Self::pending();
        transition.settle(outcome);
        transition
    }

    pub fn finished() -> Self {
        Self::settled(TransitionOutcome::Finished)
    }

    pub fn outcome(&self) -> Option<TransitionOutcome> {
        self.state.borrow().outcome
    }

    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome() == Some(TransitionOutcome::Finished)
    }

    /// Run `callback` when the transition settles, or right away if it
    /// already has.
    pub fn on_settled(&self, callback: impl FnOnce(TransitionOutcome) + 'static) {
        let outcome = self.outcome();
        match outcome {
            Some(outcome) => callback(outcome),
            None => self.state.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    pub(crate) fn settle(&self, outcome: TransitionOutcome) {
        let (callbacks, wakers) = {
            let mut state = self.state.borrow_mut();
            if state.outcome.is_some() {
                return;
            }
            state.outcome = Some(outcome);
            (
                std::mem::take(&mut state.callbacks),
                std::mem::take(&mut state.wakers),
            )
        };
        for callback in callbacks {
            callback(outcome);
        }
        for waker in wakers {
            waker.wake();
        }
    }

    /// Settles once both have settled: `Finished` if both finished,
    /// otherwise the first outcome that was not.
    pub fn join(a: &Transition, b: &Transition) -> Transition {
        let joined = Transition::pending();
        let outcomes: Rc<RefCell<[Option<TransitionOutcome>; 2]>> = Rc::default();

        for (slot, source) in [a, b].into_iter().enumerate() {
            let joined = joined.clone();
            let outcomes = Rc::clone(&outcomes);
            source.on_settled(move |outcome| {
                let both = {
                    let mut outcomes = outcomes.borrow_mut();
                    outcomes[slot] = Some(outcome);
                    match *outcomes {
                        [Some(a), Some(b)] => Some((a, b)),
                        _ => None,
                    }
                };
                if let Some((a, b)) = both {
                    let outcome = match (a, b) {
                        (TransitionOutcome::Finished, other) => other,
                        (other, _) => other,
                    };
                    joined.settle(outcome);
                }
            });
        }
        joined
    }
}

impl Future for Transition {
    type Output = TransitionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        match state.outcome {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                state.wakers.push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Bookkeeping for the transition currently running on a node.
pub(crate) struct Running {
    transition: Transition,
    end: Option<EndFn>,
    listener: ListenerId,
    timer: TimerId,
}

/// Start a transition on `node`.
///
/// `start(doc, node, animation)` applies the start state and optionally
/// returns the callback to run when the transition is over. With animation
/// disabled, or when the node has no computed transition duration, the end
/// callback runs before this returns and the transition is already
/// finished. Otherwise it finishes on the node's own `transitionend`, on a
/// timeout of the computed duration plus [`TIMEOUT_MARGIN`], or on
/// [`complete_transition`], whichever comes first.
pub fn run_transition<S>(
    doc: &Document,
    node: NodeId,
    start: S,
    options: TransitionOptions,
) -> Transition
where
    S: FnOnce(&Document, NodeId, bool) -> Option<EndFn>,
{
    if doc.is_transitioning(node) {
        match options.running {
            RunningTransition::Continue => {
                log::trace!("transition on {node} already running, ignoring request");
                return Transition::settled(TransitionOutcome::Skipped);
            }
            RunningTransition::Stop => {
                log::trace!("stopping running transition on {node}");
                finish(doc, node, TransitionOutcome::Stopped);
            }
        }
    }

    let end = start(doc, node, options.animation);
    let duration = doc.transition_duration(node);

    if !options.animation || duration.is_zero() {
        if let Some(end) = end {
            end();
        }
        return Transition::finished();
    }

    let transition = Transition::pending();

    let weak = doc.downgrade();
    let listener = doc.add_event_listener(node, EventType::TransitionEnd, move |event| {
        // transitionend bubbles up from children with their own transitions
        if event.target != node {
            return;
        }
        if let Some(doc) = weak.upgrade() {
            finish(&doc, node, TransitionOutcome::Finished);
        }
    });

    let weak = doc.downgrade();
    let timer = doc
        .event_loop()
        .set_timeout(duration + TIMEOUT_MARGIN, move || {
            if let Some(doc) = weak.upgrade() {
                finish(&doc, node, TransitionOutcome::Finished);
            }
        });

    log::trace!("transition on {node} started ({duration:?})");
    doc.put_running(
        node,
        Running {
            transition: transition.clone(),
            end,
            listener,
            timer,
        },
    );
    transition
}

/// Finish the transition running on `node` right away. Returns false when
/// nothing was running.
pub fn complete_transition(doc: &Document, node: NodeId) -> bool {
    if !doc.is_transitioning(node) {
        return false;
    }
    finish(doc, node, TransitionOutcome::Finished);
    true
}

fn finish(doc: &Document, node: NodeId, outcome: TransitionOutcome) {
    let Some(running) = doc.take_running(node) else {
        return;
    };
    doc.remove_event_listener(running.listener);
    doc.event_loop().clear_timeout(running.timer);
    if let Some(end) = running.end {
        end();
    }
    running.transition.settle(outcome);
}

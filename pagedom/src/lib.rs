pub mod document;
pub mod element;
pub mod event;
pub mod event_loop;
pub mod focus;
pub mod selector;
pub mod signal;
pub mod stylesheet;
pub mod transitions;

pub use document::{DomError, Document, ListenerId, NodeId, WeakDocument};
pub use element::{Content, Element};
pub use event::{DomEvent, EventKind, EventType, Key, Modifiers, MouseButton};
pub use event_loop::{EventLoop, RenderHookId, TimerId};
pub use selector::{Selector, SelectorError};
pub use signal::{Signal, Subscription};
pub use stylesheet::{Stylesheet, TransitionRule};
pub use transitions::{
    complete_transition, run_transition, EndFn, RunningTransition, Transition,
    TransitionOptions, TransitionOutcome,
};

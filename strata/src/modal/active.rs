//! The handle modal content uses to close itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::modal::DismissReason;
use crate::modal::modal_ref::ModalRecord;
use crate::options::ModalUpdate;

enum Call<R> {
    Close(R),
    Dismiss(DismissReason),
    Update(ModalUpdate),
}

enum Binding<R> {
    /// The modal is still being opened. Calls wait here.
    Pending(Vec<Call<R>>),
    Bound(Weak<ModalRecord<R>>),
}

/// Given to modal content (through the template context or the component
/// scope). Content may call it while the modal is still being opened; such
/// calls are replayed in order once the modal is registered.
pub struct ActiveModal<R> {
    binding: Rc<RefCell<Binding<R>>>,
}

impl<R> Clone for ActiveModal<R> {
    fn clone(&self) -> Self {
        Self {
            binding: Rc::clone(&self.binding),
        }
    }
}

impl<R> fmt::Debug for ActiveModal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.binding.borrow() {
            Binding::Pending(calls) => format!("pending ({} queued)", calls.len()),
            Binding::Bound(_) => "bound".to_string(),
        };
        f.debug_struct("ActiveModal").field("state", &state).finish()
    }
}

impl<R: 'static> ActiveModal<R> {
    pub(crate) fn new() -> Self {
        Self {
            binding: Rc::new(RefCell::new(Binding::Pending(Vec::new()))),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(&*self.binding.borrow(), Binding::Bound(_))
    }

    pub fn close(&self, result: R) {
        self.call(Call::Close(result));
    }

    pub fn dismiss(&self, reason: impl Into<DismissReason>) {
        self.call(Call::Dismiss(reason.into()));
    }

    pub fn update(&self, update: ModalUpdate) {
        self.call(Call::Update(update));
    }

    fn call(&self, call: Call<R>) {
        let record = match &mut *self.binding.borrow_mut() {
            Binding::Pending(calls) => {
                calls.push(call);
                return;
            }
            Binding::Bound(record) => record.upgrade(),
        };
        match record {
            Some(record) => forward(&record, call),
            None => log::debug!("call on an active modal whose stack is gone"),
        }
    }

    /// Route all further calls to `record` and replay the queued ones.
    pub(crate) fn bind(&self, record: &Rc<ModalRecord<R>>) {
        let queued = match std::mem::replace(
            &mut *self.binding.borrow_mut(),
            Binding::Bound(Rc::downgrade(record)),
        ) {
            Binding::Pending(calls) => calls,
            Binding::Bound(_) => Vec::new(),
        };
        if !queued.is_empty() {
            log::debug!("replaying {} early call(s) on modal {}", queued.len(), record.id());
        }
        for call in queued {
            forward(record, call);
        }
    }
}

fn forward<R: 'static>(record: &ModalRecord<R>, call: Call<R>) {
    match call {
        Call::Close(result) => record.close(result),
        Call::Dismiss(reason) => record.dismiss(reason),
        Call::Update(update) => record.update(&update),
    }
}

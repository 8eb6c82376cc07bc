//! Hierarchical typed value container handed to component factories.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Values keyed by type. Lookups fall back to the parent scope.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

#[derive(Default)]
struct ScopeInner {
    values: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
    parent: Option<Scope>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("values", &self.inner.values.borrow().len())
            .field("parent", &self.inner.parent)
            .finish()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new scope whose lookups fall back to this one.
    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                values: RefCell::new(HashMap::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Store `value`, replacing any value of the same type in this scope.
    pub fn provide<T: 'static>(&self, value: T) {
        self.inner
            .values
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(value));
    }

    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let found = current
                .inner
                .values
                .borrow()
                .get(&TypeId::of::<T>())
                .cloned();
            if let Some(value) = found {
                return value.downcast::<T>().ok();
            }
            scope = current.inner.parent.as_ref();
        }
        None
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.get::<T>().is_some()
    }
}

//! Modal windows, their backdrops and the stack that owns them.

pub mod active;
pub mod backdrop;
pub mod modal_ref;
pub mod stack;
pub mod window;

use std::fmt;

use uuid::Uuid;

pub use active::ActiveModal;
pub use backdrop::ModalBackdrop;
pub use modal_ref::{ModalRef, ModalResult, OpenModal};
pub use stack::ModalStack;
pub use window::{ModalWindow, WindowState};

/// Why a modal was dismissed rather than closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Click on the window area outside the dialog.
    BackdropClick,
    /// Escape key.
    Esc,
    Custom(String),
    /// `dismiss_all` or a dismissal without a reason.
    Unspecified,
    /// The modal went away without ever settling, e.g. its stack was
    /// dropped.
    Abandoned,
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DismissReason::BackdropClick => f.write_str("Backdrop click"),
            DismissReason::Esc => f.write_str("Escape"),
            DismissReason::Custom(reason) => f.write_str(reason),
            DismissReason::Unspecified => f.write_str("unspecified"),
            DismissReason::Abandoned => f.write_str("abandoned"),
        }
    }
}

impl From<&str> for DismissReason {
    fn from(reason: &str) -> Self {
        DismissReason::Custom(reason.to_string())
    }
}

impl From<String> for DismissReason {
    fn from(reason: String) -> Self {
        DismissReason::Custom(reason)
    }
}

/// Unique id of an opened modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(Uuid);

impl ModalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ModalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Modal stack errors.

use pagedom::{DomError, SelectorError};
use thiserror::Error;

/// Errors returned by [`ModalStack`](crate::ModalStack) operations.
///
/// Every error is raised before the stack or the page is touched, so a
/// failed `open` leaves nothing behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    /// A container selector matched nothing.
    #[error("The specified modal container \"{0}\" was not found in the DOM.")]
    ContainerNotFound(String),

    /// A container selector could not be parsed.
    #[error("invalid modal container selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    /// The document already has a modal stack.
    #[error("a modal stack is already initialized for this document")]
    StackAlreadyInitialized,

    #[error(transparent)]
    Dom(#[from] DomError),
}

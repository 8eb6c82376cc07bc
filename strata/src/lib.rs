//! Stacked modal dialogs on top of a [`pagedom`] document.
//!
//! ```ignore
//! use strata::prelude::*;
//!
//! let doc = Document::new();
//! let stack = ModalStack::for_document(&doc)?;
//! let modal = stack.open::<()>("Are you sure?", ModalOptions::new().backdrop(BackdropMode::Static))?;
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod host;
pub mod modal;
pub mod options;
pub mod scope;
pub mod util;

pub use config::ModalConfig;
pub use content::{EmbeddedView, ModalContent, Template, TemplateContext};
pub use error::ModalError;
pub use host::{AppHost, Component, ComponentFactory, ComponentHost, Descriptor, View, ViewRef};
pub use modal::{
    ActiveModal, DismissReason, ModalBackdrop, ModalId, ModalRef, ModalResult, ModalStack,
    ModalWindow, OpenModal, WindowState,
};
pub use options::{
    BackdropMode, BeforeDismiss, Container, DismissCheck, Fullscreen, ModalOptions, ModalSize,
    ModalUpdate, WindowOptions,
};
pub use scope::Scope;

pub mod prelude {
    pub use crate::config::ModalConfig;
    pub use crate::content::{ModalContent, TemplateContext};
    pub use crate::error::ModalError;
    pub use crate::host::{AppHost, Component, ComponentHost};
    pub use crate::modal::{ActiveModal, DismissReason, ModalRef, ModalResult, ModalStack};
    pub use crate::options::{BackdropMode, Fullscreen, ModalOptions, ModalSize, ModalUpdate};
    pub use crate::scope::Scope;

    pub use pagedom::{Document, Element, Key, Modifiers, NodeId};
}

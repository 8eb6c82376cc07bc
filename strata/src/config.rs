//! Stack-wide modal defaults.

use crate::options::{BackdropMode, Fullscreen, ModalSize};

/// Defaults applied to every modal opened on a stack.
///
/// Per-call [`ModalOptions`](crate::ModalOptions) win over these.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    /// Play fade/slide transitions.
    pub animation: bool,

    pub backdrop: BackdropMode,

    /// Dismiss on Escape.
    pub keyboard: bool,

    pub scrollable: bool,

    pub centered: bool,

    pub size: Option<ModalSize>,

    pub fullscreen: Fullscreen,

    pub window_class: Option<String>,

    pub modal_dialog_class: Option<String>,

    pub backdrop_class: Option<String>,

    /// ARIA role of the window element.
    pub role: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            animation: true,
            backdrop: BackdropMode::Enabled,
            keyboard: true,
            scrollable: false,
            centered: false,
            size: None,
            fullscreen: Fullscreen::Off,
            window_class: None,
            modal_dialog_class: None,
            backdrop_class: None,
            role: "dialog".into(),
        }
    }
}

impl ModalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animation(mut self, animation: bool) -> Self {
        self.animation = animation;
        self
    }

    /// Disable every transition.
    pub fn no_animation(self) -> Self {
        self.animation(false)
    }

    pub fn backdrop(mut self, backdrop: impl Into<BackdropMode>) -> Self {
        self.backdrop = backdrop.into();
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = scrollable;
        self
    }

    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn fullscreen(mut self, fullscreen: impl Into<Fullscreen>) -> Self {
        self.fullscreen = fullscreen.into();
        self
    }

    pub fn window_class(mut self, class: impl Into<String>) -> Self {
        self.window_class = Some(class.into());
        self
    }

    pub fn modal_dialog_class(mut self, class: impl Into<String>) -> Self {
        self.modal_dialog_class = Some(class.into());
        self
    }

    pub fn backdrop_class(mut self, class: impl Into<String>) -> Self {
        self.backdrop_class = Some(class.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

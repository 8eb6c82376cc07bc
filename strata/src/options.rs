//! Options accepted by [`ModalStack::open`](crate::ModalStack::open) and
//! [`ModalRef::update`](crate::ModalRef::update).

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use pagedom::NodeId;

use crate::config::ModalConfig;
use crate::scope::Scope;

/// Where the backdrop and window are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Element(NodeId),
    /// Resolved with `Document::query_selector` at open time.
    Selector(String),
}

impl From<NodeId> for Container {
    fn from(node: NodeId) -> Self {
        Container::Element(node)
    }
}

impl From<&str> for Container {
    fn from(selector: &str) -> Self {
        Container::Selector(selector.to_string())
    }
}

impl From<String> for Container {
    fn from(selector: String) -> Self {
        Container::Selector(selector)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackdropMode {
    /// Backdrop shown, clicking outside the dialog dismisses.
    #[default]
    Enabled,
    /// No backdrop element at all.
    Disabled,
    /// Backdrop shown, clicks outside and (without keyboard) Escape only
    /// bump the window.
    Static,
}

impl From<bool> for BackdropMode {
    fn from(enabled: bool) -> Self {
        if enabled {
            BackdropMode::Enabled
        } else {
            BackdropMode::Disabled
        }
    }
}

/// Dialog width preset, rendered as `modal-<size>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalSize {
    Sm,
    Lg,
    Xl,
    /// Any other suffix, e.g. a size defined by the application's CSS.
    Custom(String),
}

impl ModalSize {
    pub fn class_suffix(&self) -> &str {
        match self {
            ModalSize::Sm => "sm",
            ModalSize::Lg => "lg",
            ModalSize::Xl => "xl",
            ModalSize::Custom(suffix) => suffix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fullscreen {
    #[default]
    Off,
    /// Always fullscreen (`modal-fullscreen`).
    On,
    /// Fullscreen below a breakpoint (`modal-fullscreen-<bp>-down`).
    Below(String),
}

impl Fullscreen {
    pub fn class(&self) -> Option<String> {
        match self {
            Fullscreen::Off => None,
            Fullscreen::On => Some("modal-fullscreen".into()),
            Fullscreen::Below(breakpoint) => Some(format!("modal-fullscreen-{breakpoint}-down")),
        }
    }
}

impl From<bool> for Fullscreen {
    fn from(on: bool) -> Self {
        if on { Fullscreen::On } else { Fullscreen::Off }
    }
}

impl From<&str> for Fullscreen {
    fn from(breakpoint: &str) -> Self {
        Fullscreen::Below(breakpoint.to_string())
    }
}

/// Answer of a `before_dismiss` predicate.
pub enum DismissCheck {
    Allow,
    Veto,
    /// Decided later; `true` allows the dismissal.
    Deferred(LocalBoxFuture<'static, bool>),
}

impl From<bool> for DismissCheck {
    fn from(allow: bool) -> Self {
        if allow { DismissCheck::Allow } else { DismissCheck::Veto }
    }
}

impl fmt::Debug for DismissCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DismissCheck::Allow => f.write_str("Allow"),
            DismissCheck::Veto => f.write_str("Veto"),
            DismissCheck::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

pub type BeforeDismiss = Rc<dyn Fn() -> DismissCheck>;

/// Per-modal options. Unset fields fall back to the stack's
/// [`ModalConfig`].
#[derive(Clone, Default)]
pub struct ModalOptions {
    pub container: Option<Container>,
    /// Parent scope for component content.
    pub scope: Option<Scope>,
    pub backdrop: Option<BackdropMode>,
    pub keyboard: Option<bool>,
    pub before_dismiss: Option<BeforeDismiss>,
    pub scrollable: Option<bool>,
    pub size: Option<ModalSize>,
    pub centered: Option<bool>,
    pub fullscreen: Option<Fullscreen>,
    pub window_class: Option<String>,
    pub modal_dialog_class: Option<String>,
    pub backdrop_class: Option<String>,
    pub animation: Option<bool>,
    pub aria_labelled_by: Option<String>,
    pub aria_described_by: Option<String>,
    pub role: Option<String>,
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("container", &self.container)
            .field("backdrop", &self.backdrop)
            .field("keyboard", &self.keyboard)
            .field("before_dismiss", &self.before_dismiss.is_some())
            .field("scrollable", &self.scrollable)
            .field("size", &self.size)
            .field("centered", &self.centered)
            .field("fullscreen", &self.fullscreen)
            .field("window_class", &self.window_class)
            .field("modal_dialog_class", &self.modal_dialog_class)
            .field("backdrop_class", &self.backdrop_class)
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(mut self, container: impl Into<Container>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn backdrop(mut self, backdrop: impl Into<BackdropMode>) -> Self {
        self.backdrop = Some(backdrop.into());
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Veto check run before every dismissal. Returning false keeps the
    /// modal open.
    pub fn before_dismiss(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.before_dismiss = Some(Rc::new(move || DismissCheck::from(predicate())));
        self
    }

    /// Asynchronous veto check; the dismissal happens once the future
    /// resolves to true.
    pub fn before_dismiss_async<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        self.before_dismiss = Some(Rc::new(move || DismissCheck::Deferred(Box::pin(predicate()))));
        self
    }

    /// Veto check that decides per call whether to answer now or later.
    pub fn before_dismiss_check(mut self, predicate: impl Fn() -> DismissCheck + 'static) -> Self {
        self.before_dismiss = Some(Rc::new(predicate));
        self
    }

    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = Some(scrollable);
        self
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = Some(centered);
        self
    }

    pub fn fullscreen(mut self, fullscreen: impl Into<Fullscreen>) -> Self {
        self.fullscreen = Some(fullscreen.into());
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

    pub fn animation(mut self, animation: bool) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn aria_labelled_by(mut self, id: impl Into<String>) -> Self {
        self.aria_labelled_by = Some(id.into());
        self
    }

    pub fn aria_described_by(mut self, id: impl Into<String>) -> Self {
        self.aria_described_by = Some(id.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Fill every unset field from `config`.
    pub fn with_defaults(mut self, config: &ModalConfig) -> Self {
        self.backdrop.get_or_insert(config.backdrop);
        self.keyboard.get_or_insert(config.keyboard);
        self.scrollable.get_or_insert(config.scrollable);
        self.centered.get_or_insert(config.centered);
        self.animation.get_or_insert(config.animation);
        self.fullscreen
            .get_or_insert_with(|| config.fullscreen.clone());
        self.role.get_or_insert_with(|| config.role.clone());
        if self.size.is_none() {
            self.size = config.size.clone();
        }
        if self.window_class.is_none() {
            self.window_class = config.window_class.clone();
        }
        if self.modal_dialog_class.is_none() {
            self.modal_dialog_class = config.modal_dialog_class.clone();
        }
        if self.backdrop_class.is_none() {
            self.backdrop_class = config.backdrop_class.clone();
        }
        self
    }
}

/// The options that can change while a modal is open. Unset fields are
/// left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalUpdate {
    pub aria_labelled_by: Option<String>,
    pub aria_described_by: Option<String>,
    pub centered: Option<bool>,
    pub fullscreen: Option<Fullscreen>,
    pub backdrop_class: Option<String>,
    pub size: Option<ModalSize>,
    pub window_class: Option<String>,
    pub modal_dialog_class: Option<String>,
}

impl ModalUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aria_labelled_by(mut self, id: impl Into<String>) -> Self {
        self.aria_labelled_by = Some(id.into());
        self
    }

    pub fn aria_described_by(mut self, id: impl Into<String>) -> Self {
        self.aria_described_by = Some(id.into());
        self
    }

    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = Some(centered);
        self
    }

    pub fn fullscreen(mut self, fullscreen: impl Into<Fullscreen>) -> Self {
        self.fullscreen = Some(fullscreen.into());
        self
    }

    pub fn backdrop_class(mut self, class: impl Into<String>) -> Self {
        self.backdrop_class = Some(class.into());
        self
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
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
}

/// Window-level settings, each applied only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowOptions {
    pub animation: Option<bool>,
    pub aria_labelled_by: Option<String>,
    pub aria_described_by: Option<String>,
    pub backdrop: Option<BackdropMode>,
    pub centered: Option<bool>,
    pub fullscreen: Option<Fullscreen>,
    pub keyboard: Option<bool>,
    pub role: Option<String>,
    pub scrollable: Option<bool>,
    pub size: Option<ModalSize>,
    pub window_class: Option<String>,
    pub modal_dialog_class: Option<String>,
}

impl From<&ModalOptions> for WindowOptions {
    fn from(options: &ModalOptions) -> Self {
        Self {
            animation: options.animation,
            aria_labelled_by: options.aria_labelled_by.clone(),
            aria_described_by: options.aria_described_by.clone(),
            backdrop: options.backdrop,
            centered: options.centered,
            fullscreen: options.fullscreen.clone(),
            keyboard: options.keyboard,
            role: options.role.clone(),
            scrollable: options.scrollable,
            size: options.size.clone(),
            window_class: options.window_class.clone(),
            modal_dialog_class: options.modal_dialog_class.clone(),
        }
    }
}

impl From<&ModalUpdate> for WindowOptions {
    fn from(update: &ModalUpdate) -> Self {
        Self {
            aria_labelled_by: update.aria_labelled_by.clone(),
            aria_described_by: update.aria_described_by.clone(),
            centered: update.centered,
            fullscreen: update.fullscreen.clone(),
            size: update.size.clone(),
            window_class: update.window_class.clone(),
            modal_dialog_class: update.modal_dialog_class.clone(),
            ..Default::default()
        }
    }
}

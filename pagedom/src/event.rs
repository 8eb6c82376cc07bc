use std::cell::Cell;
use std::rc::Rc;

use crate::document::NodeId;

/// Which listeners an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    MouseDown,
    MouseUp,
    Click,
    FocusIn,
    FocusOut,
    TransitionEnd,
}

/// Event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyDown { key: Key, modifiers: Modifiers },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    Click { button: MouseButton },
    /// Element gained focus (bubbles)
    FocusIn,
    /// Element lost focus (bubbles)
    FocusOut,
    TransitionEnd,
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::KeyDown { .. } => EventType::KeyDown,
            EventKind::MouseDown { .. } => EventType::MouseDown,
            EventKind::MouseUp { .. } => EventType::MouseUp,
            EventKind::Click { .. } => EventType::Click,
            EventKind::FocusIn => EventType::FocusIn,
            EventKind::FocusOut => EventType::FocusOut,
            EventKind::TransitionEnd => EventType::TransitionEnd,
        }
    }
}

/// An event as seen by one listener.
///
/// Clones share the `default_prevented` and propagation flags, so a listener
/// that keeps the event around (e.g. until the next animation frame) sees
/// what later listeners did with it.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
    pub current_target: NodeId,
    default_prevented: Rc<Cell<bool>>,
    propagation_stopped: Rc<Cell<bool>>,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: Rc::new(Cell::new(false)),
            propagation_stopped: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn at(&self, current_target: NodeId) -> Self {
        Self {
            current_target,
            ..self.clone()
        }
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn key(&self) -> Option<Key> {
        match self.kind {
            EventKind::KeyDown { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self.kind {
            EventKind::KeyDown { modifiers, .. } => modifiers,
            _ => Modifiers::default(),
        }
    }
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    /// A key with no DOM name here (media keys, lone modifiers, ...).
    Unidentified,
}

impl Key {
    /// The DOM `KeyboardEvent.key` name.
    pub fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Enter => "Enter".into(),
            Key::Backspace => "Backspace".into(),
            Key::Delete => "Delete".into(),
            Key::Tab | Key::BackTab => "Tab".into(),
            Key::Escape => "Escape".into(),
            Key::Up => "ArrowUp".into(),
            Key::Down => "ArrowDown".into(),
            Key::Left => "ArrowLeft".into(),
            Key::Right => "ArrowRight".into(),
            Key::Home => "Home".into(),
            Key::End => "End".into(),
            Key::PageUp => "PageUp".into(),
            Key::PageDown => "PageDown".into(),
            Key::Insert => "Insert".into(),
            Key::F(n) => format!("F{n}"),
            Key::Unidentified => "Unidentified".into(),
        }
    }

    /// Tab or Shift+Tab (terminals report the latter as BackTab).
    pub fn is_tab(&self) -> bool {
        matches!(self, Key::Tab | Key::BackTab)
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

// Terminal input, so a crossterm-driven host can feed the page directly.

impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode as Code;
        match code {
            Code::Char(c) => Key::Char(c),
            Code::Esc => Key::Escape,
            Code::Tab => Key::Tab,
            Code::BackTab => Key::BackTab,
            Code::Enter => Key::Enter,
            Code::Backspace => Key::Backspace,
            Code::Delete => Key::Delete,
            Code::Insert => Key::Insert,
            Code::Up => Key::Up,
            Code::Down => Key::Down,
            Code::Left => Key::Left,
            Code::Right => Key::Right,
            Code::Home => Key::Home,
            Code::End => Key::End,
            Code::PageUp => Key::PageUp,
            Code::PageDown => Key::PageDown,
            Code::F(n) => Key::F(n),
            _ => Key::Unidentified,
        }
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(held: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers as Held;
        Self {
            shift: held.intersects(Held::SHIFT),
            ctrl: held.intersects(Held::CONTROL),
            alt: held.intersects(Held::ALT),
        }
    }
}

/// Terminals report Shift+Tab as `BackTab`, often without the shift bit.
impl From<crossterm::event::KeyEvent> for EventKind {
    fn from(pressed: crossterm::event::KeyEvent) -> Self {
        let key = Key::from(pressed.code);
        let held = Modifiers::from(pressed.modifiers);
        let modifiers = Modifiers {
            shift: held.shift || key == Key::BackTab,
            ..held
        };
        EventKind::KeyDown { key, modifiers }
    }
}

impl From<crossterm::event::MouseButton> for MouseButton {
    fn from(button: crossterm::event::MouseButton) -> Self {
        match button {
            crossterm::event::MouseButton::Left => MouseButton::Left,
            crossterm::event::MouseButton::Right => MouseButton::Right,
            crossterm::event::MouseButton::Middle => MouseButton::Middle,
        }
    }
}

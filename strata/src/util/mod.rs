pub mod aria;
pub mod focus_trap;
pub mod scrollbar;

pub use aria::AriaHiddenSnapshot;
pub use focus_trap::focus_trap;
pub use scrollbar::{ScrollBar, ScrollLock};

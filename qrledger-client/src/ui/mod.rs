//! Page surface: what the manager renders and where.

pub mod notify;
pub mod surface;
pub mod view;

pub use notify::{Notifier, TracingNotifier};
pub use surface::{HtmlSurface, Surface, TerminalSurface};
pub use view::{Region, Tab, Toast, ToastKind, View, format_date};

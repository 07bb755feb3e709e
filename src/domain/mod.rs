pub mod calendar;
pub mod session;
pub mod stats;
pub mod template_editor;

//! Vela Android Platform
//!
//! Bridge between an Android view and the asynchronous renderer: the view's
//! drawing callback replays frames recorded on the toolkit's UI thread, and
//! size, visibility and focus changes are forwarded to the host.

pub mod async_view;
pub mod logging;

pub use async_view::AsyncView;
pub use logging::init_logging;

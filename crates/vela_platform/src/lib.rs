//! Vela Platform Abstraction Layer
//!
//! The pieces of the host view system the rendering bridge depends on:
//!
//! - **Redraw scheduling**: [`RedrawScheduler`] is how the UI thread asks the
//!   host to run its drawing callback soon.
//! - **Host view**: [`ViewHost`] exposes the host state the bridge consults
//!   (buffered-mode hints, focus, resize and visibility notifications).
//! - **Surface extent**: [`SurfaceExtent`] is the view size, written by the
//!   host thread and read by the UI thread for full-surface clipping.

pub mod error;
pub mod extent;
pub mod host;

pub use error::{PlatformError, Result};
pub use extent::SurfaceExtent;
pub use host::{HostEvent, RedrawScheduler, ViewHost};

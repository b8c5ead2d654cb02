//! Host view traits
//!
//! Implemented by the platform glue (an Android `View`, a desktop window,
//! a test double). All methods may be called from the UI thread or from the
//! host's drawing thread, hence the `Send + Sync` bounds.

use vela_paint::Rect;

/// Asks the host to schedule its drawing callback.
///
/// Implementations must not draw synchronously: the call comes from the UI
/// thread right after a frame was handed over, and the host is expected to
/// post an invalidate to its own thread.
pub trait RedrawScheduler: Send + Sync {
    /// Schedule a redraw of `region`, or of the whole view when `None`
    fn schedule_redraw(&self, region: Option<Rect>);
}

/// Host view state and notifications consumed by the rendering bridge
pub trait ViewHost: RedrawScheduler {
    /// Whether replay must go through the offscreen buffer right now, e.g.
    /// while a native text editor or keyboard overlays the view
    fn prefers_buffered(&self) -> bool {
        false
    }

    /// The view was resized; the UI should lay out again
    fn surface_resized(&self, _width: u32, _height: u32) {}

    /// The window hosting the view became visible or hidden
    fn visibility_changed(&self, _visible: bool) {}

    /// Whether other views are stacked above or below this one
    fn has_sibling_views(&self) -> bool {
        false
    }

    /// Take input focus back
    fn request_focus(&self) {}

    /// Ask the UI thread to repaint the current screen
    fn request_repaint(&self) {}
}

/// Host notifications in the order the platform delivers them
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    SizeChanged { width: u32, height: u32 },
    VisibilityChanged { visible: bool },
    FocusChanged { gained: bool },
}

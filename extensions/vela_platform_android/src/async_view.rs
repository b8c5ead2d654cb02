//! Host view that replays deferred frames
//!
//! [`AsyncView`] is the Rust side of the Android view the toolkit renders
//! into. The UI thread records into the [`DeferredGraphicsContext`] returned
//! by [`AsyncView::new`]; the view's `onDraw` callback forwards to
//! [`AsyncView::on_draw`], which replays the submitted frame on the Android
//! drawing thread.

use std::sync::Arc;

use vela_async::{AsyncRenderConfig, Compositor, DeferredGraphicsContext, ReplayStats};
use vela_paint::{OffscreenSurface, Surface};
use vela_platform::{HostEvent, RedrawScheduler, Result, SurfaceExtent, ViewHost};

/// Replays frames onto the view canvas, directly or through an offscreen
/// buffer.
///
/// Buffered mode is used while the host reports overlays that need the
/// previous frame kept around (text editing, keyboard, native peers), when
/// forced with [`set_paint_view_on_buffer`](Self::set_paint_view_on_buffer),
/// and permanently once the window has been hidden.
pub struct AsyncView<H, O> {
    host: Arc<H>,
    compositor: Compositor,
    extent: SurfaceExtent,
    offscreen: O,
    paint_view_on_buffer: bool,
}

impl<H, O> AsyncView<H, O>
where
    H: ViewHost + 'static,
    O: OffscreenSurface,
{
    /// Create the view and the UI thread's recording context
    pub fn new(
        host: Arc<H>,
        mut offscreen: O,
        config: &AsyncRenderConfig,
    ) -> (Self, DeferredGraphicsContext) {
        let extent = SurfaceExtent::new(config.initial_width, config.initial_height);
        if config.initial_width > 0 && config.initial_height > 0 {
            offscreen.resize(config.initial_width, config.initial_height);
        }

        let scheduler: Arc<dyn RedrawScheduler> = host.clone();
        let ctx = DeferredGraphicsContext::new(config, scheduler, extent.clone());
        let view = Self {
            host,
            compositor: ctx.compositor(),
            extent,
            offscreen,
            paint_view_on_buffer: false,
        };
        (view, ctx)
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn extent(&self) -> &SurfaceExtent {
        &self.extent
    }

    pub fn offscreen(&self) -> &O {
        &self.offscreen
    }

    /// Force buffered painting on or off
    pub fn set_paint_view_on_buffer(&mut self, enabled: bool) {
        self.paint_view_on_buffer = enabled;
    }

    /// Whether the next `on_draw` goes through the offscreen buffer
    pub fn paints_on_buffer(&self) -> bool {
        self.paint_view_on_buffer || self.host.prefers_buffered()
    }

    /// The drawing callback. Replays the submitted frame, if any.
    ///
    /// In buffered mode the frame lands in the offscreen surface, which is
    /// then presented even when no new frame arrived, so the canvas always
    /// shows the last complete frame.
    pub fn on_draw(&mut self, canvas: &mut dyn Surface) -> ReplayStats {
        if self.paints_on_buffer() {
            let stats = self.compositor.replay(&mut self.offscreen);
            self.offscreen.present(canvas);
            tracing::trace!(commands = stats.commands, "buffered draw");
            stats
        } else {
            self.compositor.replay(canvas)
        }
    }

    /// The view was resized. Zero sizes are rejected and change nothing.
    pub fn on_size_changed(&mut self, width: u32, height: u32) -> Result<()> {
        let changed = self.extent.resize(width, height)?;
        tracing::debug!(width, height, changed, "view size changed");
        self.offscreen.resize(width, height);
        self.host.surface_resized(width, height);
        Ok(())
    }

    pub fn on_window_visibility_changed(&mut self, visible: bool) {
        tracing::debug!(visible, "window visibility changed");
        self.host.visibility_changed(visible);
        if !visible {
            self.paint_view_on_buffer = true;
        }
    }

    /// Keep focus on the main view when stacked with other views
    pub fn on_focus_changed(&mut self, gained: bool) {
        if !gained && self.host.has_sibling_views() {
            tracing::debug!("focus lost to a sibling view, reclaiming");
            self.host.request_focus();
            self.host.request_repaint();
        }
    }

    /// Dispatch a host notification
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::SizeChanged { width, height } => {
                if let Err(err) = self.on_size_changed(width, height) {
                    tracing::debug!(%err, "size change ignored");
                }
            }
            HostEvent::VisibilityChanged { visible } => self.on_window_visibility_changed(visible),
            HostEvent::FocusChanged { gained } => self.on_focus_changed(gained),
        }
    }

    /// Every frame covers the whole view
    pub fn is_opaque(&self) -> bool {
        true
    }

    /// Partial repaints are not supported; the toolkit repaints everything
    pub fn always_repaint_all(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_paint::{Rect, RecordingSurface};

    struct StubHost;

    impl RedrawScheduler for StubHost {
        fn schedule_redraw(&self, _region: Option<Rect>) {}
    }

    impl ViewHost for StubHost {}

    #[test]
    fn test_view_is_opaque_and_repaints_all() {
        let (view, _ctx) = AsyncView::new(
            Arc::new(StubHost),
            RecordingSurface::new(1, 1),
            &AsyncRenderConfig::default(),
        );
        assert!(view.is_opaque());
        assert!(view.always_repaint_all());
        assert!(!view.paints_on_buffer());
    }

    #[test]
    fn test_initial_size_comes_from_config() {
        let (view, ctx) = AsyncView::new(
            Arc::new(StubHost),
            RecordingSurface::new(1, 1),
            &AsyncRenderConfig::default().with_initial_size(320, 480),
        );
        assert_eq!(view.extent().size(), (320, 480));
        assert_eq!(view.offscreen().width(), 320);
        assert_eq!(ctx.clip(), Rect::from_size(320.0, 480.0));
    }
}

//! Vela Asynchronous Rendering Bridge
//!
//! Drawing calls made on the toolkit's UI thread are not executed right away.
//! They are recorded as [`DrawCommand`]s, handed over once per frame, and
//! replayed later on whatever thread the host uses for its drawing callback.
//!
//! - **[`DeferredGraphicsContext`]**: the producer. Records every call together
//!   with the clip, color and alpha in effect at that moment.
//! - **[`CommandQueue`]**: a pending/active pair of command buffers. Flushing
//!   swaps them under a lock once the previous frame has been replayed, waiting
//!   at most a bounded number of short intervals.
//! - **[`Compositor`]**: the consumer. Replays the active buffer in order
//!   against a real [`vela_paint::Surface`] and signals the producer when done.
//! - **[`CachedPaintPlan`]**: per-style background renderers whose geometry is
//!   double buffered, so a plan can be reused across frames without the
//!   consumer ever reading geometry written for a later frame.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vela_async::{AsyncRenderConfig, DeferredGraphicsContext};
//! use vela_paint::{Color, Rect, RecordingSurface};
//! use vela_platform::{RedrawScheduler, SurfaceExtent};
//!
//! struct NoopScheduler;
//! impl RedrawScheduler for NoopScheduler {
//!     fn schedule_redraw(&self, _region: Option<Rect>) {}
//! }
//!
//! let extent = SurfaceExtent::new(320, 480);
//! let mut ctx = DeferredGraphicsContext::new(
//!     &AsyncRenderConfig::default(),
//!     Arc::new(NoopScheduler),
//!     extent,
//! );
//! let compositor = ctx.compositor();
//!
//! ctx.set_color(Color::RED);
//! ctx.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
//! assert!(ctx.flush().is_submitted());
//!
//! // Normally on the host's drawing thread
//! let mut canvas = RecordingSurface::new(320, 480);
//! let stats = compositor.replay(&mut canvas);
//! assert_eq!(stats.commands, 1);
//! ```

pub mod command;
pub mod compositor;
pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod queue;
pub mod style;

pub use command::{DrawCommand, DrawOp, PaintSnapshot};
pub use compositor::{Compositor, ReplayStats};
pub use config::AsyncRenderConfig;
pub use context::{ClipState, DeferredGraphicsContext};
pub use error::{ConfigError, PlanError};
pub use plan::{
    BackgroundRenderer, CachedPaintPlan, PlanCache, PlanGeometry, PlanUse, TileAlign,
};
pub use queue::{CommandQueue, FlushOutcome, QueueState};
pub use style::{BackgroundType, Style, StyleId};

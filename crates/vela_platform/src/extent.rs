//! Shared view extent

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use vela_paint::Rect;

use crate::error::{PlatformError, Result};

/// Width and height of the host view, shared between threads.
///
/// Both dimensions live in a single atomic so a reader never sees the width of
/// one resize paired with the height of another.
#[derive(Clone, Debug, Default)]
pub struct SurfaceExtent {
    packed: Arc<AtomicU64>,
}

impl SurfaceExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            packed: Arc::new(AtomicU64::new(pack(width, height))),
        }
    }

    /// Current `(width, height)` in pixels
    pub fn size(&self) -> (u32, u32) {
        unpack(self.packed.load(Ordering::Acquire))
    }

    pub fn width(&self) -> u32 {
        self.size().0
    }

    pub fn height(&self) -> u32 {
        self.size().1
    }

    /// Rect covering the whole view, the clip used when none is set
    pub fn full_rect(&self) -> Rect {
        let (width, height) = self.size();
        Rect::from_size(width as f32, height as f32)
    }

    /// Record a new view size.
    ///
    /// Returns whether the size actually changed. Zero-sized extents are
    /// rejected; hosts report them transiently while a window is torn down.
    pub fn resize(&self, width: u32, height: u32) -> Result<bool> {
        if width == 0 || height == 0 {
            tracing::trace!(width, height, "rejecting empty extent");
            return Err(PlatformError::InvalidExtent { width, height });
        }
        let previous = self.packed.swap(pack(width, height), Ordering::AcqRel);
        Ok(unpack(previous) != (width, height))
    }
}

fn pack(width: u32, height: u32) -> u64 {
    (u64::from(width) << 32) | u64::from(height)
}

fn unpack(packed: u64) -> (u32, u32) {
    ((packed >> 32) as u32, packed as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_reports_change() {
        let extent = SurfaceExtent::new(320, 480);
        assert_eq!(extent.resize(320, 480), Ok(false));
        assert_eq!(extent.resize(480, 320), Ok(true));
        assert_eq!(extent.size(), (480, 320));
        assert_eq!(extent.full_rect(), Rect::from_size(480.0, 320.0));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let extent = SurfaceExtent::new(100, 100);
        assert_eq!(
            extent.resize(0, 100),
            Err(PlatformError::InvalidExtent {
                width: 0,
                height: 100
            })
        );
        assert_eq!(extent.size(), (100, 100));
    }

    #[test]
    fn test_clones_share_state() {
        let extent = SurfaceExtent::new(10, 10);
        let reader = extent.clone();
        extent.resize(20, 30).unwrap();
        assert_eq!(reader.size(), (20, 30));
    }
}

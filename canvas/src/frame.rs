//! Per-refresh frame scheduling and backing-surface sizing.
//!
//! One tick runs per display refresh. The backing store is resized only when
//! `logical size × device pixel ratio` differs from what was last applied:
//! resizing clears the drawing buffer, so redundant writes are avoided. The
//! comparison runs every tick rather than on resize notifications, which also
//! catches pixel-ratio changes (zoom, moving between monitors).

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use tracing::debug;

use crate::boundary::{BoundaryError, EngineBoundary};
use crate::geom::Rect;

/// Platform surface the engine draws into.
pub trait Surface {
    /// Current bounding rectangle, logical (CSS) size included.
    fn bounding_rect(&self) -> Rect;

    /// Current device pixel ratio; non-positive values are treated as `1`.
    fn device_pixel_ratio(&self) -> f64;

    /// Resize the backing store. Destructive: clears its contents.
    fn set_backing_size(&mut self, size: BackingSize);
}

/// Backing store size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

impl BackingSize {
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_logical(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let px = |v: f64| (v * device_pixel_ratio).round().max(0.0) as u32;
        Self { width: px(width), height: px(height) }
    }
}

/// Sizes observed on the most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    pub logical_width: f64,
    pub logical_height: f64,
    pub device_pixel_ratio: f64,
    /// Last size written to the surface; `None` before the first tick.
    pub backing: Option<BackingSize>,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    timing: FrameTiming,
    frames: u64,
    resizes: u64,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    /// Ticks completed successfully.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Backing-store writes performed.
    #[must_use]
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Resize the backing store if the logical size or pixel ratio changed.
    /// Returns whether a resize happened.
    pub fn sync_backing<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let rect = surface.bounding_rect();
        let dpr = normalize_dpr(surface.device_pixel_ratio());
        self.timing.logical_width = rect.width;
        self.timing.logical_height = rect.height;
        self.timing.device_pixel_ratio = dpr;

        let wanted = BackingSize::for_logical(rect.width, rect.height, dpr);
        if self.timing.backing == Some(wanted) {
            return false;
        }
        debug!(width = wanted.width, height = wanted.height, dpr, "resizing backing surface");
        surface.set_backing_size(wanted);
        self.timing.backing = Some(wanted);
        self.resizes += 1;
        true
    }

    /// Resize if needed, then `update` and `render`, in that order. A render
    /// never runs against state that was not just updated.
    pub fn tick<S, E>(&mut self, surface: &mut S, engine: &mut E) -> Result<(), BoundaryError>
    where
        S: Surface + ?Sized,
        E: EngineBoundary + ?Sized,
    {
        self.sync_backing(surface);
        engine.update()?;
        engine.render(self.timing.logical_width, self.timing.logical_height, self.timing.device_pixel_ratio)?;
        self.frames += 1;
        Ok(())
    }
}

fn normalize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

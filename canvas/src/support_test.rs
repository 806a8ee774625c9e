//! Test doubles shared by the unit tests: an engine that records every
//! boundary call and a surface that records backing-store writes.

use crate::boundary::{BoundaryError, EngineBoundary, PerformanceSample, PointerEvent, ZoomEvent};
use crate::frame::{BackingSize, Surface};
use crate::geom::Rect;
use crate::settings::EngineSettings;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Pointer(PointerEvent),
    Zoom(ZoomEvent),
    Update,
    Render { width: f64, height: f64, dpr: f64 },
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    pub settings: EngineSettings,
    pub perf: PerformanceSample,
    /// Fail the n-th `update` call (1-based).
    pub fail_update_at: Option<usize>,
    /// Fail every `pointer_event` call.
    pub fail_pointer: bool,
    updates: usize,
}

impl RecordingEngine {
    pub fn failing_update_at(n: usize) -> Self {
        Self { fail_update_at: Some(n), ..Self::default() }
    }

    pub fn failing_pointer() -> Self {
        Self { fail_pointer: true, ..Self::default() }
    }

    pub fn with_frame_time(avg_frame_time: f64) -> Self {
        Self {
            perf: PerformanceSample { fps: 1000.0 / avg_frame_time, avg_frame_time },
            ..Self::default()
        }
    }

    pub fn pointer_events(&self) -> Vec<PointerEvent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Pointer(e) => Some(*e),
                _ => None,
            })
            .collect()
    }

    pub fn zooms(&self) -> Vec<ZoomEvent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Zoom(z) => Some(*z),
                _ => None,
            })
            .collect()
    }

    pub fn renders(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Render { .. })).count()
    }
}

impl EngineBoundary for RecordingEngine {
    fn pointer_event(&mut self, event: PointerEvent) -> Result<(), BoundaryError> {
        if self.fail_pointer {
            return Err(BoundaryError::Engine("pointer rejected".into()));
        }
        self.calls.push(Call::Pointer(event));
        Ok(())
    }

    fn zoom(&mut self, zoom: ZoomEvent) -> Result<(), BoundaryError> {
        self.calls.push(Call::Zoom(zoom));
        Ok(())
    }

    fn update(&mut self) -> Result<(), BoundaryError> {
        self.updates += 1;
        if self.fail_update_at == Some(self.updates) {
            return Err(BoundaryError::Engine("update failed".into()));
        }
        self.calls.push(Call::Update);
        Ok(())
    }

    fn render(&mut self, width: f64, height: f64, dpr: f64) -> Result<(), BoundaryError> {
        self.calls.push(Call::Render { width, height, dpr });
        Ok(())
    }

    fn settings(&self) -> EngineSettings {
        self.settings
    }

    fn store_settings(&mut self, settings: &EngineSettings) {
        self.settings = *settings;
    }

    fn performance(&self) -> PerformanceSample {
        self.perf
    }
}

#[derive(Debug)]
pub struct FakeSurface {
    pub rect: Rect,
    pub dpr: f64,
    pub writes: Vec<BackingSize>,
}

impl FakeSurface {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { rect: Rect::new(0.0, 0.0, width, height), dpr, writes: Vec::new() }
    }
}

impl Surface for FakeSurface {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn set_backing_size(&mut self, size: BackingSize) {
        self.writes.push(size);
    }
}

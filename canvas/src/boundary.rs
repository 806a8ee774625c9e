//! The call surface of the external rendering/simulation engine.
//!
//! Everything behind [`EngineBoundary`] (camera model, drawing, astronomy)
//! is owned by the engine. This crate only feeds it normalized pointer and
//! zoom events, drives `update`/`render` once per refresh, and reads or
//! writes its configuration fields.

use serde::{Deserialize, Serialize};

use crate::geom::Point;
use crate::settings::EngineSettings;

/// Pointer identity as seen by the engine.
///
/// `0` is the single logical mouse pointer; touches use the identifier the
/// platform assigned to them.
pub type PointerId = i64;

/// Identity of the logical mouse pointer.
pub const MOUSE_POINTER_ID: PointerId = 0;

/// Pointer phase in the engine's press/move/release vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Contact ended (wire code `0`).
    Release,
    /// Contact began (wire code `1`).
    Press,
    /// Continuous move while in contact (wire code `-1`).
    Move,
}

impl Phase {
    /// Integer code used by the engine's pointer entry point.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Release => 0,
            Self::Press => 1,
            Self::Move => -1,
        }
    }
}

/// One normalized pointer event, in canvas-local CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: Phase,
    pub pos: Point,
    pub buttons: u32,
}

/// A multiplicative zoom request anchored at a canvas-local point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomEvent {
    /// `> 1` zooms in, `< 1` zooms out.
    pub factor: f64,
    pub center: Point,
}

/// Frame statistics reported by the engine. Read-only to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    /// Instantaneous frames per second.
    pub fps: f64,
    /// Rolling average frame time in milliseconds.
    pub avg_frame_time: f64,
}

/// Failure raised by the engine during `update` or `render`.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// A JavaScript exception escaped an engine entry point.
    #[error("engine call `{call}` threw: {message}")]
    Js { call: &'static str, message: String },
    /// The engine reported a failure of its own.
    #[error("engine failure: {0}")]
    Engine(String),
}

/// Operations this crate needs from the engine.
///
/// Implementations are called from a single logical thread; none of these
/// methods may re-enter the host that owns the boundary.
pub trait EngineBoundary {
    /// Deliver one pointer event.
    fn pointer_event(&mut self, event: PointerEvent) -> Result<(), BoundaryError>;

    /// Deliver one zoom request.
    fn zoom(&mut self, zoom: ZoomEvent) -> Result<(), BoundaryError>;

    /// Advance simulation state by one frame.
    fn update(&mut self) -> Result<(), BoundaryError>;

    /// Draw the current state at the given logical size and pixel ratio.
    fn render(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Result<(), BoundaryError>;

    /// Snapshot of the engine's configuration fields.
    fn settings(&self) -> EngineSettings;

    /// Write every configuration field back to the engine.
    fn store_settings(&mut self, settings: &EngineSettings);

    /// Current frame statistics.
    fn performance(&self) -> PerformanceSample;
}

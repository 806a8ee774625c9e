//! Zoom gesture recognition from two-finger pinches and legacy wheel events.
//!
//! Both sources produce a multiplicative [`ZoomEvent`] anchored at a
//! canvas-local point. Interpreting that factor against a camera or
//! projection is the engine's job; nothing here knows about field of view.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::boundary::ZoomEvent;
use crate::consts::{PINCH_JITTER_THRESHOLD, WHEEL_DELTA_GAIN, WHEEL_DELTA_PER_NOTCH, WHEEL_ZOOM_BASE};
use crate::geom::Point;

/// Error raised by a single input handler invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// The wheel event is neither `mousewheel` nor `DOMMouseScroll`.
    #[error("unrecognized mouse wheel event: {kind}")]
    UnrecognizedWheel { kind: String },
}

/// The two legacy wheel event shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelInput {
    /// `mousewheel`: `wheelDelta` in multiples of 120, positive away from the user.
    MouseWheel { wheel_delta: f64 },
    /// `DOMMouseScroll`: `detail` in lines, negative away from the user.
    DomMouseScroll { detail: f64 },
}

impl WheelInput {
    /// Pick the shape from the DOM event type.
    pub fn from_event(kind: &str, wheel_delta: f64, detail: f64) -> Result<Self, InputError> {
        match kind {
            "mousewheel" => Ok(Self::MouseWheel { wheel_delta }),
            "DOMMouseScroll" => Ok(Self::DomMouseScroll { detail }),
            other => Err(InputError::UnrecognizedWheel { kind: other.to_string() }),
        }
    }

    /// Signed notch count; positive means zoom in.
    #[must_use]
    pub fn delta(self) -> f64 {
        match self {
            Self::MouseWheel { wheel_delta } => wheel_delta / WHEEL_DELTA_PER_NOTCH,
            Self::DomMouseScroll { detail } => -detail,
        }
    }

    #[must_use]
    pub fn zoom_factor(self) -> f64 {
        WHEEL_ZOOM_BASE.powf(self.delta() * WHEEL_DELTA_GAIN)
    }
}

/// Two-finger pinch tracking state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    /// Exactly two touches are tracked.
    pub active: bool,
    /// Inter-finger distance when the pinch began; `0` when inactive.
    pub baseline: f64,
    /// Scale relative to `baseline` at the last forwarded zoom.
    pub last_scale: f64,
    /// Midpoint of the fingers at the last forwarded zoom.
    pub center: Point,
}

impl Default for PinchState {
    fn default() -> Self {
        Self { active: false, baseline: 0.0, last_scale: 1.0, center: Point::default() }
    }
}

#[derive(Debug, Default)]
pub struct GestureRecognizer {
    pinch: PinchState,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pinch(&self) -> PinchState {
        self.pinch
    }

    /// Called after the tracked touch set grew or shrank. `pair` is the two
    /// live touch positions when exactly two are tracked.
    pub fn touches_changed(&mut self, pair: Option<(Point, Point)>) {
        match pair {
            Some((a, b)) if !self.pinch.active => {
                self.pinch = PinchState {
                    active: true,
                    baseline: a.distance(b),
                    last_scale: 1.0,
                    center: a.midpoint(b),
                };
            }
            Some(_) => {}
            None => self.cancel(),
        }
    }

    /// Called after touch positions moved. Returns the incremental zoom to
    /// forward, if the change clears the jitter threshold.
    pub fn touch_moved(&mut self, pair: Option<(Point, Point)>) -> Option<ZoomEvent> {
        let Some((a, b)) = pair else {
            self.cancel();
            return None;
        };
        if !self.pinch.active || self.pinch.baseline <= 0.0 {
            return None;
        }
        let scale = a.distance(b) / self.pinch.baseline;
        if (scale - self.pinch.last_scale).abs() <= PINCH_JITTER_THRESHOLD {
            return None;
        }
        let center = a.midpoint(b);
        let factor = scale / self.pinch.last_scale;
        self.pinch.last_scale = scale;
        self.pinch.center = center;
        Some(ZoomEvent { factor, center })
    }

    /// Drop any pinch in progress; the next two-finger contact starts fresh.
    pub fn cancel(&mut self) {
        self.pinch = PinchState::default();
    }

    /// Wheel zoom anchored at the canvas-local pointer position.
    #[must_use]
    pub fn wheel(&self, input: WheelInput, anchor: Point) -> ZoomEvent {
        ZoomEvent { factor: input.zoom_factor(), center: anchor }
    }
}

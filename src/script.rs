//! Timed input scripts replayed against the native host.
//!
//! A script is a JSON array of steps. Each step carries its offset from the
//! start of the run and one input event in client coordinates:
//!
//! ```json
//! [
//!   { "atMs": 0,   "type": "mouseDown", "x": 100, "y": 100 },
//!   { "atMs": 250, "type": "mouseMove", "x": 180, "y": 120 },
//!   { "atMs": 500, "type": "mouseUp",   "x": 180, "y": 120 },
//!   { "atMs": 800, "type": "wheel", "kind": "mousewheel", "wheelDelta": 120, "x": 400, "y": 300 },
//!   { "atMs": 900, "type": "touchStart", "touches": [{ "id": 1, "x": 300, "y": 300 }, { "id": 2, "x": 500, "y": 300 }] }
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use skycanvas::boundary::EngineBoundary;
use skycanvas::geom::{Point, Rect};
use skycanvas::gesture::InputError;
use skycanvas::host::HostCore;
use skycanvas::pointer::TouchPoint;

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("script parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScriptTouch {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputEvent {
    MouseDown {
        x: f64,
        y: f64,
        #[serde(default = "default_buttons")]
        buttons: u32,
    },
    MouseMove { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    MouseLeave,
    Wheel {
        kind: String,
        #[serde(default)]
        wheel_delta: f64,
        #[serde(default)]
        detail: f64,
        x: f64,
        y: f64,
    },
    TouchStart { touches: Vec<ScriptTouch> },
    TouchMove { touches: Vec<ScriptTouch> },
    TouchEnd { touches: Vec<ScriptTouch> },
    TouchCancel { touches: Vec<ScriptTouch> },
}

/// Primary button only.
fn default_buttons() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// Parse a script and order its steps by time. Steps sharing a timestamp keep
/// their file order.
pub fn parse(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps: Vec<ScriptStep> = serde_json::from_str(text)?;
    steps.sort_by_key(|s| s.at_ms);
    Ok(steps)
}

pub async fn load(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ScriptError::Read { path: path.to_path_buf(), source })?;
    parse(&text)
}

fn touch_points(touches: &[ScriptTouch]) -> Vec<TouchPoint> {
    touches.iter().map(|t| TouchPoint::new(t.id, t.x, t.y)).collect()
}

impl InputEvent {
    /// Feed this event to the host as if the platform had delivered it.
    pub fn apply<E: EngineBoundary>(&self, host: &mut HostCore<E>, rect: Rect) -> Result<(), InputError> {
        match self {
            Self::MouseDown { x, y, buttons } => host.on_mouse_down(Point::new(*x, *y), *buttons, rect),
            Self::MouseMove { x, y } => host.on_mouse_move(Point::new(*x, *y), rect),
            Self::MouseUp { x, y } => host.on_mouse_up(Point::new(*x, *y), rect),
            Self::MouseLeave => host.on_mouse_leave(),
            Self::Wheel { kind, wheel_delta, detail, x, y } => {
                host.on_wheel(kind, *wheel_delta, *detail, Point::new(*x, *y), rect)?;
            }
            Self::TouchStart { touches } => host.on_touch_start(&touch_points(touches), rect),
            Self::TouchMove { touches } => host.on_touch_move(&touch_points(touches), rect),
            Self::TouchEnd { touches } => host.on_touch_end(&touch_points(touches), rect),
            Self::TouchCancel { touches } => host.on_touch_cancel(&touch_points(touches), rect),
        }
        Ok(())
    }
}

//! Pointer tracking: mouse and multi-touch input normalized into the engine's
//! press/move/release vocabulary.
//!
//! DESIGN
//! ======
//! The mouse is a single logical identity (`0`) whose press begins at the
//! canvas but whose moves and release are observed document-wide, so a drag
//! stays valid outside the canvas bounds. Touches are tracked per platform
//! identifier. Every position is converted against the bounding rectangle
//! passed in with the event; nothing caches geometry across events.
//!
//! Per touch identity the emitted sequence is always one `Press`, zero or more
//! `Move`, one `Release`. Platform events that would break that sequence (a
//! start for a live identity, a move or end for an unknown one) are dropped.

#[cfg(test)]
#[path = "pointer_test.rs"]
mod pointer_test;

use tracing::debug;

use crate::boundary::{MOUSE_POINTER_ID, Phase, PointerEvent, PointerId};
use crate::consts::TOUCH_BUTTONS;
use crate::geom::{Point, Rect};

/// One touch contact as delivered by the platform, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: PointerId,
    pub client: Point,
}

impl TouchPoint {
    #[must_use]
    pub fn new(id: PointerId, x: f64, y: f64) -> Self {
        Self { id, client: Point::new(x, y) }
    }
}

/// Last known state of one live pointer identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub id: PointerId,
    /// Canvas-local position.
    pub pos: Point,
    /// Phase of the most recent event emitted for this identity.
    pub phase: Phase,
    pub buttons: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerOptions {
    /// Emit a release when the pointer leaves the document while pressed.
    /// Off by default: a leave only stops the drag locally.
    pub release_on_leave: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct MouseState {
    /// A button is held and the drag is still tracked locally.
    held: bool,
    /// A press was forwarded and no release has followed yet.
    pressed: bool,
    /// A native move refreshed `pos` since the last frame tick.
    fresh: bool,
    pos: Point,
    buttons: u32,
    /// Phase of the last event forwarded for the mouse.
    last_phase: Option<Phase>,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    options: TrackerOptions,
    mouse: MouseState,
    /// Live touches in arrival order.
    touches: Vec<PointerState>,
}

impl PointerTracker {
    #[must_use]
    pub fn new(options: TrackerOptions) -> Self {
        Self { options, ..Self::default() }
    }

    // --- Mouse ---

    /// Button pressed on the canvas.
    ///
    /// A second button going down during a drag updates the mask and is
    /// forwarded as a move, not as another press.
    pub fn mouse_down(&mut self, client: Point, buttons: u32, rect: Rect) -> PointerEvent {
        let pos = rect.to_local(client);
        let phase = if self.mouse.pressed { Phase::Move } else { Phase::Press };
        self.mouse = MouseState { held: true, pressed: true, fresh: true, pos, buttons, last_phase: Some(phase) };
        mouse_event(phase, pos, buttons)
    }

    /// Document-wide move. Ignored unless a drag is being tracked.
    pub fn mouse_move(&mut self, client: Point, rect: Rect) -> Option<PointerEvent> {
        if !self.mouse.held {
            return None;
        }
        self.mouse.pos = rect.to_local(client);
        self.mouse.fresh = true;
        self.mouse.last_phase = Some(Phase::Move);
        Some(mouse_event(Phase::Move, self.mouse.pos, self.mouse.buttons))
    }

    /// Document-wide button release. Emits exactly one release per press.
    pub fn mouse_up(&mut self, client: Point, rect: Rect) -> Option<PointerEvent> {
        if !self.mouse.pressed {
            return None;
        }
        let pos = rect.to_local(client);
        let buttons = self.mouse.buttons;
        self.mouse = MouseState { pos, last_phase: Some(Phase::Release), ..MouseState::default() };
        Some(mouse_event(Phase::Release, pos, buttons))
    }

    /// The pointer left the document. Stops local drag tracking; the engine
    /// only hears about it when `release_on_leave` is set.
    pub fn mouse_leave(&mut self) -> Option<PointerEvent> {
        self.mouse.held = false;
        self.mouse.fresh = false;
        if !(self.options.release_on_leave && self.mouse.pressed) {
            if self.mouse.pressed {
                debug!("pointer left document while pressed; release deferred to next mouseup");
            }
            return None;
        }
        self.mouse.pressed = false;
        self.mouse.last_phase = Some(Phase::Release);
        Some(mouse_event(Phase::Release, self.mouse.pos, self.mouse.buttons))
    }

    /// Per-frame keep-alive for a held button: re-submits the last position
    /// as a move when no native move arrived since the previous frame.
    pub fn synthetic_move(&mut self) -> Option<PointerEvent> {
        let refreshed = std::mem::take(&mut self.mouse.fresh);
        if !self.mouse.held || refreshed {
            return None;
        }
        self.mouse.last_phase = Some(Phase::Move);
        Some(mouse_event(Phase::Move, self.mouse.pos, self.mouse.buttons))
    }

    /// State of the mouse pointer while a press is outstanding.
    #[must_use]
    pub fn mouse(&self) -> Option<PointerState> {
        if !self.mouse.pressed {
            return None;
        }
        let phase = self.mouse.last_phase?;
        Some(PointerState { id: MOUSE_POINTER_ID, pos: self.mouse.pos, phase, buttons: self.mouse.buttons })
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.mouse.held
    }

    // --- Touch ---

    /// New contacts in `changed` begin tracking and emit a press each.
    pub fn touch_start(&mut self, changed: &[TouchPoint], rect: Rect) -> Vec<PointerEvent> {
        let mut events = Vec::with_capacity(changed.len());
        for touch in changed {
            if self.touch_index(touch.id).is_some() {
                debug!(id = touch.id, "duplicate touch start dropped");
                continue;
            }
            let state = PointerState {
                id: touch.id,
                pos: rect.to_local(touch.client),
                phase: Phase::Press,
                buttons: TOUCH_BUTTONS,
            };
            self.touches.push(state);
            events.push(touch_event(&state));
        }
        events
    }

    /// Every live contact in `changed` emits a move, whether or not its
    /// position actually changed.
    pub fn touch_move(&mut self, changed: &[TouchPoint], rect: Rect) -> Vec<PointerEvent> {
        let mut events = Vec::with_capacity(changed.len());
        for touch in changed {
            let Some(index) = self.touch_index(touch.id) else {
                continue;
            };
            let state = &mut self.touches[index];
            state.pos = rect.to_local(touch.client);
            state.phase = Phase::Move;
            events.push(touch_event(state));
        }
        events
    }

    /// Contacts in `changed` emit a release and stop being tracked. Used for
    /// both `touchend` and `touchcancel`.
    pub fn touch_end(&mut self, changed: &[TouchPoint], rect: Rect) -> Vec<PointerEvent> {
        let mut events = Vec::with_capacity(changed.len());
        for touch in changed {
            let Some(index) = self.touch_index(touch.id) else {
                continue;
            };
            let mut state = self.touches.remove(index);
            state.pos = rect.to_local(touch.client);
            state.phase = Phase::Release;
            events.push(touch_event(&state));
        }
        events
    }

    #[must_use]
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    #[must_use]
    pub fn touches(&self) -> &[PointerState] {
        &self.touches
    }

    /// Positions of the two live touches, when exactly two are tracked.
    #[must_use]
    pub fn touch_pair(&self) -> Option<(Point, Point)> {
        match self.touches.as_slice() {
            [a, b] => Some((a.pos, b.pos)),
            _ => None,
        }
    }

    fn touch_index(&self, id: PointerId) -> Option<usize> {
        self.touches.iter().position(|t| t.id == id)
    }
}

fn mouse_event(phase: Phase, pos: Point, buttons: u32) -> PointerEvent {
    PointerEvent { id: MOUSE_POINTER_ID, phase, pos, buttons }
}

fn touch_event(state: &PointerState) -> PointerEvent {
    PointerEvent { id: state.id, phase: state.phase, pos: state.pos, buttons: state.buttons }
}

//! Adaptive quality: a timer-driven feedback loop that trades rendering
//! fidelity for frame-time budget.
//!
//! DESIGN
//! ======
//! The controller is a two-state machine (Disabled ⇄ Enabled). While enabled,
//! a cooperative timer fires every [`QUALITY_EVAL_PERIOD_MS`], independent of
//! the frame loop, and each firing evaluates the engine's average frame time
//! against `1000 / target_fps`:
//!
//! - above 1.5× budget: one level down, label density −0.2 (not below 0.3)
//! - below 0.7× budget: one level up, label density +0.1 (not above 1.0)
//!
//! Density only moves together with the level, so a single evaluation changes
//! each by at most one step. The controller keeps no history: manual changes
//! made between evaluations are simply the next evaluation's starting point.
//!
//! The timer holds only a weak reference to what it evaluates. If that has
//! been dropped, the timer cancels itself instead of failing.

#[cfg(test)]
#[path = "quality_test.rs"]
mod quality_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::boundary::PerformanceSample;
use crate::consts::{
    LABEL_DENSITY_DOWN_STEP, LABEL_DENSITY_FLOOR, LABEL_DENSITY_UP_STEP, MAX_QUALITY_LEVEL, QUALITY_DEGRADE_RATIO,
    QUALITY_UPGRADE_RATIO,
};
pub use crate::consts::QUALITY_EVAL_PERIOD_MS;
use crate::settings::{EngineSettings, RenderQuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Disabled,
    Enabled,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    Unchanged,
    Degraded { from: RenderQuality, to: RenderQuality },
    Upgraded { from: RenderQuality, to: RenderQuality },
}

/// Step `quality` at most once according to the measured frame time.
#[must_use]
pub fn step_quality(quality: RenderQuality, target_fps: u32, sample: PerformanceSample) -> Adjustment {
    let budget = 1000.0 / f64::from(target_fps.max(1));
    let frame_time = sample.avg_frame_time;

    if frame_time > budget * QUALITY_DEGRADE_RATIO && quality.level > 0 {
        let density = quality.label_density;
        let to = RenderQuality {
            level: quality.level - 1,
            label_density: (density - LABEL_DENSITY_DOWN_STEP).max(LABEL_DENSITY_FLOOR).min(density),
        };
        return Adjustment::Degraded { from: quality, to };
    }
    if frame_time < budget * QUALITY_UPGRADE_RATIO && quality.level < MAX_QUALITY_LEVEL {
        let to = RenderQuality {
            level: quality.level + 1,
            label_density: (quality.label_density + LABEL_DENSITY_UP_STEP).min(1.0),
        };
        return Adjustment::Upgraded { from: quality, to };
    }
    Adjustment::Unchanged
}

/// Cancellation handle returned when adaptive quality is enabled.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveHandle {
    cancelled: Rc<Cell<bool>>,
}

impl AdaptiveHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug, Default)]
pub struct QualityController {
    state: ControllerState,
    active: Option<AdaptiveHandle>,
    evaluations: u64,
}

impl QualityController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Enter the Enabled state. Any timer from a previous enable is
    /// cancelled so only one evaluation runs per period.
    pub fn enable(&mut self) -> AdaptiveHandle {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        let handle = AdaptiveHandle::default();
        self.active = Some(handle.clone());
        self.state = ControllerState::Enabled;
        info!("adaptive quality enabled");
        handle
    }

    /// Enter the Disabled state, cancelling `handle` and the current timer.
    pub fn disable(&mut self, handle: Option<&AdaptiveHandle>) {
        if let Some(handle) = handle {
            handle.cancel();
        }
        if let Some(active) = self.active.take() {
            active.cancel();
        }
        self.state = ControllerState::Disabled;
        info!("adaptive quality disabled");
    }

    /// Run one evaluation against `settings`. No-op while disabled.
    pub fn evaluate(&mut self, settings: &mut EngineSettings, sample: PerformanceSample) -> Adjustment {
        if self.state == ControllerState::Disabled {
            return Adjustment::Unchanged;
        }
        self.evaluations += 1;
        let adjustment = step_quality(settings.render_quality, settings.performance.target_fps, sample);
        match adjustment {
            Adjustment::Degraded { to, .. } | Adjustment::Upgraded { to, .. } => {
                info!(
                    level = to.level,
                    label_density = to.label_density,
                    avg_frame_time = sample.avg_frame_time,
                    "adaptive quality step"
                );
                settings.render_quality = to;
            }
            Adjustment::Unchanged => {}
        }
        adjustment
    }
}

/// Something the quality timer can evaluate.
pub trait QualityTarget {
    fn evaluate_quality(&mut self) -> Adjustment;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Keep the timer scheduled.
    Continue,
    /// Stop scheduling; the timer will never evaluate again.
    Cancelled,
}

/// Periodic evaluation task, fired by the host's timer primitive.
#[derive(Debug)]
pub struct QualityTimer<T> {
    target: Weak<RefCell<T>>,
    handle: AdaptiveHandle,
}

impl<T: QualityTarget> QualityTimer<T> {
    #[must_use]
    pub fn new(target: &Rc<RefCell<T>>, handle: AdaptiveHandle) -> Self {
        Self { target: Rc::downgrade(target), handle }
    }

    #[must_use]
    pub fn handle(&self) -> &AdaptiveHandle {
        &self.handle
    }

    /// One timer firing.
    pub fn fire(&self) -> TimerStatus {
        if self.handle.is_cancelled() {
            return TimerStatus::Cancelled;
        }
        let Some(target) = self.target.upgrade() else {
            debug!("quality target dropped; cancelling timer");
            self.handle.cancel();
            return TimerStatus::Cancelled;
        };
        // Fired from inside a borrow of the target (re-entrant host call):
        // skip this period rather than contend for it.
        let Ok(mut target) = target.try_borrow_mut() else {
            debug!("quality target busy; skipping evaluation");
            return TimerStatus::Continue;
        };
        target.evaluate_quality();
        TimerStatus::Continue
    }
}

#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn quality(level: u8, label_density: f64) -> RenderQuality {
    RenderQuality { level, label_density }
}

fn frame_time(ms: f64) -> PerformanceSample {
    PerformanceSample { fps: 1000.0 / ms, avg_frame_time: ms }
}

// =============================================================
// Policy
// =============================================================

#[test]
fn slow_frames_step_down() {
    // Budget at 60 fps is 16.67 ms; 1.5x is 25 ms.
    let adj = step_quality(quality(2, 1.0), 60, frame_time(30.0));
    let Adjustment::Degraded { to, .. } = adj else {
        panic!("expected degrade, got {adj:?}");
    };
    assert_eq!(to.level, 1);
    assert!(approx_eq(to.label_density, 0.8));
}

#[test]
fn fast_frames_step_up() {
    // 0.7x budget at 60 fps is 11.67 ms.
    let adj = step_quality(quality(0, 0.5), 60, frame_time(8.0));
    let Adjustment::Upgraded { to, .. } = adj else {
        panic!("expected upgrade, got {adj:?}");
    };
    assert_eq!(to.level, 1);
    assert!(approx_eq(to.label_density, 0.6));
}

#[test]
fn frames_within_band_change_nothing() {
    assert_eq!(step_quality(quality(1, 0.7), 60, frame_time(16.0)), Adjustment::Unchanged);
    assert_eq!(step_quality(quality(1, 0.7), 60, frame_time(24.0)), Adjustment::Unchanged);
}

#[test]
fn level_floor_and_ceiling_hold() {
    assert_eq!(step_quality(quality(0, 0.3), 60, frame_time(100.0)), Adjustment::Unchanged);
    assert_eq!(step_quality(quality(2, 1.0), 60, frame_time(1.0)), Adjustment::Unchanged);
}

#[test]
fn density_floor_on_decrement() {
    let Adjustment::Degraded { to, .. } = step_quality(quality(2, 0.4), 60, frame_time(50.0)) else {
        panic!("expected degrade");
    };
    assert!(approx_eq(to.label_density, 0.3));
}

#[test]
fn decrement_never_raises_manual_low_density() {
    let Adjustment::Degraded { to, .. } = step_quality(quality(2, 0.1), 60, frame_time(50.0)) else {
        panic!("expected degrade");
    };
    assert!(approx_eq(to.label_density, 0.1));
}

#[test]
fn density_ceiling_on_increment() {
    let Adjustment::Upgraded { to, .. } = step_quality(quality(1, 0.95), 60, frame_time(1.0)) else {
        panic!("expected upgrade");
    };
    assert!(approx_eq(to.label_density, 1.0));
}

#[test]
fn budget_follows_target_fps() {
    // 30 fps budget is 33.3 ms: 30 ms is inside the band.
    assert_eq!(step_quality(quality(1, 0.7), 30, frame_time(30.0)), Adjustment::Unchanged);
    assert!(matches!(step_quality(quality(1, 0.7), 30, frame_time(60.0)), Adjustment::Degraded { .. }));
}

#[test]
fn zero_target_fps_is_treated_as_one() {
    assert!(matches!(step_quality(quality(1, 0.7), 0, frame_time(100.0)), Adjustment::Upgraded { .. }));
}

#[test]
fn any_single_step_is_bounded() {
    let times = [0.5, 5.0, 11.0, 12.0, 17.0, 24.0, 26.0, 40.0, 200.0];
    for level in 0..=2 {
        for density in [0.0, 0.1, 0.3, 0.5, 0.9, 1.0] {
            for ms in times {
                let from = quality(level, density);
                let to = match step_quality(from, 60, frame_time(ms)) {
                    Adjustment::Unchanged => from,
                    Adjustment::Degraded { to, .. } | Adjustment::Upgraded { to, .. } => to,
                };
                assert!(i16::from(to.level).abs_diff(i16::from(from.level)) <= 1);
                assert!((to.label_density - from.label_density).abs() <= 0.2 + EPSILON);
                assert!(to.level <= 2);
                assert!((0.0..=1.0).contains(&to.label_density));
            }
        }
    }
}

// =============================================================
// Controller state machine
// =============================================================

#[test]
fn disabled_controller_does_not_evaluate() {
    let mut c = QualityController::new();
    let mut s = EngineSettings::default();
    assert_eq!(c.evaluate(&mut s, frame_time(100.0)), Adjustment::Unchanged);
    assert_eq!(s.render_quality.level, 2);
    assert_eq!(c.evaluations(), 0);
}

#[test]
fn enabled_controller_writes_settings() {
    let mut c = QualityController::new();
    let mut s = EngineSettings::default();
    c.enable();
    c.evaluate(&mut s, frame_time(100.0));
    assert_eq!(s.render_quality.level, 1);
    c.evaluate(&mut s, frame_time(100.0));
    assert_eq!(s.render_quality.level, 0);
    assert_eq!(c.evaluations(), 2);
}

#[test]
fn manual_override_is_next_starting_point() {
    let mut c = QualityController::new();
    let mut s = EngineSettings::default();
    c.enable();
    c.evaluate(&mut s, frame_time(100.0));
    s.render_quality = quality(2, 1.0);
    c.evaluate(&mut s, frame_time(100.0));
    assert_eq!(s.render_quality.level, 1);
}

#[test]
fn re_enable_cancels_previous_handle() {
    let mut c = QualityController::new();
    let first = c.enable();
    let second = c.enable();
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
}

#[test]
fn disable_cancels_handles() {
    let mut c = QualityController::new();
    let handle = c.enable();
    c.disable(Some(&handle));
    assert!(handle.is_cancelled());
    assert_eq!(c.state(), ControllerState::Disabled);
}

// =============================================================
// Timer
// =============================================================

#[derive(Default)]
struct Counter {
    fired: u32,
}

impl QualityTarget for Counter {
    fn evaluate_quality(&mut self) -> Adjustment {
        self.fired += 1;
        Adjustment::Unchanged
    }
}

#[test]
fn timer_evaluates_live_target() {
    let target = Rc::new(RefCell::new(Counter::default()));
    let timer = QualityTimer::new(&target, AdaptiveHandle::default());
    assert_eq!(timer.fire(), TimerStatus::Continue);
    assert_eq!(timer.fire(), TimerStatus::Continue);
    assert_eq!(target.borrow().fired, 2);
}

#[test]
fn timer_self_cancels_when_target_dropped() {
    let target = Rc::new(RefCell::new(Counter::default()));
    let timer = QualityTimer::new(&target, AdaptiveHandle::default());
    drop(target);
    assert_eq!(timer.fire(), TimerStatus::Cancelled);
    assert!(timer.handle().is_cancelled());
}

#[test]
fn cancelled_handle_stops_timer() {
    let target = Rc::new(RefCell::new(Counter::default()));
    let handle = AdaptiveHandle::default();
    let timer = QualityTimer::new(&target, handle.clone());
    handle.cancel();
    assert_eq!(timer.fire(), TimerStatus::Cancelled);
    assert_eq!(target.borrow().fired, 0);
}

#[test]
fn busy_target_skips_one_period() {
    let target = Rc::new(RefCell::new(Counter::default()));
    let timer = QualityTimer::new(&target, AdaptiveHandle::default());
    let guard = target.borrow_mut();
    assert_eq!(timer.fire(), TimerStatus::Continue);
    drop(guard);
    assert_eq!(target.borrow().fired, 0);
}

#![allow(clippy::float_cmp)]

use super::*;
use crate::support_test::{Call, FakeSurface, RecordingEngine};

// =============================================================
// Backing size
// =============================================================

#[test]
fn backing_size_scales_by_dpr() {
    let size = BackingSize::for_logical(400.0, 300.0, 2.0);
    assert_eq!(size, BackingSize { width: 800, height: 600 });
}

#[test]
fn backing_size_rounds_fractional_ratios() {
    let size = BackingSize::for_logical(333.0, 100.0, 1.5);
    assert_eq!(size, BackingSize { width: 500, height: 150 });
}

#[test]
fn first_tick_always_sizes_surface() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(640.0, 480.0, 1.0);
    assert!(frames.sync_backing(&mut surface));
    assert_eq!(surface.writes, vec![BackingSize { width: 640, height: 480 }]);
}

#[test]
fn unchanged_size_resizes_at_most_once() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(640.0, 480.0, 2.0);
    frames.sync_backing(&mut surface);
    assert!(!frames.sync_backing(&mut surface));
    assert!(!frames.sync_backing(&mut surface));
    assert_eq!(surface.writes.len(), 1);
    assert_eq!(frames.resizes(), 1);
}

#[test]
fn logical_resize_triggers_one_write() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(640.0, 480.0, 1.0);
    frames.sync_backing(&mut surface);
    surface.rect.width = 1024.0;
    frames.sync_backing(&mut surface);
    frames.sync_backing(&mut surface);
    assert_eq!(surface.writes.last(), Some(&BackingSize { width: 1024, height: 480 }));
    assert_eq!(surface.writes.len(), 2);
}

#[test]
fn dpr_change_triggers_resize() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(100.0, 100.0, 1.0);
    frames.sync_backing(&mut surface);
    surface.dpr = 3.0;
    assert!(frames.sync_backing(&mut surface));
    assert_eq!(surface.writes.last(), Some(&BackingSize { width: 300, height: 300 }));
}

#[test]
fn invalid_dpr_falls_back_to_one() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(100.0, 50.0, 0.0);
    frames.sync_backing(&mut surface);
    assert_eq!(frames.timing().device_pixel_ratio, 1.0);
    assert_eq!(surface.writes, vec![BackingSize { width: 100, height: 50 }]);
}

// =============================================================
// Tick
// =============================================================

#[test]
fn tick_updates_then_renders_with_logical_size() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(800.0, 600.0, 2.0);
    let mut engine = RecordingEngine::default();
    assert!(frames.tick(&mut surface, &mut engine).is_ok());
    assert_eq!(
        engine.calls,
        vec![Call::Update, Call::Render { width: 800.0, height: 600.0, dpr: 2.0 }]
    );
    assert_eq!(frames.frames(), 1);
}

#[test]
fn failed_update_skips_render() {
    let mut frames = FrameScheduler::new();
    let mut surface = FakeSurface::new(800.0, 600.0, 1.0);
    let mut engine = RecordingEngine::failing_update_at(1);
    assert!(frames.tick(&mut surface, &mut engine).is_err());
    assert_eq!(engine.renders(), 0);
    assert_eq!(frames.frames(), 0);
}

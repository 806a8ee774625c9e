#![allow(clippy::float_cmp)]

use super::*;

const FRAME_MS: f64 = 1000.0 / 60.0;

/// Feed a constant fps reading at 60 Hz until the benchmark finishes.
fn run_constant(fps: f64, duration_secs: f64) -> BenchmarkReport {
    let mut bench = Benchmark::new(duration_secs, 0.0);
    let mut frame = 1_u32;
    loop {
        if let BenchmarkStep::Done(report) = bench.sample(f64::from(frame) * FRAME_MS, fps) {
            return report;
        }
        frame += 1;
    }
}

// =============================================================
// Recommendation
// =============================================================

#[test]
fn constant_55_fps_recommends_high() {
    let report = run_constant(55.0, 5.0);
    assert_eq!(report.recommendation, Recommendation::High);
    assert!((report.avg_fps - 55.0).abs() < 1e-9);
}

#[test]
fn constant_40_fps_recommends_medium() {
    assert_eq!(run_constant(40.0, 5.0).recommendation, Recommendation::Medium);
}

#[test]
fn constant_20_fps_recommends_low() {
    assert_eq!(run_constant(20.0, 5.0).recommendation, Recommendation::Low);
}

#[test]
fn thresholds_are_exclusive() {
    assert_eq!(Recommendation::from_avg_fps(50.0), Recommendation::Medium);
    assert_eq!(Recommendation::from_avg_fps(30.0), Recommendation::Low);
    assert_eq!(Recommendation::from_avg_fps(50.1), Recommendation::High);
}

#[test]
fn recommendation_selects_preset() {
    assert_eq!(Recommendation::Low.preset(), Preset::LowPower(true));
    assert_eq!(Recommendation::Medium.preset(), Preset::Balanced);
    assert_eq!(Recommendation::High.preset(), Preset::HighPerformance(true));
}

// =============================================================
// Sampling window
// =============================================================

#[test]
fn window_counts_frames_inside_duration() {
    let report = run_constant(60.0, 5.0);
    assert_eq!(report.duration, 5.0);
    // Frames at 1..=299 fall before t = 5 s; frame 300 lands on it.
    assert_eq!(report.total_frames, 299);
}

#[test]
fn min_and_max_track_readings() {
    let mut bench = Benchmark::new(1.0, 0.0);
    bench.sample(100.0, 30.0);
    bench.sample(200.0, 60.0);
    bench.sample(300.0, 45.0);
    let BenchmarkStep::Done(report) = bench.sample(1000.0, 10.0) else {
        panic!("expected completion");
    };
    assert_eq!(report.total_frames, 3);
    assert_eq!(report.min_fps, 30.0);
    assert_eq!(report.max_fps, 60.0);
    assert_eq!(report.avg_fps, 45.0);
}

#[test]
fn zero_readings_count_frames_but_not_stats() {
    let mut bench = Benchmark::new(1.0, 0.0);
    bench.sample(100.0, 0.0);
    bench.sample(200.0, 0.0);
    let BenchmarkStep::Done(report) = bench.sample(2000.0, 0.0) else {
        panic!("expected completion");
    };
    assert_eq!(report.total_frames, 2);
    assert_eq!(report.avg_fps, 0.0);
    assert_eq!(report.min_fps, 0.0);
    assert_eq!(report.max_fps, 0.0);
    assert_eq!(report.recommendation, Recommendation::Low);
}

#[test]
fn invalid_duration_uses_default() {
    assert_eq!(Benchmark::new(0.0, 0.0).duration_secs(), 5.0);
    assert_eq!(Benchmark::new(f64::NAN, 0.0).duration_secs(), 5.0);
    assert_eq!(Benchmark::new(-2.0, 0.0).duration_secs(), 5.0);
}

#[test]
fn report_serializes_camel_case() {
    let report = run_constant(40.0, 1.0);
    let json = serde_json::to_value(report).unwrap_or_default();
    assert_eq!(json["recommendation"], "medium");
    assert!(json.get("totalFrames").is_some());
    assert!(json.get("avgFps").is_some());
}

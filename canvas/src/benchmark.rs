//! One-shot frame-rate benchmark and the auto-optimize decision built on it.
//!
//! The sampler runs for a fixed wall-clock window, taking one fps reading per
//! display refresh. When the window closes it reports the aggregate and a
//! coarse recommendation that maps to one of three presets. There is no
//! feedback after that single decision.

#[cfg(test)]
#[path = "benchmark_test.rs"]
mod benchmark_test;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{BENCHMARK_DEFAULT_SECS, BENCHMARK_HIGH_FPS, BENCHMARK_MEDIUM_FPS};
use crate::settings::Preset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Low,
    Medium,
    High,
}

impl Recommendation {
    #[must_use]
    pub fn from_avg_fps(avg_fps: f64) -> Self {
        if avg_fps > BENCHMARK_HIGH_FPS {
            Self::High
        } else if avg_fps > BENCHMARK_MEDIUM_FPS {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Preset applied by auto-optimize for this recommendation.
    #[must_use]
    pub fn preset(self) -> Preset {
        match self {
            Self::Low => Preset::LowPower(true),
            Self::Medium => Preset::Balanced,
            Self::High => Preset::HighPerformance(true),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    /// Sampling window in seconds.
    pub duration: f64,
    /// Refreshes observed inside the window.
    pub total_frames: u64,
    /// Mean of the positive fps readings; `0` if there were none.
    pub avg_fps: f64,
    /// `0` if there were no positive readings.
    pub min_fps: f64,
    pub max_fps: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BenchmarkStep {
    Running,
    Done(BenchmarkReport),
}

#[derive(Debug, Clone)]
pub struct Benchmark {
    duration_secs: f64,
    started_ms: f64,
    frames: u64,
    readings: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Benchmark {
    /// Start a window of `duration_secs` at `now_ms`. A non-positive or
    /// non-finite duration falls back to the default window.
    #[must_use]
    pub fn new(duration_secs: f64, now_ms: f64) -> Self {
        let duration_secs =
            if duration_secs.is_finite() && duration_secs > 0.0 { duration_secs } else { BENCHMARK_DEFAULT_SECS };
        info!(duration_secs, "starting benchmark");
        Self {
            duration_secs,
            started_ms: now_ms,
            frames: 0,
            readings: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: 0.0,
        }
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Record one refresh. Returns the report on the first refresh at or
    /// past the end of the window.
    pub fn sample(&mut self, now_ms: f64, fps: f64) -> BenchmarkStep {
        let elapsed_secs = (now_ms - self.started_ms) / 1000.0;
        if elapsed_secs < self.duration_secs {
            self.frames += 1;
            if fps > 0.0 {
                self.readings += 1;
                self.sum += fps;
                self.min = self.min.min(fps);
                self.max = self.max.max(fps);
            }
            return BenchmarkStep::Running;
        }
        BenchmarkStep::Done(self.report())
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self) -> BenchmarkReport {
        let avg_fps = if self.readings > 0 { self.sum / self.readings as f64 } else { 0.0 };
        let report = BenchmarkReport {
            duration: self.duration_secs,
            total_frames: self.frames,
            avg_fps,
            min_fps: if self.min.is_finite() { self.min } else { 0.0 },
            max_fps: self.max,
            recommendation: Recommendation::from_avg_fps(avg_fps),
        };
        info!(
            duration_secs = report.duration,
            total_frames = report.total_frames,
            avg_fps = report.avg_fps,
            min_fps = report.min_fps,
            max_fps = report.max_fps,
            recommendation = report.recommendation.as_str(),
            "benchmark results"
        );
        report
    }
}

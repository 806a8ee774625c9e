//! Native host configuration parsed from `SKYHOST_*` environment variables.
//!
//! Every variable is optional. A variable that is set but does not parse is
//! an error rather than a silent fallback to the default.

use std::path::PathBuf;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_DURATION_SECS: f64 = 10.0;
pub const DEFAULT_TICK_HZ: u32 = 60;
pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const DEFAULT_BASE_FRAME_MS: f64 = 12.0;
pub const DEFAULT_JITTER: f64 = 0.1;
pub const DEFAULT_WIDTH: f64 = 1280.0;
pub const DEFAULT_HEIGHT: f64 = 720.0;
pub const DEFAULT_DPR: f64 = 1.0;

/// Errors produced while reading host configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value does not parse as the expected type.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    /// A numeric variable must be strictly positive.
    #[error("{key} must be positive, got {value}")]
    NotPositive { key: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Total run time before the host shuts down.
    pub duration_secs: f64,
    /// Refresh rate of the simulated display.
    pub tick_hz: u32,
    pub target_fps: u32,
    /// Start the adaptive quality timer.
    pub adaptive: bool,
    /// Run a benchmark of this length at startup.
    pub benchmark_secs: Option<f64>,
    /// Run auto-optimize at startup.
    pub auto_optimize: bool,
    /// JSON input script replayed against the host.
    pub script: Option<PathBuf>,
    /// Simulated cost of one full-quality frame.
    pub base_frame_ms: f64,
    /// Relative frame cost noise, `0` for a steady engine.
    pub jitter: f64,
    /// Make the engine fail its n-th update.
    pub fail_after_frames: Option<u64>,
    pub release_on_leave: bool,
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    /// Seed for the frame cost noise.
    pub seed: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            tick_hz: DEFAULT_TICK_HZ,
            target_fps: DEFAULT_TARGET_FPS,
            adaptive: true,
            benchmark_secs: None,
            auto_optimize: false,
            script: None,
            base_frame_ms: DEFAULT_BASE_FRAME_MS,
            jitter: DEFAULT_JITTER,
            fail_after_frames: None,
            release_on_leave: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            device_pixel_ratio: DEFAULT_DPR,
            seed: 0,
        }
    }
}

impl HostConfig {
    /// Build typed host config from the process environment.
    ///
    /// Optional:
    /// - `SKYHOST_DURATION_SECS`: default 10
    /// - `SKYHOST_TICK_HZ`: default 60
    /// - `SKYHOST_TARGET_FPS`: default 60
    /// - `SKYHOST_ADAPTIVE`: `true` (default) or `false`
    /// - `SKYHOST_BENCHMARK_SECS`: unset by default
    /// - `SKYHOST_AUTO_OPTIMIZE`: default `false`
    /// - `SKYHOST_SCRIPT`: path to a JSON input script
    /// - `SKYHOST_BASE_FRAME_MS`: default 12
    /// - `SKYHOST_JITTER`: default 0.1
    /// - `SKYHOST_FAIL_AFTER_FRAMES`: unset by default
    /// - `SKYHOST_RELEASE_ON_LEAVE`: default `false`
    /// - `SKYHOST_WIDTH` / `SKYHOST_HEIGHT` / `SKYHOST_DPR`: 1280 / 720 / 1
    /// - `SKYHOST_SEED`: default 0
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HostConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let env = Env(lookup);
        Ok(Self {
            duration_secs: env.positive("SKYHOST_DURATION_SECS", defaults.duration_secs)?,
            tick_hz: env.parse("SKYHOST_TICK_HZ")?.unwrap_or(defaults.tick_hz).max(1),
            target_fps: env.parse("SKYHOST_TARGET_FPS")?.unwrap_or(defaults.target_fps),
            adaptive: env.flag("SKYHOST_ADAPTIVE")?.unwrap_or(defaults.adaptive),
            benchmark_secs: env.parse("SKYHOST_BENCHMARK_SECS")?,
            auto_optimize: env.flag("SKYHOST_AUTO_OPTIMIZE")?.unwrap_or(defaults.auto_optimize),
            script: env.raw("SKYHOST_SCRIPT").map(PathBuf::from),
            base_frame_ms: env.positive("SKYHOST_BASE_FRAME_MS", defaults.base_frame_ms)?,
            jitter: env.parse("SKYHOST_JITTER")?.unwrap_or(defaults.jitter).clamp(0.0, 1.0),
            fail_after_frames: env.parse("SKYHOST_FAIL_AFTER_FRAMES")?,
            release_on_leave: env.flag("SKYHOST_RELEASE_ON_LEAVE")?.unwrap_or(defaults.release_on_leave),
            width: env.positive("SKYHOST_WIDTH", defaults.width)?,
            height: env.positive("SKYHOST_HEIGHT", defaults.height)?,
            device_pixel_ratio: env.positive("SKYHOST_DPR", defaults.device_pixel_ratio)?,
            seed: env.parse("SKYHOST_SEED")?.unwrap_or(defaults.seed),
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn raw(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        value.parse::<T>().map(Some).map_err(|_| ConfigError::Invalid { key, value })
    }

    fn positive(&self, key: &'static str, default: f64) -> Result<f64, ConfigError> {
        let value = self.parse::<f64>(key)?.unwrap_or(default);
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::NotPositive { key, value })
        }
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { key, value }),
        }
    }
}

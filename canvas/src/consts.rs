//! Shared numeric constants for the canvas crate.

// ── Gestures ────────────────────────────────────────────────────

/// Minimum pinch scale change before a zoom is forwarded to the engine.
pub const PINCH_JITTER_THRESHOLD: f64 = 0.005;

/// Base of the exponential wheel zoom curve.
pub const WHEEL_ZOOM_BASE: f64 = 1.05;

/// Multiplier applied to the normalized wheel delta before exponentiation.
pub const WHEEL_DELTA_GAIN: f64 = 2.0;

/// `wheelDelta` units per notch for the legacy `mousewheel` event.
pub const WHEEL_DELTA_PER_NOTCH: f64 = 120.0;

/// Buttons mask reported for touch identities.
pub const TOUCH_BUTTONS: u32 = 1;

// ── Quality controller ──────────────────────────────────────────

/// Wall-clock period between controller evaluations, in milliseconds.
pub const QUALITY_EVAL_PERIOD_MS: u32 = 2000;

/// Frame time above `budget * this` steps quality down.
pub const QUALITY_DEGRADE_RATIO: f64 = 1.5;

/// Frame time below `budget * this` steps quality up.
pub const QUALITY_UPGRADE_RATIO: f64 = 0.7;

/// Label density removed per downward step.
pub const LABEL_DENSITY_DOWN_STEP: f64 = 0.2;

/// Label density added per upward step.
pub const LABEL_DENSITY_UP_STEP: f64 = 0.1;

/// Lowest label density a downward step will reach.
pub const LABEL_DENSITY_FLOOR: f64 = 0.3;

/// Highest quality level (0 = low, 1 = medium, 2 = high).
pub const MAX_QUALITY_LEVEL: u8 = 2;

// ── Benchmark ───────────────────────────────────────────────────

/// Default benchmark sampling window, in seconds.
pub const BENCHMARK_DEFAULT_SECS: f64 = 5.0;

/// Sampling window used by auto-optimize, in seconds.
pub const AUTO_OPTIMIZE_SECS: f64 = 3.0;

/// Average fps above which the recommendation is "high".
pub const BENCHMARK_HIGH_FPS: f64 = 50.0;

/// Average fps above which the recommendation is "medium".
pub const BENCHMARK_MEDIUM_FPS: f64 = 30.0;

// ── Settings bounds ─────────────────────────────────────────────

pub const SENSITIVITY_MIN: f64 = 0.1;
pub const SENSITIVITY_MAX: f64 = 5.0;
pub const TARGET_FPS_MAX: u32 = 120;
pub const MIN_FPS_MAX: u32 = 60;

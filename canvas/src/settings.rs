//! Engine configuration fields, clamping setters and canned presets.
//!
//! DESIGN
//! ======
//! The engine owns the live values; `EngineSettings` is a snapshot that the
//! host reads, edits and writes back within one synchronous call. Setters take
//! optional partial updates so callers can change a single field, and every
//! numeric input is clamped to its documented range instead of being
//! rejected. Whoever writes last wins: nothing here remembers prior values.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_QUALITY_LEVEL, MIN_FPS_MAX, SENSITIVITY_MAX, SENSITIVITY_MIN, TARGET_FPS_MAX};

/// Inertia knobs consumed by the engine when a pan or pinch is released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inertia {
    pub enabled: bool,
    /// Per-frame velocity retention in `[0, 1]`; higher glides longer.
    pub friction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchSensitivity {
    pub pan: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderQuality {
    /// 0 = low, 1 = medium, 2 = high.
    pub level: u8,
    /// Text-label draw volume multiplier in `[0, 1]`.
    pub label_density: f64,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSettings {
    pub adaptive_fps: bool,
    pub target_fps: u32,
    pub min_fps: u32,
    pub skip_frames: bool,
    /// `0` means unlimited.
    pub max_stars_per_frame: u32,
    /// `0` means unlimited.
    pub max_labels_per_frame: u32,
    pub defer_text_render: bool,
}

/// Every configuration field the engine exposes to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub pinch_inertia: Inertia,
    pub pan_inertia: Inertia,
    pub touch_sensitivity: TouchSensitivity,
    pub render_quality: RenderQuality,
    pub performance: PerformanceSettings,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            adaptive_fps: false,
            target_fps: 60,
            min_fps: 30,
            skip_frames: false,
            max_stars_per_frame: 0,
            max_labels_per_frame: 0,
            defer_text_render: false,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pinch_inertia: Inertia { enabled: true, friction: 0.92 },
            pan_inertia: Inertia { enabled: true, friction: 0.95 },
            touch_sensitivity: TouchSensitivity { pan: 1.0, zoom: 1.0 },
            render_quality: RenderQuality { level: MAX_QUALITY_LEVEL, label_density: 1.0 },
            performance: PerformanceSettings::default(),
        }
    }
}

// =============================================================================
// PARTIAL UPDATES
// =============================================================================

/// Partial inertia update; `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InertiaUpdate {
    pub enabled: Option<bool>,
    pub friction: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityUpdate {
    pub pan: Option<f64>,
    pub zoom: Option<f64>,
}

/// Partial render-quality update. `level` is floored, then clamped to `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityUpdate {
    pub level: Option<f64>,
    pub label_density: Option<f64>,
}

/// Grouped mobile update; each group is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSettings {
    pub pinch_inertia: Option<InertiaUpdate>,
    pub pan_inertia: Option<InertiaUpdate>,
    pub touch_sensitivity: Option<SensitivityUpdate>,
    pub render_quality: Option<QualityUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceUpdate {
    pub adaptive_fps: Option<bool>,
    pub target_fps: Option<f64>,
    pub min_fps: Option<f64>,
    pub skip_frames: Option<bool>,
    pub max_stars_per_frame: Option<f64>,
    pub max_labels_per_frame: Option<f64>,
    pub defer_text_render: Option<bool>,
}

impl InertiaUpdate {
    #[must_use]
    pub fn new(enabled: bool, friction: f64) -> Self {
        Self { enabled: Some(enabled), friction: Some(friction) }
    }
}

impl QualityUpdate {
    #[must_use]
    pub fn level(level: f64) -> Self {
        Self { level: Some(level), label_density: None }
    }

    #[must_use]
    pub fn new(level: f64, label_density: f64) -> Self {
        Self { level: Some(level), label_density: Some(label_density) }
    }
}

impl EngineSettings {
    pub fn apply_pinch_inertia(&mut self, update: InertiaUpdate) {
        apply_inertia(&mut self.pinch_inertia, update);
    }

    pub fn apply_pan_inertia(&mut self, update: InertiaUpdate) {
        apply_inertia(&mut self.pan_inertia, update);
    }

    pub fn apply_touch_sensitivity(&mut self, update: SensitivityUpdate) {
        if let Some(pan) = update.pan {
            self.touch_sensitivity.pan = clamp_f64(pan, SENSITIVITY_MIN, SENSITIVITY_MAX);
        }
        if let Some(zoom) = update.zoom {
            self.touch_sensitivity.zoom = clamp_f64(zoom, SENSITIVITY_MIN, SENSITIVITY_MAX);
        }
    }

    pub fn apply_render_quality(&mut self, update: QualityUpdate) {
        if let Some(level) = update.level {
            self.render_quality.level = clamp_level(level);
        }
        if let Some(density) = update.label_density {
            self.render_quality.label_density = clamp_f64(density, 0.0, 1.0);
        }
    }

    pub fn apply_mobile(&mut self, update: &MobileSettings) {
        if let Some(pinch) = update.pinch_inertia {
            self.apply_pinch_inertia(pinch);
        }
        if let Some(pan) = update.pan_inertia {
            self.apply_pan_inertia(pan);
        }
        if let Some(sensitivity) = update.touch_sensitivity {
            self.apply_touch_sensitivity(sensitivity);
        }
        if let Some(quality) = update.render_quality {
            self.apply_render_quality(quality);
        }
    }

    pub fn apply_performance(&mut self, update: &PerformanceUpdate) {
        let perf = &mut self.performance;
        if let Some(adaptive) = update.adaptive_fps {
            perf.adaptive_fps = adaptive;
        }
        if let Some(target) = update.target_fps {
            perf.target_fps = clamp_count(target, 1, TARGET_FPS_MAX);
        }
        if let Some(min) = update.min_fps {
            perf.min_fps = clamp_count(min, 1, MIN_FPS_MAX);
        }
        if let Some(skip) = update.skip_frames {
            perf.skip_frames = skip;
        }
        if let Some(stars) = update.max_stars_per_frame {
            perf.max_stars_per_frame = clamp_count(stars, 0, u32::MAX);
        }
        if let Some(labels) = update.max_labels_per_frame {
            perf.max_labels_per_frame = clamp_count(labels, 0, u32::MAX);
        }
        if let Some(defer) = update.defer_text_render {
            perf.defer_text_render = defer;
        }
    }

    /// All mobile groups as a fully-populated update.
    #[must_use]
    pub fn mobile(&self) -> MobileSettings {
        MobileSettings {
            pinch_inertia: Some(InertiaUpdate::new(self.pinch_inertia.enabled, self.pinch_inertia.friction)),
            pan_inertia: Some(InertiaUpdate::new(self.pan_inertia.enabled, self.pan_inertia.friction)),
            touch_sensitivity: Some(SensitivityUpdate {
                pan: Some(self.touch_sensitivity.pan),
                zoom: Some(self.touch_sensitivity.zoom),
            }),
            render_quality: Some(QualityUpdate::new(
                f64::from(self.render_quality.level),
                self.render_quality.label_density,
            )),
        }
    }
}

fn apply_inertia(inertia: &mut Inertia, update: InertiaUpdate) {
    if let Some(enabled) = update.enabled {
        inertia.enabled = enabled;
    }
    if let Some(friction) = update.friction {
        inertia.friction = clamp_f64(friction, 0.0, 1.0);
    }
}

/// NaN collapses to `min` so a bad input can never poison a field.
fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_level(level: f64) -> u8 {
    clamp_f64(level.floor(), 0.0, f64::from(MAX_QUALITY_LEVEL)) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_count(value: f64, min: u32, max: u32) -> u32 {
    clamp_f64(value, f64::from(min), f64::from(max)) as u32
}

// =============================================================================
// PRESETS
// =============================================================================

/// Canned configurations built from the primitive fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Aggressive mobile tuning: lighter inertia, medium quality.
    MobileAggressive,
    /// Recommended mobile tuning.
    MobileStandard,
    /// Desktop defaults: inertia off, full quality.
    MobileDisabled,
    /// Battery saving when `true`; restores full-rate defaults when `false`.
    LowPower(bool),
    /// Uncapped full-quality rendering when `true`; defaults when `false`.
    HighPerformance(bool),
    /// Middle ground picked by auto-optimize for "medium" devices.
    Balanced,
}

impl Preset {
    pub fn apply(self, settings: &mut EngineSettings) {
        match self {
            Self::MobileAggressive => settings.apply_mobile(&MobileSettings {
                pinch_inertia: Some(InertiaUpdate::new(true, 0.88)),
                pan_inertia: Some(InertiaUpdate::new(true, 0.90)),
                touch_sensitivity: Some(SensitivityUpdate { pan: Some(1.2), zoom: Some(1.0) }),
                render_quality: Some(QualityUpdate::new(1.0, 0.6)),
            }),
            Self::MobileStandard => settings.apply_mobile(&MobileSettings {
                pinch_inertia: Some(InertiaUpdate::new(true, 0.92)),
                pan_inertia: Some(InertiaUpdate::new(true, 0.95)),
                touch_sensitivity: Some(SensitivityUpdate { pan: Some(1.0), zoom: Some(1.0) }),
                render_quality: Some(QualityUpdate::new(2.0, 0.8)),
            }),
            Self::MobileDisabled => settings.apply_mobile(&MobileSettings {
                pinch_inertia: Some(InertiaUpdate::new(false, 0.92)),
                pan_inertia: Some(InertiaUpdate::new(false, 0.95)),
                touch_sensitivity: Some(SensitivityUpdate { pan: Some(1.0), zoom: Some(1.0) }),
                render_quality: Some(QualityUpdate::new(2.0, 1.0)),
            }),
            Self::LowPower(true) => {
                settings.apply_performance(&PerformanceUpdate {
                    adaptive_fps: Some(true),
                    target_fps: Some(30.0),
                    min_fps: Some(15.0),
                    skip_frames: Some(true),
                    max_stars_per_frame: Some(5000.0),
                    max_labels_per_frame: Some(50.0),
                    defer_text_render: Some(true),
                });
                settings.apply_mobile(&MobileSettings {
                    pinch_inertia: Some(InertiaUpdate::new(true, 0.85)),
                    pan_inertia: Some(InertiaUpdate::new(true, 0.90)),
                    touch_sensitivity: None,
                    render_quality: Some(QualityUpdate::new(0.0, 0.5)),
                });
            }
            Self::LowPower(false) => {
                settings.apply_performance(&default_performance());
                settings.apply_render_quality(QualityUpdate::level(2.0));
            }
            Self::HighPerformance(true) => {
                settings.apply_performance(&PerformanceUpdate {
                    min_fps: Some(60.0),
                    ..default_performance()
                });
                settings.apply_render_quality(QualityUpdate::level(2.0));
            }
            Self::HighPerformance(false) => settings.apply_performance(&default_performance()),
            Self::Balanced => {
                settings.apply_performance(&PerformanceUpdate {
                    adaptive_fps: Some(true),
                    target_fps: Some(45.0),
                    skip_frames: Some(true),
                    max_stars_per_frame: Some(10_000.0),
                    max_labels_per_frame: Some(100.0),
                    ..PerformanceUpdate::default()
                });
                settings.apply_render_quality(QualityUpdate::level(1.0));
            }
        }
    }
}

fn default_performance() -> PerformanceUpdate {
    PerformanceUpdate {
        adaptive_fps: Some(false),
        target_fps: Some(60.0),
        min_fps: Some(30.0),
        skip_frames: Some(false),
        max_stars_per_frame: Some(0.0),
        max_labels_per_frame: Some(0.0),
        defer_text_render: Some(false),
    }
}

//! Simulated engine and surface for running the host without a browser.
//!
//! Frame cost scales with the render quality the controller selects, so the
//! adaptive loop can be observed closing: a slow base cost drives quality down
//! until the rolling average fits the budget.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use skycanvas::boundary::{BoundaryError, EngineBoundary, Phase, PerformanceSample, PointerEvent, PointerId, ZoomEvent};
use skycanvas::frame::{BackingSize, Surface};
use skycanvas::geom::{Point, Rect};
use skycanvas::settings::EngineSettings;

#[cfg(test)]
#[path = "sim_test.rs"]
mod sim_test;

/// Frames in the rolling performance window.
const PERF_WINDOW: usize = 30;

const MIN_MAGNIFICATION: f64 = 0.01;
const MAX_MAGNIFICATION: f64 = 1.0e6;

/// Relative cost of quality levels 0, 1 and 2.
const LEVEL_COST: [f64; 3] = [0.5, 0.75, 1.0];

#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub base_frame_ms: f64,
    pub jitter: f64,
    pub fail_after_frames: Option<u64>,
    pub seed: u64,
}

pub struct SimEngine {
    options: SimOptions,
    settings: EngineSettings,
    rng: StdRng,
    frame_times: VecDeque<f64>,
    pointers: HashMap<PointerId, Point>,
    magnification: f64,
    updates: u64,
    last_viewport: Option<(f64, f64, f64)>,
}

impl SimEngine {
    #[must_use]
    pub fn new(options: SimOptions) -> Self {
        Self {
            options,
            settings: EngineSettings::default(),
            rng: StdRng::seed_from_u64(options.seed),
            frame_times: VecDeque::with_capacity(PERF_WINDOW),
            pointers: HashMap::new(),
            magnification: 1.0,
            updates: 0,
            last_viewport: None,
        }
    }

    /// Cost of one frame at the current settings, before noise.
    #[must_use]
    pub fn frame_cost(&self) -> f64 {
        let quality = self.settings.render_quality;
        let level = LEVEL_COST[usize::from(quality.level).min(LEVEL_COST.len() - 1)];
        let labels = 0.8 + 0.2 * quality.label_density;
        self.options.base_frame_ms * level * labels
    }

    #[must_use]
    pub fn magnification(&self) -> f64 {
        self.magnification
    }

    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    #[must_use]
    pub fn last_viewport(&self) -> Option<(f64, f64, f64)> {
        self.last_viewport
    }
}

impl EngineBoundary for SimEngine {
    fn pointer_event(&mut self, event: PointerEvent) -> Result<(), BoundaryError> {
        match event.phase {
            Phase::Press | Phase::Move => {
                self.pointers.insert(event.id, event.pos);
            }
            Phase::Release => {
                self.pointers.remove(&event.id);
            }
        }
        debug!(id = event.id, phase = event.phase.code(), x = event.pos.x, y = event.pos.y, "pointer");
        Ok(())
    }

    fn zoom(&mut self, zoom: ZoomEvent) -> Result<(), BoundaryError> {
        self.magnification = (self.magnification * zoom.factor).clamp(MIN_MAGNIFICATION, MAX_MAGNIFICATION);
        debug!(factor = zoom.factor, magnification = self.magnification, "zoom");
        Ok(())
    }

    fn update(&mut self) -> Result<(), BoundaryError> {
        self.updates += 1;
        if self.options.fail_after_frames.is_some_and(|n| self.updates >= n) {
            return Err(BoundaryError::Engine(format!("simulated failure at update {}", self.updates)));
        }
        let noise = if self.options.jitter > 0.0 {
            self.rng.random_range(-self.options.jitter..=self.options.jitter)
        } else {
            0.0
        };
        let cost = self.frame_cost() * (1.0 + noise);
        if self.frame_times.len() == PERF_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(cost);
        Ok(())
    }

    fn render(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Result<(), BoundaryError> {
        self.last_viewport = Some((width, height, device_pixel_ratio));
        Ok(())
    }

    fn settings(&self) -> EngineSettings {
        self.settings
    }

    fn store_settings(&mut self, settings: &EngineSettings) {
        self.settings = *settings;
    }

    #[allow(clippy::cast_precision_loss)]
    fn performance(&self) -> PerformanceSample {
        if self.frame_times.is_empty() {
            return PerformanceSample::default();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64;
        PerformanceSample { fps: 1000.0 / avg_frame_time, avg_frame_time }
    }
}

/// A fixed-size headless canvas.
#[derive(Debug, Clone)]
pub struct SimSurface {
    rect: Rect,
    device_pixel_ratio: f64,
}

impl SimSurface {
    #[must_use]
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self { rect: Rect::new(0.0, 0.0, width, height), device_pixel_ratio }
    }
}

impl Surface for SimSurface {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn set_backing_size(&mut self, size: BackingSize) {
        trace!(width = size.width, height = size.height, "simulated backing store");
    }
}

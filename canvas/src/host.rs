//! The host context: one explicit object that owns every piece of mutable
//! input, frame and quality state, plus the engine it drives.
//!
//! `HostCore` has no browser dependencies so it can be driven from tests and
//! from the native host. The web glue in [`crate::web`] wraps it in an
//! `Rc<RefCell<_>>` shared by the DOM listeners, the refresh loop and the
//! quality timer, all of which run on one thread and never overlap.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};

use crate::benchmark::{Benchmark, BenchmarkReport, BenchmarkStep, Recommendation};
use crate::boundary::{BoundaryError, EngineBoundary, PerformanceSample, PointerEvent, ZoomEvent};
use crate::consts::AUTO_OPTIMIZE_SECS;
use crate::frame::{FrameScheduler, FrameTiming, Surface};
use crate::geom::{Point, Rect};
use crate::gesture::{GestureRecognizer, InputError, PinchState, WheelInput};
use crate::pointer::{PointerTracker, TouchPoint, TrackerOptions};
use crate::quality::{AdaptiveHandle, Adjustment, ControllerState, QualityController, QualityTarget, QualityTimer};
use crate::settings::{
    EngineSettings, Inertia, InertiaUpdate, MobileSettings, PerformanceSettings, PerformanceUpdate, Preset,
    QualityUpdate, RenderQuality, SensitivityUpdate, TouchSensitivity,
};

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

/// Callback receiving a finished benchmark.
pub type ReportCallback = Box<dyn FnOnce(BenchmarkReport)>;

/// Callback receiving the auto-optimize decision.
pub type RecommendationCallback = Box<dyn FnOnce(Recommendation)>;

enum Completion {
    Report(Option<ReportCallback>),
    AutoOptimize(Option<RecommendationCallback>),
}

struct PendingBenchmark {
    sampler: Benchmark,
    completion: Completion,
}

/// Statistics exposed to callers, in the shape of the JS facade.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub fps: f64,
    pub avg_frame_time: f64,
    pub target_fps: u32,
}

pub struct HostCore<E: EngineBoundary> {
    pub engine: E,
    pointers: PointerTracker,
    gestures: GestureRecognizer,
    frames: FrameScheduler,
    quality: QualityController,
    benchmarks: Vec<PendingBenchmark>,
    debug_mode: bool,
}

impl<E: EngineBoundary> HostCore<E> {
    #[must_use]
    pub fn new(engine: E, options: TrackerOptions) -> Self {
        Self {
            engine,
            pointers: PointerTracker::new(options),
            gestures: GestureRecognizer::new(),
            frames: FrameScheduler::new(),
            quality: QualityController::new(),
            benchmarks: Vec::new(),
            debug_mode: false,
        }
    }

    // --- Mouse ---

    pub fn on_mouse_down(&mut self, client: Point, buttons: u32, rect: Rect) {
        let event = self.pointers.mouse_down(client, buttons, rect);
        self.forward_pointer(event);
    }

    pub fn on_mouse_move(&mut self, client: Point, rect: Rect) {
        if let Some(event) = self.pointers.mouse_move(client, rect) {
            self.forward_pointer(event);
        }
    }

    pub fn on_mouse_up(&mut self, client: Point, rect: Rect) {
        if let Some(event) = self.pointers.mouse_up(client, rect) {
            self.forward_pointer(event);
        }
    }

    pub fn on_mouse_leave(&mut self) {
        if let Some(event) = self.pointers.mouse_leave() {
            self.forward_pointer(event);
        }
    }

    /// Legacy wheel event. An unrecognized `kind` fails this call only.
    pub fn on_wheel(
        &mut self,
        kind: &str,
        wheel_delta: f64,
        detail: f64,
        client: Point,
        rect: Rect,
    ) -> Result<(), InputError> {
        let input = WheelInput::from_event(kind, wheel_delta, detail).inspect_err(|e| {
            warn!(error = %e, "wheel event ignored");
        })?;
        let zoom = self.gestures.wheel(input, rect.to_local(client));
        self.forward_zoom(zoom);
        Ok(())
    }

    // --- Touch ---

    pub fn on_touch_start(&mut self, changed: &[TouchPoint], rect: Rect) {
        let events = self.pointers.touch_start(changed, rect);
        self.gestures.touches_changed(self.pointers.touch_pair());
        self.dispatch(None, &events);
    }

    pub fn on_touch_move(&mut self, changed: &[TouchPoint], rect: Rect) {
        let events = self.pointers.touch_move(changed, rect);
        let zoom = self.gestures.touch_moved(self.pointers.touch_pair());
        self.dispatch(zoom, &events);
    }

    pub fn on_touch_end(&mut self, changed: &[TouchPoint], rect: Rect) {
        let events = self.pointers.touch_end(changed, rect);
        self.gestures.touches_changed(self.pointers.touch_pair());
        self.dispatch(None, &events);
    }

    /// Like `touchend`, but any pinch in progress is abandoned even if two
    /// touches remain; they start a fresh baseline.
    pub fn on_touch_cancel(&mut self, changed: &[TouchPoint], rect: Rect) {
        let events = self.pointers.touch_end(changed, rect);
        self.gestures.cancel();
        self.gestures.touches_changed(self.pointers.touch_pair());
        self.dispatch(None, &events);
    }

    fn dispatch(&mut self, zoom: Option<ZoomEvent>, events: &[PointerEvent]) {
        if let Some(zoom) = zoom {
            self.forward_zoom(zoom);
        }
        for event in events {
            self.forward_pointer(*event);
        }
    }

    // Input handlers have no caller to report to: a rejected event is logged
    // and dropped, and the next frame surfaces a persistent failure.
    fn forward_pointer(&mut self, event: PointerEvent) {
        if let Err(e) = self.engine.pointer_event(event) {
            warn!(error = %e, id = event.id, "pointer event dropped");
        }
    }

    fn forward_zoom(&mut self, zoom: ZoomEvent) {
        if let Err(e) = self.engine.zoom(zoom) {
            warn!(error = %e, factor = zoom.factor, "zoom dropped");
        }
    }

    // --- Frame ---

    /// One display refresh: drag keep-alive, backing-store sync, `update`,
    /// `render`, then one sample for every running benchmark.
    ///
    /// An error means the engine failed, the keep-alive move included; the
    /// caller must stop scheduling.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, now_ms: f64) -> Result<(), BoundaryError> {
        if let Some(event) = self.pointers.synthetic_move() {
            self.engine.pointer_event(event)?;
        }
        self.frames.tick(surface, &mut self.engine)?;
        self.sample_benchmarks(now_ms);
        Ok(())
    }

    #[must_use]
    pub fn frame_timing(&self) -> FrameTiming {
        self.frames.timing()
    }

    #[must_use]
    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    #[must_use]
    pub fn pointers(&self) -> &PointerTracker {
        &self.pointers
    }

    #[must_use]
    pub fn pinch(&self) -> PinchState {
        self.gestures.pinch()
    }

    // --- Settings ---

    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        self.engine.settings()
    }

    /// Read-modify-write of the engine's configuration within one call.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut EngineSettings)) {
        let mut settings = self.engine.settings();
        edit(&mut settings);
        self.engine.store_settings(&settings);
    }

    pub fn set_pinch_inertia(&mut self, update: InertiaUpdate) {
        self.update_settings(|s| s.apply_pinch_inertia(update));
    }

    #[must_use]
    pub fn pinch_inertia(&self) -> Inertia {
        self.settings().pinch_inertia
    }

    pub fn set_pan_inertia(&mut self, update: InertiaUpdate) {
        self.update_settings(|s| s.apply_pan_inertia(update));
    }

    #[must_use]
    pub fn pan_inertia(&self) -> Inertia {
        self.settings().pan_inertia
    }

    pub fn set_touch_sensitivity(&mut self, update: SensitivityUpdate) {
        self.update_settings(|s| s.apply_touch_sensitivity(update));
    }

    #[must_use]
    pub fn touch_sensitivity(&self) -> TouchSensitivity {
        self.settings().touch_sensitivity
    }

    pub fn set_render_quality(&mut self, update: QualityUpdate) {
        self.update_settings(|s| s.apply_render_quality(update));
    }

    #[must_use]
    pub fn render_quality(&self) -> RenderQuality {
        self.settings().render_quality
    }

    pub fn set_mobile_settings(&mut self, update: &MobileSettings) {
        self.update_settings(|s| s.apply_mobile(update));
    }

    #[must_use]
    pub fn mobile_settings(&self) -> MobileSettings {
        self.settings().mobile()
    }

    pub fn enable_mobile_optimizations(&mut self, aggressive: bool) {
        self.apply_preset(if aggressive { Preset::MobileAggressive } else { Preset::MobileStandard });
    }

    pub fn disable_mobile_optimizations(&mut self) {
        self.apply_preset(Preset::MobileDisabled);
    }

    pub fn set_performance_settings(&mut self, update: &PerformanceUpdate) {
        self.update_settings(|s| s.apply_performance(update));
    }

    #[must_use]
    pub fn performance_settings(&self) -> PerformanceSettings {
        self.settings().performance
    }

    #[must_use]
    pub fn performance_stats(&self) -> PerformanceStats {
        let PerformanceSample { fps, avg_frame_time } = self.engine.performance();
        PerformanceStats { fps, avg_frame_time, target_fps: self.settings().performance.target_fps }
    }

    pub fn set_low_power_mode(&mut self, enabled: bool) {
        self.apply_preset(Preset::LowPower(enabled));
    }

    pub fn set_high_performance_mode(&mut self, enabled: bool) {
        self.apply_preset(Preset::HighPerformance(enabled));
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.update_settings(|s| preset.apply(s));
    }

    // --- Adaptive quality ---

    /// Enable the controller and return the timer the host must fire every
    /// [`crate::quality::QUALITY_EVAL_PERIOD_MS`]. Must not be called while
    /// `core` is borrowed.
    pub fn enable_adaptive_quality(core: &Rc<RefCell<Self>>) -> QualityTimer<Self> {
        let handle = {
            let mut host = core.borrow_mut();
            host.update_settings(|s| s.performance.adaptive_fps = true);
            host.quality.enable()
        };
        QualityTimer::new(core, handle)
    }

    pub fn disable_adaptive_quality(&mut self, handle: Option<&AdaptiveHandle>) {
        self.quality.disable(handle);
        self.update_settings(|s| s.performance.adaptive_fps = false);
    }

    #[must_use]
    pub fn quality_state(&self) -> ControllerState {
        self.quality.state()
    }

    // --- Benchmark ---

    /// Start sampling fps once per tick for `duration_secs`. Benchmarks
    /// already running keep their own window and callback.
    pub fn benchmark(&mut self, duration_secs: f64, now_ms: f64, on_done: Option<ReportCallback>) {
        self.start_benchmark(duration_secs, now_ms, Completion::Report(on_done));
    }

    /// Benchmark for a short window, then apply the preset matching the
    /// recommendation.
    pub fn auto_optimize(&mut self, now_ms: f64, on_done: Option<RecommendationCallback>) {
        self.start_benchmark(AUTO_OPTIMIZE_SECS, now_ms, Completion::AutoOptimize(on_done));
    }

    #[must_use]
    pub fn benchmark_running(&self) -> bool {
        !self.benchmarks.is_empty()
    }

    #[must_use]
    pub fn benchmarks_running(&self) -> usize {
        self.benchmarks.len()
    }

    fn start_benchmark(&mut self, duration_secs: f64, now_ms: f64, completion: Completion) {
        self.benchmarks.push(PendingBenchmark { sampler: Benchmark::new(duration_secs, now_ms), completion });
    }

    fn sample_benchmarks(&mut self, now_ms: f64) {
        if self.benchmarks.is_empty() {
            return;
        }
        let fps = self.engine.performance().fps;
        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.benchmarks.len() {
            match self.benchmarks[index].sampler.sample(now_ms, fps) {
                BenchmarkStep::Running => index += 1,
                BenchmarkStep::Done(report) => finished.push((self.benchmarks.remove(index).completion, report)),
            }
        }
        for (completion, report) in finished {
            self.complete_benchmark(completion, report);
        }
    }

    fn complete_benchmark(&mut self, completion: Completion, report: BenchmarkReport) {
        match completion {
            Completion::Report(callback) => {
                if let Some(callback) = callback {
                    callback(report);
                }
            }
            Completion::AutoOptimize(callback) => {
                let recommendation = report.recommendation;
                self.apply_preset(recommendation.preset());
                info!(recommendation = recommendation.as_str(), "auto-optimized settings");
                if let Some(callback) = callback {
                    callback(recommendation);
                }
            }
        }
    }

    // --- Debug ---

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
        info!(enabled, "debug mode");
    }

    #[must_use]
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Dump frame statistics and quality settings to the log.
    pub fn log_performance(&self) {
        let stats = self.performance_stats();
        let settings = self.settings();
        info!(
            fps = stats.fps,
            avg_frame_time = stats.avg_frame_time,
            target_fps = stats.target_fps,
            adaptive_fps = settings.performance.adaptive_fps,
            quality_level = settings.render_quality.level,
            label_density = settings.render_quality.label_density,
            frames = self.frames.frames(),
            "performance"
        );
    }
}

impl<E: EngineBoundary> QualityTarget for HostCore<E> {
    fn evaluate_quality(&mut self) -> Adjustment {
        let sample = self.engine.performance();
        let mut settings = self.engine.settings();
        let adjustment = self.quality.evaluate(&mut settings, sample);
        if adjustment != Adjustment::Unchanged {
            self.engine.store_settings(&settings);
        }
        adjustment
    }
}

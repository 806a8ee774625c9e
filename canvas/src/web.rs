//! Browser glue: DOM listeners, the refresh loop, the quality timer, and the
//! `SkyCanvas` object exported to JavaScript.
//!
//! Everything here is thin. Events are decoded into plain values and handed
//! to [`HostCore`]; all state lives there.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Interval;
use js_sys::{Date, Function, Reflect, JSON};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, UiEvent,
};

use crate::benchmark::{BenchmarkReport, Recommendation};
use crate::boundary::{BoundaryError, EngineBoundary, PerformanceSample, PointerEvent, ZoomEvent};
use crate::consts::BENCHMARK_DEFAULT_SECS;
use crate::frame::{BackingSize, Surface};
use crate::geom::{Point, Rect};
use crate::host::{HostCore, RecommendationCallback, ReportCallback};
use crate::pointer::{TouchPoint, TrackerOptions};
use crate::quality::{AdaptiveHandle, QUALITY_EVAL_PERIOD_MS, TimerStatus};
use crate::settings::{
    EngineSettings, InertiaUpdate, MobileSettings, PerformanceUpdate, QualityUpdate, SensitivityUpdate,
};

#[cfg(test)]
#[path = "web_test.rs"]
mod web_test;

type SharedCore = Rc<RefCell<HostCore<JsEngine>>>;

// =============================================================================
// SURFACE
// =============================================================================

/// The `<canvas>` element as a [`Surface`].
#[derive(Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl Surface for CanvasSurface {
    fn bounding_rect(&self) -> Rect {
        let r = self.canvas.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.width(), r.height())
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn set_backing_size(&mut self, size: BackingSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The compiled engine module, reached through its exported `_core_*`
/// functions and the field accessors on `Module.core`.
pub struct JsEngine {
    module: JsValue,
}

impl JsEngine {
    #[must_use]
    pub fn new(module: JsValue) -> Self {
        Self { module }
    }

    fn call(&self, name: &'static str, args: &[JsValue]) -> Result<JsValue, BoundaryError> {
        let func = Reflect::get(&self.module, &JsValue::from_str(name)).map_err(|e| js_error(name, &e))?;
        let func: Function = func.dyn_into().map_err(|v| js_error(name, &v))?;
        let args: js_sys::Array = args.iter().collect();
        func.apply(&self.module, &args).map_err(|e| js_error(name, &e))
    }

    fn core_object(&self) -> Option<JsValue> {
        read(&self.module, "core").filter(JsValue::is_object)
    }
}

fn js_error(call: &'static str, value: &JsValue) -> BoundaryError {
    let message = value.as_string().unwrap_or_else(|| format!("{value:?}"));
    BoundaryError::Js { call, message }
}

fn read(obj: &JsValue, key: &str) -> Option<JsValue> {
    match Reflect::get(obj, &JsValue::from_str(key)) {
        Ok(value) if !value.is_undefined() && !value.is_null() => Some(value),
        _ => None,
    }
}

fn read_f64(obj: &JsValue, key: &str) -> Option<f64> {
    read(obj, key).and_then(|v| v.as_f64())
}

/// Engine booleans may surface as `0`/`1`.
fn read_bool(obj: &JsValue, key: &str) -> Option<bool> {
    read(obj, key).and_then(|v| v.as_bool().or_else(|| v.as_f64().map(|n| n != 0.0)))
}

fn write(obj: &JsValue, key: &str, value: &JsValue) {
    if let Err(e) = Reflect::set(obj, &JsValue::from_str(key), value) {
        warn!(key, error = ?e, "engine field write failed");
    }
}

impl EngineBoundary for JsEngine {
    #[allow(clippy::cast_precision_loss)]
    fn pointer_event(&mut self, event: PointerEvent) -> Result<(), BoundaryError> {
        let args = [
            JsValue::from_f64(event.id as f64),
            JsValue::from_f64(f64::from(event.phase.code())),
            JsValue::from_f64(event.pos.x),
            JsValue::from_f64(event.pos.y),
            JsValue::from_f64(f64::from(event.buttons)),
        ];
        self.call("_core_on_mouse", &args)?;
        Ok(())
    }

    fn zoom(&mut self, zoom: ZoomEvent) -> Result<(), BoundaryError> {
        let args = [
            JsValue::from_f64(zoom.factor),
            JsValue::from_f64(zoom.center.x),
            JsValue::from_f64(zoom.center.y),
        ];
        self.call("_core_on_zoom", &args)?;
        Ok(())
    }

    fn update(&mut self) -> Result<(), BoundaryError> {
        self.call("_core_update", &[])?;
        Ok(())
    }

    fn render(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Result<(), BoundaryError> {
        let args = [JsValue::from_f64(width), JsValue::from_f64(height), JsValue::from_f64(device_pixel_ratio)];
        self.call("_core_render", &args)?;
        Ok(())
    }

    fn settings(&self) -> EngineSettings {
        let mut settings = EngineSettings::default();
        let Some(core) = self.core_object() else {
            return settings;
        };
        settings.apply_pinch_inertia(InertiaUpdate {
            enabled: read_bool(&core, "pinch_inertia_enabled"),
            friction: read_f64(&core, "pinch_inertia_friction"),
        });
        settings.apply_pan_inertia(InertiaUpdate {
            enabled: read_bool(&core, "pan_inertia_enabled"),
            friction: read_f64(&core, "pan_inertia_friction"),
        });
        settings.apply_touch_sensitivity(SensitivityUpdate {
            pan: read_f64(&core, "touch_pan_sensitivity"),
            zoom: read_f64(&core, "touch_zoom_sensitivity"),
        });
        settings.apply_render_quality(QualityUpdate {
            level: read_f64(&core, "render_quality_level"),
            label_density: read_f64(&core, "render_label_density"),
        });
        settings.apply_performance(&PerformanceUpdate {
            adaptive_fps: read_bool(&core, "adaptive_fps"),
            target_fps: read_f64(&core, "target_fps"),
            min_fps: read_f64(&core, "min_fps"),
            skip_frames: read_bool(&core, "skip_frames"),
            max_stars_per_frame: read_f64(&core, "max_stars_per_frame"),
            max_labels_per_frame: read_f64(&core, "max_labels_per_frame"),
            defer_text_render: read_bool(&core, "defer_text_render"),
        });
        settings
    }

    fn store_settings(&mut self, settings: &EngineSettings) {
        let Some(core) = self.core_object() else {
            warn!("engine core object missing; settings not stored");
            return;
        };
        let num = |key: &str, value: f64| write(&core, key, &JsValue::from_f64(value));
        let flag = |key: &str, value: bool| write(&core, key, &JsValue::from_bool(value));
        flag("pinch_inertia_enabled", settings.pinch_inertia.enabled);
        num("pinch_inertia_friction", settings.pinch_inertia.friction);
        flag("pan_inertia_enabled", settings.pan_inertia.enabled);
        num("pan_inertia_friction", settings.pan_inertia.friction);
        num("touch_pan_sensitivity", settings.touch_sensitivity.pan);
        num("touch_zoom_sensitivity", settings.touch_sensitivity.zoom);
        num("render_quality_level", f64::from(settings.render_quality.level));
        num("render_label_density", settings.render_quality.label_density);
        let perf = &settings.performance;
        flag("adaptive_fps", perf.adaptive_fps);
        num("target_fps", f64::from(perf.target_fps));
        num("min_fps", f64::from(perf.min_fps));
        flag("skip_frames", perf.skip_frames);
        num("max_stars_per_frame", f64::from(perf.max_stars_per_frame));
        num("max_labels_per_frame", f64::from(perf.max_labels_per_frame));
        flag("defer_text_render", perf.defer_text_render);
    }

    fn performance(&self) -> PerformanceSample {
        let Some(core) = self.core_object() else {
            return PerformanceSample::default();
        };
        PerformanceSample {
            fps: read_f64(&core, "fps").unwrap_or(0.0),
            avg_frame_time: read_f64(&core, "avg_frame_time").unwrap_or(0.0),
        }
    }
}

// =============================================================================
// LISTENERS
// =============================================================================

/// A registered DOM listener; unregisters itself on drop.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// Registered non-passive so handlers may cancel scrolling and the
    /// browser's own pinch zoom.
    fn add(target: &EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self { target: target.clone(), kind, closure })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self.target.remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
        {
            debug!(kind = self.kind, error = ?e, "listener removal failed");
        }
    }
}

fn client_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(i64::from(t.identifier()), f64::from(t.client_x()), f64::from(t.client_y())))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TouchKind {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchKind {
    /// Only moves suppress the browser default (scroll, native pinch); taps
    /// still produce compatibility mouse events.
    fn cancels_default(self) -> bool {
        self == Self::Move
    }
}

fn attach_listeners(core: &SharedCore, surface: &CanvasSurface) -> Result<Vec<Listener>, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: &EventTarget = surface.canvas.as_ref();
    let document: &EventTarget = document.as_ref();
    let mut listeners = Vec::new();

    let (c, s) = (Rc::clone(core), surface.clone());
    listeners.push(Listener::add(canvas, "mousedown", move |event| {
        if let Some(e) = event.dyn_ref::<MouseEvent>() {
            c.borrow_mut().on_mouse_down(client_point(e), u32::from(e.buttons()), s.bounding_rect());
        }
    })?);

    let (c, s) = (Rc::clone(core), surface.clone());
    listeners.push(Listener::add(document, "mousemove", move |event| {
        if let Some(e) = event.dyn_ref::<MouseEvent>() {
            c.borrow_mut().on_mouse_move(client_point(e), s.bounding_rect());
        }
    })?);

    let (c, s) = (Rc::clone(core), surface.clone());
    listeners.push(Listener::add(document, "mouseup", move |event| {
        if let Some(e) = event.dyn_ref::<MouseEvent>() {
            c.borrow_mut().on_mouse_up(client_point(e), s.bounding_rect());
        }
    })?);

    let c = Rc::clone(core);
    listeners.push(Listener::add(document, "mouseleave", move |_| c.borrow_mut().on_mouse_leave())?);

    for (kind, which) in [
        ("touchstart", TouchKind::Start),
        ("touchmove", TouchKind::Move),
        ("touchend", TouchKind::End),
        ("touchcancel", TouchKind::Cancel),
    ] {
        let (c, s) = (Rc::clone(core), surface.clone());
        listeners.push(Listener::add(canvas, kind, move |event| {
            let Some(e) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            if which.cancels_default() {
                event.prevent_default();
            }
            let changed = touch_points(&e.changed_touches());
            let rect = s.bounding_rect();
            let mut host = c.borrow_mut();
            match which {
                TouchKind::Start => host.on_touch_start(&changed, rect),
                TouchKind::Move => host.on_touch_move(&changed, rect),
                TouchKind::End => host.on_touch_end(&changed, rect),
                TouchKind::Cancel => host.on_touch_cancel(&changed, rect),
            }
        })?);
    }

    for kind in ["mousewheel", "DOMMouseScroll"] {
        let (c, s) = (Rc::clone(core), surface.clone());
        listeners.push(Listener::add(canvas, kind, move |event| {
            let Some(e) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let raw: &JsValue = event.as_ref();
            let wheel_delta = read_f64(raw, "wheelDelta").unwrap_or(0.0);
            let detail = event.dyn_ref::<UiEvent>().map_or(0.0, |u| f64::from(u.detail()));
            let handled = c
                .borrow_mut()
                .on_wheel(&event.type_(), wheel_delta, detail, client_point(e), s.bounding_rect())
                .is_ok();
            if handled {
                event.prevent_default();
            }
        })?);
    }

    listeners.push(Listener::add(canvas, "contextmenu", |event| event.prevent_default())?);

    Ok(listeners)
}

// =============================================================================
// REFRESH LOOP
// =============================================================================

/// JavaScript callbacks queued while the host is borrowed; run after each
/// tick so they may call back into `SkyCanvas`.
#[derive(Clone, Default)]
struct Deferred(Rc<RefCell<Vec<Box<dyn FnOnce()>>>>);

impl Deferred {
    fn push(&self, job: impl FnOnce() + 'static) {
        self.0.borrow_mut().push(Box::new(job));
    }

    fn run(&self) {
        let jobs = std::mem::take(&mut *self.0.borrow_mut());
        for job in jobs {
            job();
        }
    }
}

fn start_refresh_loop(
    core: SharedCore,
    mut surface: CanvasSurface,
    deferred: Deferred,
    running: Rc<Cell<bool>>,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let holder_for_cb = Rc::clone(&holder);
    let cb = Closure::wrap(Box::new(move |_ts: f64| {
        if !running.get() {
            holder_for_cb.borrow_mut().take();
            return;
        }
        let result = core.borrow_mut().tick(&mut surface, Date::now());
        deferred.run();
        if let Err(e) = result {
            error!(error = %e, "engine failed; refresh loop stopped");
            running.set(false);
            holder_for_cb.borrow_mut().take();
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(cb) = holder_for_cb.borrow().as_ref() {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                error!(error = ?e, "requestAnimationFrame failed");
            }
        }
    }) as Box<dyn FnMut(f64)>);

    window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    *holder.borrow_mut() = Some(cb);
    Ok(())
}

// =============================================================================
// JS FACADE
// =============================================================================

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    let text: String = JSON::stringify(value)?.into();
    serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    JSON::parse(&text)
}

fn invoke(callback: &Function, value: &impl Serialize) {
    let result = to_js(value).and_then(|arg| callback.call1(&JsValue::NULL, &arg));
    if let Err(e) = result {
        warn!(error = ?e, "callback failed");
    }
}

/// Input and frame host for one canvas, exported to JavaScript.
///
/// Construction registers every listener and starts the refresh loop;
/// `free()` unregisters them and stops the loop.
#[wasm_bindgen]
pub struct SkyCanvas {
    core: SharedCore,
    listeners: Vec<Listener>,
    quality_timer: Option<Interval>,
    quality_handle: Option<AdaptiveHandle>,
    deferred: Deferred,
    running: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl SkyCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, module: JsValue, release_on_leave: Option<bool>) -> Result<SkyCanvas, JsValue> {
        let options = TrackerOptions { release_on_leave: release_on_leave.unwrap_or(false) };
        let core = Rc::new(RefCell::new(HostCore::new(JsEngine::new(module), options)));
        let surface = CanvasSurface::new(canvas);
        let listeners = attach_listeners(&core, &surface)?;
        let deferred = Deferred::default();
        let running = Rc::new(Cell::new(true));
        start_refresh_loop(Rc::clone(&core), surface, deferred.clone(), Rc::clone(&running))?;
        info!(listeners = listeners.len(), "canvas attached");
        Ok(Self { core, listeners, quality_timer: None, quality_handle: None, deferred, running })
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.running.get()
    }

    // --- Settings ---

    #[wasm_bindgen(js_name = getSettings)]
    pub fn get_settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().settings())
    }

    #[wasm_bindgen(js_name = setPinchInertia)]
    pub fn set_pinch_inertia(&self, enabled: Option<bool>, friction: Option<f64>) {
        self.core.borrow_mut().set_pinch_inertia(InertiaUpdate { enabled, friction });
    }

    #[wasm_bindgen(js_name = getPinchInertia)]
    pub fn get_pinch_inertia(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().pinch_inertia())
    }

    #[wasm_bindgen(js_name = setPanInertia)]
    pub fn set_pan_inertia(&self, enabled: Option<bool>, friction: Option<f64>) {
        self.core.borrow_mut().set_pan_inertia(InertiaUpdate { enabled, friction });
    }

    #[wasm_bindgen(js_name = getPanInertia)]
    pub fn get_pan_inertia(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().pan_inertia())
    }

    #[wasm_bindgen(js_name = setTouchSensitivity)]
    pub fn set_touch_sensitivity(&self, pan: Option<f64>, zoom: Option<f64>) {
        self.core.borrow_mut().set_touch_sensitivity(SensitivityUpdate { pan, zoom });
    }

    #[wasm_bindgen(js_name = getTouchSensitivity)]
    pub fn get_touch_sensitivity(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().touch_sensitivity())
    }

    #[wasm_bindgen(js_name = setRenderQuality)]
    pub fn set_render_quality(&self, level: Option<f64>, label_density: Option<f64>) {
        self.core.borrow_mut().set_render_quality(QualityUpdate { level, label_density });
    }

    #[wasm_bindgen(js_name = getRenderQuality)]
    pub fn get_render_quality(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().render_quality())
    }

    #[wasm_bindgen(js_name = setMobileSettings)]
    pub fn set_mobile_settings(&self, settings: &JsValue) -> Result<(), JsValue> {
        let update: MobileSettings = from_js(settings)?;
        self.core.borrow_mut().set_mobile_settings(&update);
        Ok(())
    }

    #[wasm_bindgen(js_name = getMobileSettings)]
    pub fn get_mobile_settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().mobile_settings())
    }

    #[wasm_bindgen(js_name = enableMobileOptimizations)]
    pub fn enable_mobile_optimizations(&self, aggressive: Option<bool>) {
        self.core.borrow_mut().enable_mobile_optimizations(aggressive.unwrap_or(false));
    }

    #[wasm_bindgen(js_name = disableMobileOptimizations)]
    pub fn disable_mobile_optimizations(&self) {
        self.core.borrow_mut().disable_mobile_optimizations();
    }

    #[wasm_bindgen(js_name = setPerformanceSettings)]
    pub fn set_performance_settings(&self, settings: &JsValue) -> Result<(), JsValue> {
        let update: PerformanceUpdate = from_js(settings)?;
        self.core.borrow_mut().set_performance_settings(&update);
        Ok(())
    }

    #[wasm_bindgen(js_name = getPerformanceSettings)]
    pub fn get_performance_settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().performance_settings())
    }

    #[wasm_bindgen(js_name = getPerformanceStats)]
    pub fn get_performance_stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.core.borrow().performance_stats())
    }

    #[wasm_bindgen(js_name = setLowPowerMode)]
    pub fn set_low_power_mode(&self, enabled: bool) {
        self.core.borrow_mut().set_low_power_mode(enabled);
    }

    #[wasm_bindgen(js_name = setHighPerformanceMode)]
    pub fn set_high_performance_mode(&self, enabled: bool) {
        self.core.borrow_mut().set_high_performance_mode(enabled);
    }

    // --- Adaptive quality ---

    #[wasm_bindgen(js_name = enableAdaptiveQuality)]
    pub fn enable_adaptive_quality(&mut self) {
        let timer = HostCore::enable_adaptive_quality(&self.core);
        self.quality_handle = Some(timer.handle().clone());
        self.quality_timer = Some(Interval::new(QUALITY_EVAL_PERIOD_MS, move || {
            if timer.fire() == TimerStatus::Cancelled {
                debug!("quality timer fired after cancellation");
            }
        }));
    }

    #[wasm_bindgen(js_name = disableAdaptiveQuality)]
    pub fn disable_adaptive_quality(&mut self) {
        self.core.borrow_mut().disable_adaptive_quality(self.quality_handle.take().as_ref());
        self.quality_timer = None;
    }

    // --- Benchmark ---

    /// Measure fps for `duration` seconds (default 5), then pass the report
    /// to `callback`.
    pub fn benchmark(&self, duration: Option<f64>, callback: Option<Function>) {
        let deferred = self.deferred.clone();
        let on_done = callback.map(|f| -> ReportCallback {
            Box::new(move |report: BenchmarkReport| deferred.push(move || invoke(&f, &report)))
        });
        self.core
            .borrow_mut()
            .benchmark(duration.unwrap_or(BENCHMARK_DEFAULT_SECS), Date::now(), on_done);
    }

    #[wasm_bindgen(js_name = autoOptimize)]
    pub fn auto_optimize(&self, callback: Option<Function>) {
        let deferred = self.deferred.clone();
        let on_done = callback.map(|f| -> RecommendationCallback {
            Box::new(move |rec: Recommendation| deferred.push(move || invoke(&f, &rec)))
        });
        self.core.borrow_mut().auto_optimize(Date::now(), on_done);
    }

    // --- Debug ---

    #[wasm_bindgen(js_name = setDebugMode)]
    pub fn set_debug_mode(&self, enabled: bool) {
        self.core.borrow_mut().set_debug_mode(enabled);
    }

    #[wasm_bindgen(js_name = getDebugMode)]
    pub fn get_debug_mode(&self) -> bool {
        self.core.borrow().debug_mode()
    }

    #[wasm_bindgen(js_name = logPerformance)]
    pub fn log_performance(&self) {
        self.core.borrow().log_performance();
    }
}

impl Drop for SkyCanvas {
    fn drop(&mut self) {
        self.running.set(false);
        if let Some(handle) = self.quality_handle.take() {
            handle.cancel();
        }
        debug!(listeners = self.listeners.len(), "canvas detached");
    }
}

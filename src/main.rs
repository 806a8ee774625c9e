//! Native host for the sky canvas core.
//!
//! DESIGN
//! ======
//! Runs the same `HostCore` the browser uses against a simulated engine on a
//! single-threaded runtime. Three local tasks share one `Rc<RefCell<_>>`:
//! the refresh loop, the adaptive quality timer and an optional input script.
//! They cooperate on one thread, so no borrow is ever held across an await.

mod config;
mod script;
mod sim;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::{JoinHandle, LocalSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use skycanvas::benchmark::{BenchmarkReport, Recommendation};
use skycanvas::boundary::BoundaryError;
use skycanvas::frame::Surface;
use skycanvas::geom::Rect;
use skycanvas::host::HostCore;
use skycanvas::pointer::TrackerOptions;
use skycanvas::quality::{QUALITY_EVAL_PERIOD_MS, QualityTimer, TimerStatus};
use skycanvas::settings::PerformanceUpdate;

use crate::config::HostConfig;
use crate::sim::{SimEngine, SimOptions, SimSurface};

type SharedCore = Rc<RefCell<HostCore<SimEngine>>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match HostConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    LocalSet::new().run_until(run(config)).await;
}

async fn run(config: HostConfig) {
    let engine = SimEngine::new(SimOptions {
        base_frame_ms: config.base_frame_ms,
        jitter: config.jitter,
        fail_after_frames: config.fail_after_frames,
        seed: config.seed,
    });
    let options = TrackerOptions { release_on_leave: config.release_on_leave };
    let core: SharedCore = Rc::new(RefCell::new(HostCore::new(engine, options)));
    core.borrow_mut().set_performance_settings(&PerformanceUpdate {
        target_fps: Some(f64::from(config.target_fps)),
        ..PerformanceUpdate::default()
    });

    let surface = SimSurface::new(config.width, config.height, config.device_pixel_ratio);
    let rect = surface.bounding_rect();
    let started = Instant::now();

    info!(
        tick_hz = config.tick_hz,
        target_fps = config.target_fps,
        base_frame_ms = config.base_frame_ms,
        adaptive = config.adaptive,
        "skyhost starting"
    );

    let mut frames = tokio::task::spawn_local(refresh_loop(Rc::clone(&core), surface, config.tick_hz, started));

    let quality = config.adaptive.then(|| {
        let timer = HostCore::enable_adaptive_quality(&core);
        tokio::task::spawn_local(quality_loop(timer))
    });

    if let Some(secs) = config.benchmark_secs {
        core.borrow_mut().benchmark(
            secs,
            elapsed_ms(started),
            Some(Box::new(|report: BenchmarkReport| {
                info!(
                    duration = report.duration,
                    total_frames = report.total_frames,
                    avg_fps = report.avg_fps,
                    min_fps = report.min_fps,
                    max_fps = report.max_fps,
                    recommendation = report.recommendation.as_str(),
                    "benchmark report"
                );
            })),
        );
    } else if config.auto_optimize {
        core.borrow_mut().auto_optimize(
            elapsed_ms(started),
            Some(Box::new(|rec: Recommendation| info!(recommendation = rec.as_str(), "auto-optimize finished"))),
        );
    }

    let replay = config
        .script
        .clone()
        .map(|path| tokio::task::spawn_local(replay_script(Rc::clone(&core), path, rect, started)));

    tokio::select! {
        () = tokio::time::sleep(Duration::from_secs_f64(config.duration_secs)) => {
            info!(duration_secs = config.duration_secs, "run finished");
        }
        result = &mut frames => {
            match result {
                Ok(Err(e)) => error!(error = %e, "engine failed; refresh loop stopped"),
                Ok(Ok(())) => {}
                Err(e) => error!(error = %e, "refresh task aborted"),
            }
        }
    }

    frames.abort();
    abort(replay);
    {
        let mut host = core.borrow_mut();
        host.disable_adaptive_quality(None);
        host.log_performance();
        info!(
            updates = host.engine.updates(),
            magnification = host.engine.magnification(),
            active_pointers = host.engine.active_pointers(),
            viewport = ?host.engine.last_viewport(),
            "engine state"
        );
    }
    abort(quality);
}

fn abort(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
    }
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_millis() as f64
}

/// One tick per simulated display refresh until the engine fails.
async fn refresh_loop(
    core: SharedCore,
    mut surface: SimSurface,
    tick_hz: u32,
    started: Instant,
) -> Result<(), BoundaryError> {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1))));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        core.borrow_mut().tick(&mut surface, elapsed_ms(started))?;
    }
}

/// Fires the quality timer on its fixed period. The first evaluation happens
/// one full period after enabling.
async fn quality_loop(timer: QualityTimer<HostCore<SimEngine>>) {
    let period = Duration::from_millis(u64::from(QUALITY_EVAL_PERIOD_MS));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    loop {
        interval.tick().await;
        if timer.fire() == TimerStatus::Cancelled {
            debug!("quality timer cancelled");
            break;
        }
    }
}

async fn replay_script(core: SharedCore, path: PathBuf, rect: Rect, started: Instant) {
    let steps = match script::load(&path).await {
        Ok(steps) => steps,
        Err(e) => {
            warn!(error = %e, "input script not loaded");
            return;
        }
    };
    info!(path = %path.display(), steps = steps.len(), "replaying input script");
    for step in steps {
        tokio::time::sleep_until(started + Duration::from_millis(step.at_ms)).await;
        if let Err(e) = step.event.apply(&mut *core.borrow_mut(), rect) {
            debug!(at_ms = step.at_ms, error = %e, "script step rejected");
        }
    }
    info!("input script finished");
}

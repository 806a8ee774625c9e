//! Input and frame glue between a browser canvas and the sky engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! engine module. It turns raw DOM mouse, touch and wheel events into the
//! engine's pointer and zoom primitives, drives the per-refresh
//! `update`/`render` cycle, keeps the canvas backing store at device
//! resolution, and tunes rendering quality from measured frame times. The
//! engine itself (sky computation, projection, drawing) lives on the other
//! side of [`boundary::EngineBoundary`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`host`] | Context object owning all mutable state; testable [`host::HostCore`] |
//! | [`web`] | DOM listeners, refresh loop and the `#[wasm_bindgen]` facade |
//! | [`boundary`] | The engine interface and the events crossing it |
//! | [`pointer`] | Mouse and touch identity tracking |
//! | [`gesture`] | Pinch and wheel zoom recognition |
//! | [`frame`] | Backing-store sync and the update/render tick |
//! | [`quality`] | Adaptive quality controller and its periodic timer |
//! | [`benchmark`] | Fixed-window fps benchmark and preset recommendation |
//! | [`settings`] | Engine configuration fields, clamping and presets |
//! | [`geom`] | Points and rectangles in canvas pixel space |
//! | [`consts`] | Shared numeric constants (thresholds, ratios, bounds) |

pub mod benchmark;
pub mod boundary;
pub mod consts;
pub mod frame;
pub mod geom;
pub mod gesture;
pub mod host;
pub mod pointer;
pub mod quality;
pub mod settings;
pub mod web;

#[cfg(test)]
#[path = "support_test.rs"]
mod support_test;

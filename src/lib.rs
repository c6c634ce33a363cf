//! GPU profile and preset engine for the Hyprland Wayland compositor.
//!
//! The pipeline: probe the hardware, classify each GPU, compute a pure
//! action plan for the requested profile, execute external switcher steps
//! best-effort, and rewrite a bracketed region of the compositor config
//! idempotently. Presets layer named settings patches over a profile.

pub mod benchmark;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod monitor;
pub mod observer;
pub mod output;
pub mod paths;
pub mod preset;
pub mod probe;
pub mod profile;
pub mod region;
pub mod settings;
pub mod sysfs;

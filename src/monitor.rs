//! Live GPU state monitor: polls the switcher mode, renderer, and managed
//! regions every two seconds.

use crate::error::Result;
use crate::integrator::CommandRunner;
use crate::paths::Paths;
use crate::probe;
use crate::region::{self, RegionName};
use colored::Colorize;
use std::time::{Duration, Instant};

const REFRESH: Duration = Duration::from_secs(2);

pub fn run(paths: &Paths, runner: &dyn CommandRunner) -> Result<()> {
    println!("{}", "GPU Monitor".bold().underline());
    println!("Press Ctrl+C to stop");
    println!();
    println!(
        "{:>8} {:>12} {:>14} {:>14}  {}",
        "Time".dimmed(),
        "Mode".cyan(),
        "Profile".cyan(),
        "Preset".cyan(),
        "Renderer".cyan(),
    );
    println!("{}", "-".repeat(72).dimmed());

    let start = Instant::now();
    loop {
        let mode = probe::detect_current_mode(runner);
        let renderer = probe::detect_active_renderer(runner);
        let (profile, preset) = match std::fs::read_to_string(paths.compositor_config()) {
            Ok(content) => (
                region::region_label(&content, RegionName::Switcher, paths.compositor_config())
                    .unwrap_or(None),
                region::region_label(&content, RegionName::Preset, paths.compositor_config())
                    .unwrap_or(None),
            ),
            Err(_) => (None, None),
        };

        let elapsed = start.elapsed().as_secs();
        println!(
            "{:>8} {:>12} {:>14} {:>14}  {}",
            format!("{:02}:{:02}", elapsed / 60, elapsed % 60),
            mode,
            profile.as_deref().unwrap_or("-"),
            preset.as_deref().unwrap_or("-"),
            renderer,
        );

        std::thread::sleep(REFRESH);
    }
}

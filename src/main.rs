use clap::Parser;
use colored::Colorize;
use hyprgpu::cli::{self, SwitcherCli, SwitcherCommand};
use hyprgpu::engine::Engine;
use hyprgpu::error::Result;
use hyprgpu::integrator::SystemRunner;
use hyprgpu::output;
use hyprgpu::paths::Paths;
use hyprgpu::profile::Profile;
use hyprgpu::sysfs::SysfsRoot;

fn main() {
    // usage errors exit 1; 2 is reserved for corrupted state
    let cli = match SwitcherCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    if let Err(e) = run(cli) {
        eprintln!("aborted: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: SwitcherCli) -> Result<()> {
    let runner = SystemRunner;
    match cli.command {
        SwitcherCommand::Detect => cmd_detect(&runner, cli.json),
        SwitcherCommand::List => cmd_list(&runner),
        SwitcherCommand::Status => cmd_status(&runner, cli.json),
        SwitcherCommand::Optimize { force } => cmd_optimize(&runner, force),
        SwitcherCommand::Monitor => {
            let paths = Paths::system()?;
            hyprgpu::monitor::run(&paths, &runner)
        }
        SwitcherCommand::Benchmark => cmd_benchmark(&runner, cli.json),
        SwitcherCommand::Reset => cmd_reset(&runner),
        SwitcherCommand::Switch { profile, force } => {
            let profile: Profile = profile.parse()?;
            cmd_switch(&runner, profile, force)
        }
        SwitcherCommand::Completions { shell } => {
            cli::print_completions::<SwitcherCli>(shell, "gpu-switcher");
            Ok(())
        }
    }
}

fn open_engine(runner: &SystemRunner) -> Result<Engine<'_>> {
    let paths = Paths::system()?;
    let log_file = paths.switcher_log();
    Engine::open(paths, SysfsRoot::system(), runner, log_file)
}

fn cmd_detect(runner: &SystemRunner, json: bool) -> Result<()> {
    let engine = open_engine(runner)?;
    let snapshot = engine.detect()?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot)
                .map_err(|e| hyprgpu::error::Error::State(e.to_string()))?
        );
        return Ok(());
    }
    output::print_hardware(&snapshot);
    println!(
        "  snapshot saved to {}",
        engine.paths().snapshot_file().display().to_string().dimmed()
    );
    Ok(())
}

fn cmd_list(runner: &SystemRunner) -> Result<()> {
    let engine = open_engine(runner)?;
    output::print_profiles(engine.active_profile().as_deref());
    Ok(())
}

fn cmd_status(runner: &SystemRunner, json: bool) -> Result<()> {
    let engine = open_engine(runner)?;
    let view = engine.status()?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view)
                .map_err(|e| hyprgpu::error::Error::State(e.to_string()))?
        );
        return Ok(());
    }
    output::print_status(&view);
    Ok(())
}

fn cmd_optimize(runner: &SystemRunner, force: bool) -> Result<()> {
    let mut engine = open_engine(runner)?;
    let (profile, outcome) = engine.optimize(force)?;
    println!(
        "  {} {}",
        "Recommended profile:".bold(),
        profile.id().green()
    );
    output::print_report(&outcome.report);
    output::print_switched(profile, outcome.region_written, &outcome.warnings);
    Ok(())
}

fn cmd_benchmark(runner: &SystemRunner, json: bool) -> Result<()> {
    let paths = Paths::system()?;
    paths.ensure()?;
    let (report, path) = hyprgpu::benchmark::run(&paths, &SysfsRoot::system(), runner)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| hyprgpu::error::Error::State(e.to_string()))?
        );
        return Ok(());
    }
    println!(
        "  probe {} ms, classify {} ms over {} GPU(s)",
        report.probe_ms,
        report.classify_ms,
        report.gpus.len()
    );
    println!("  report saved to {}", path.display().to_string().dimmed());
    Ok(())
}

fn cmd_reset(runner: &SystemRunner) -> Result<()> {
    let mut engine = open_engine(runner)?;
    let report = engine.reset()?;
    output::print_report(&report);
    println!(
        "{} managed regions removed, switchers restored to neutral",
        "✓".green().bold()
    );
    Ok(())
}

fn cmd_switch(runner: &SystemRunner, profile: Profile, force: bool) -> Result<()> {
    let mut engine = open_engine(runner)?;
    let outcome = engine.switch_profile(profile, force)?;
    output::print_report(&outcome.report);
    output::print_switched(profile, outcome.region_written, &outcome.warnings);
    Ok(())
}

use clap::Parser;
use colored::Colorize;
use hyprgpu::cli::{self, PresetsCli, PresetsCommand};
use hyprgpu::engine::Engine;
use hyprgpu::error::{Error, Result};
use hyprgpu::integrator::SystemRunner;
use hyprgpu::output;
use hyprgpu::paths::Paths;
use hyprgpu::preset::{Category, Preset, Priority};
use hyprgpu::profile::Profile;
use hyprgpu::settings::SettingsPatch;
use hyprgpu::sysfs::SysfsRoot;

fn main() {
    // usage errors exit 1; 2 is reserved for corrupted state
    let cli = match PresetsCli::try_parse() {
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

fn run(cli: PresetsCli) -> Result<()> {
    let runner = SystemRunner;
    match cli.command {
        PresetsCommand::List => cmd_list(&runner, cli.json),
        PresetsCommand::Active => cmd_active(&runner),
        PresetsCommand::Create {
            name,
            profile,
            category,
            description,
            overwrite,
        } => cmd_create(&runner, name, profile, category, description, overwrite),
        PresetsCommand::Delete { id } => cmd_delete(&runner, id),
        PresetsCommand::Apply { id, force } => cmd_apply(&runner, id, force),
        PresetsCommand::Completions { shell } => {
            cli::print_completions::<PresetsCli>(shell, "gpu-presets");
            Ok(())
        }
    }
}

fn open_engine(runner: &SystemRunner) -> Result<Engine<'_>> {
    let paths = Paths::system()?;
    let log_file = paths.presets_log();
    Engine::open(paths, SysfsRoot::system(), runner, log_file)
}

fn cmd_list(runner: &SystemRunner, json: bool) -> Result<()> {
    let engine = open_engine(runner)?;
    let rows = engine.store().list();
    let active = engine.store().active()?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).map_err(|e| Error::State(e.to_string()))?
        );
        return Ok(());
    }
    output::print_presets(&rows, active.as_deref());
    Ok(())
}

fn cmd_active(runner: &SystemRunner) -> Result<()> {
    let engine = open_engine(runner)?;
    match engine.store().active()? {
        Some(id) => println!("{}", id),
        None => println!("{}", "none".dimmed()),
    }
    Ok(())
}

fn parse_category(s: &str, id: &str) -> Result<Category> {
    match s {
        "gaming" => Ok(Category::Gaming),
        "work" => Ok(Category::Work),
        "creative" => Ok(Category::Creative),
        "compute" => Ok(Category::Compute),
        "power" => Ok(Category::Power),
        "debug" => Ok(Category::Debug),
        "custom" => Ok(Category::Custom),
        other => Err(Error::InvalidField {
            id: id.to_string(),
            path: "category".to_string(),
            reason: format!("unknown category '{}'", other),
        }),
    }
}

fn cmd_create(
    runner: &SystemRunner,
    name: String,
    profile: String,
    category: String,
    description: String,
    overwrite: bool,
) -> Result<()> {
    let gpu_profile: Profile = profile.parse()?;
    let category = parse_category(&category, &name)?;
    let mut engine = open_engine(runner)?;

    let preset = Preset {
        id: name.clone(),
        name,
        description,
        category,
        priority: Priority::Custom,
        settings: SettingsPatch::default(),
        gpu_profile,
        applications: Vec::new(),
        device_specific: None,
    };
    let id = preset.id.clone();
    engine.store_mut().create(preset, overwrite)?;
    println!(
        "{} preset {} created over profile {}",
        "✓".green().bold(),
        id.cyan(),
        gpu_profile.id()
    );
    println!(
        "  edit {} to customise its settings",
        engine
            .paths()
            .presets_file()
            .display()
            .to_string()
            .dimmed()
    );
    Ok(())
}

fn cmd_delete(runner: &SystemRunner, id: String) -> Result<()> {
    let mut engine = open_engine(runner)?;
    engine.store_mut().delete(&id)?;
    println!("{} preset {} deleted", "✓".green().bold(), id.cyan());
    Ok(())
}

fn cmd_apply(runner: &SystemRunner, id: String, force: bool) -> Result<()> {
    let mut engine = open_engine(runner)?;
    let outcome = engine.apply_preset(&id, force)?;
    output::print_report(&outcome.report);
    println!(
        "{} preset {} applied over profile {}",
        "✓".green().bold(),
        id.cyan().bold(),
        outcome.profile.id()
    );
    println!("  reload Hyprland (hyprctl reload) to pick up the new settings");
    Ok(())
}

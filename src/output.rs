use crate::integrator::{ExecutionReport, StepResult};
use crate::observer::StatusView;
use crate::preset::store::PresetSummary;
use crate::probe::SystemSnapshot;
use crate::profile::{ALL_PROFILES, Profile};
use colored::Colorize;

const LABEL_W: usize = 16;

fn print_box(title: &str, rows: &[(&str, String)]) {
    let inner_w = rows
        .iter()
        .map(|(l, v)| l.len().max(LABEL_W) + 2 + v.len())
        .max()
        .unwrap_or(40);

    let fill = inner_w.saturating_sub(1 + title.len());
    println!("╭─ {} {}╮", title.bold(), "─".repeat(fill));
    for (label, value) in rows {
        let padded = format!("{:<w$}", label, w = LABEL_W);
        let pad = inner_w.saturating_sub(LABEL_W + 2 + value.len());
        println!("│ {}  {}{} │", padded.dimmed(), value, " ".repeat(pad));
    }
    println!("╰{}╯", "─".repeat(inner_w + 2));
}

pub fn print_hardware(snapshot: &SystemSnapshot) {
    let mut rows: Vec<(&str, String)> = vec![(
        "System",
        if snapshot.is_mobile_system {
            "Mobile".to_string()
        } else {
            "Desktop".to_string()
        },
    )];
    for gpu in &snapshot.gpus {
        rows.push((
            "GPU",
            format!(
                "[{}] {} ({}, {})",
                gpu.index, gpu.raw_description, gpu.architecture, gpu.form_factor
            ),
        ));
    }
    if snapshot.gpus.is_empty() {
        rows.push(("GPU", "none detected".to_string()));
    }
    print_box("Hardware", &rows);
}

pub fn print_status(view: &StatusView) {
    print_hardware(&view.snapshot);
    let rows: Vec<(&str, String)> = vec![
        ("Mode", view.current_mode.clone()),
        ("Renderer", view.active_renderer.clone()),
        (
            "Profile",
            view.active_profile
                .clone()
                .unwrap_or_else(|| "Unconfigured".to_string()),
        ),
        (
            "Preset",
            view.active_preset
                .clone()
                .unwrap_or_else(|| "None".to_string()),
        ),
    ];
    print_box("Status", &rows);
}

pub fn print_profiles(active: Option<&str>) {
    println!("{}", "Profiles".bold().underline());
    for profile in ALL_PROFILES {
        let marker = if Some(profile.id()) == active {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {} {:<12} {}",
            marker,
            profile.id().cyan(),
            profile.description().dimmed()
        );
    }
}

pub fn print_presets(rows: &[PresetSummary], active: Option<&str>) {
    println!("{}", "Presets".bold().underline());
    let mut category = String::new();
    for row in rows {
        if row.category != category {
            category = row.category.clone();
            println!("  {}", category.bold());
        }
        let marker = if Some(row.id.as_str()) == active {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        let origin = if row.builtin { "" } else { " (user)" };
        println!(
            "    {} {:<20} {:<12} {}{}",
            marker,
            row.id.cyan(),
            format!("[{}]", row.gpu_profile).dimmed(),
            row.name,
            origin.dimmed()
        );
    }
}

pub fn print_report(report: &ExecutionReport) {
    for step in &report.steps {
        match &step.result {
            StepResult::Success => {
                println!("  {} {} — {}", "ok".green().bold(), step.tool, step.reason);
            }
            StepResult::Skipped { reason } => {
                println!(
                    "  {} {} — {}",
                    "skip".yellow().bold(),
                    step.tool,
                    reason.dimmed()
                );
            }
            StepResult::Failed { detail, .. } => {
                println!("  {} {} — {}", "fail".red().bold(), step.tool, detail);
            }
        }
    }
    if report.failed_count() > 0 {
        println!(
            "  {} {} step(s) failed; continuing best-effort",
            "note:".yellow(),
            report.failed_count()
        );
    }
}

pub fn print_switched(profile: Profile, region_written: bool, warnings: &[String]) {
    for warning in warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
    if region_written {
        println!(
            "{} switched to {}",
            "✓".green().bold(),
            profile.id().cyan().bold()
        );
        println!("  reload Hyprland (hyprctl reload) to pick up the new settings");
    } else {
        println!(
            "{} profile {} applied without compositor changes",
            "✓".green().bold(),
            profile.id().cyan().bold()
        );
    }
}

use anyhow::Result;
use clap::CommandFactory;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    let man_dir = Path::new("man");
    fs::create_dir_all(man_dir)?;

    clap_mangen::generate_to(hyprgpu::cli::SwitcherCli::command(), man_dir)?;
    clap_mangen::generate_to(hyprgpu::cli::PresetsCli::command(), man_dir)?;

    // List generated files
    for entry in fs::read_dir(man_dir)? {
        let entry = entry?;
        println!("Generated {}", entry.path().display());
    }

    Ok(())
}

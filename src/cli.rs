use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "gpu-switcher",
    about = "GPU profile engine for Hyprland - detect hardware, switch routing profiles",
    version
)]
pub struct SwitcherCli {
    #[command(subcommand)]
    pub command: SwitcherCommand,

    /// Output as JSON instead of formatted tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum SwitcherCommand {
    /// Probe GPUs and persist the hardware snapshot
    Detect,

    /// List the available profiles
    List,

    /// Show hardware, current mode, renderer, and managed regions
    Status,

    /// Pick and apply the best profile for this hardware
    Optimize {
        /// Reapply even if the chosen profile is already active
        #[arg(long)]
        force: bool,
    },

    /// Live view of mode, profile, and renderer
    Monitor,

    /// Time the probe/classify pipeline and save a report
    Benchmark,

    /// Remove all managed config regions and restore neutral routing
    Reset,

    /// Switch to a profile
    Switch {
        /// integrated | discrete | hybrid | performance | power-save | balanced
        profile: String,
        /// Reapply even if the profile is already active
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (auto-detected if omitted)
        shell: Option<Shell>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "gpu-presets",
    about = "Preset layers over GPU profiles for Hyprland",
    version
)]
pub struct PresetsCli {
    #[command(subcommand)]
    pub command: PresetsCommand,

    /// Output as JSON instead of formatted tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum PresetsCommand {
    /// List built-in and user presets by category
    List,

    /// Show the active preset
    Active,

    /// Create a user preset
    Create {
        /// Preset id (letters, digits, underscore, hyphen)
        name: String,
        /// Base profile the preset layers over
        #[arg(long, default_value = "balanced")]
        profile: String,
        /// Category: gaming|work|creative|compute|power|debug|custom
        #[arg(long, default_value = "custom")]
        category: String,
        /// Human-readable description
        #[arg(long, default_value = "")]
        description: String,
        /// Replace an existing preset of the same id (backs up the document)
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete a user preset
    Delete {
        /// Preset id
        id: String,
    },

    /// Apply a preset (switching to its profile if needed)
    Apply {
        /// Preset id
        id: String,
        /// Redo the profile transition even if already active
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (auto-detected if omitted)
        shell: Option<Shell>,
    },
}

/// Print shell completions to stdout.
pub fn print_completions<C: CommandFactory>(shell: Option<Shell>, bin_name: &str) {
    let shell = shell.or_else(Shell::from_env).unwrap_or_else(|| {
        eprintln!(
            "Could not detect shell. Specify one: {} completions bash|zsh|fish|elvish|powershell",
            bin_name
        );
        std::process::exit(1);
    });
    clap_complete::generate(shell, &mut C::command(), bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switcher_cli_parses() {
        SwitcherCli::command().debug_assert();
        let cli = SwitcherCli::parse_from(["gpu-switcher", "switch", "discrete", "--force"]);
        match cli.command {
            SwitcherCommand::Switch { profile, force } => {
                assert_eq!(profile, "discrete");
                assert!(force);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_presets_cli_parses() {
        PresetsCli::command().debug_assert();
        let cli = PresetsCli::parse_from([
            "gpu-presets",
            "create",
            "my-preset",
            "--profile",
            "performance",
            "--overwrite",
        ]);
        match cli.command {
            PresetsCommand::Create {
                name,
                profile,
                overwrite,
                ..
            } => {
                assert_eq!(name, "my-preset");
                assert_eq!(profile, "performance");
                assert!(overwrite);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_usage_error_distinguished_from_help() {
        // binaries exit 1 on e.use_stderr() errors, 0 on help/version
        let err = SwitcherCli::try_parse_from(["gpu-switcher", "bogus"]).unwrap_err();
        assert!(err.use_stderr());
        let help = SwitcherCli::try_parse_from(["gpu-switcher", "--help"]).unwrap_err();
        assert!(!help.use_stderr());
        let version = PresetsCli::try_parse_from(["gpu-presets", "--version"]).unwrap_err();
        assert!(!version.use_stderr());
    }

    #[test]
    fn test_json_flag_is_global() {
        let cli = SwitcherCli::parse_from(["gpu-switcher", "status", "--json"]);
        assert!(cli.json);
    }
}

// CLI module - command-line argument parsing and handlers
//
// Top-level flags tweak the dashboard launch; the `config` subcommand
// manages the config file and exits:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;

/// azstore - Azurite storage explorer with live emulator logs
#[derive(Parser, Debug)]
#[command(name = "azstore")]
#[command(version = VERSION)]
#[command(about = "Terminal dashboard for the Azurite storage emulator", long_about = None)]
pub struct Cli {
    /// Use a synthetic log source instead of Docker
    #[arg(long)]
    pub demo: bool,

    /// Skip the welcome overlay
    #[arg(long)]
    pub no_welcome: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Flags that affect the dashboard itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    pub demo: bool,
    pub no_welcome: bool,
}

impl LaunchFlags {
    /// Command-line flags win over env and file settings
    pub fn apply(&self, config: &mut Config) {
        if self.demo {
            config.demo = true;
        }
        if self.no_welcome {
            config.show_welcome = false;
        }
    }
}

/// Handle CLI commands. Returns `None` if a subcommand was handled (exit after).
pub fn handle_cli() -> Option<LaunchFlags> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else {
                println!("Usage: azstore config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
            }
            None
        }
        None => Some(LaunchFlags {
            demo: cli.demo,
            no_welcome: cli.no_welcome,
        }),
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    if let Some(path) = Config::config_path() {
        let status = if path.exists() { "" } else { " (not created yet)" };
        println!("# Config file: {}{}", path.display(), status);
    }
    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn launch_flags_parse() {
        let cli = Cli::parse_from(["azstore", "--demo", "--no-welcome"]);
        assert!(cli.demo);
        assert!(cli.no_welcome);
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::parse_from(["azstore", "config", "--path"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config { path: true, show: false, reset: false })
        ));
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        LaunchFlags {
            demo: true,
            no_welcome: true,
        }
        .apply(&mut config);
        assert!(config.demo);
        assert!(!config.show_welcome);

        let mut config = Config::default();
        LaunchFlags::default().apply(&mut config);
        assert!(!config.demo);
        assert!(config.show_welcome);
    }
}

//! Config CLI commands.
//!
//! Commands for managing the shell configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, ConfigError, ShellConfig, config_paths};
use crate::error::IviShellError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  ivi-shell config init              # Create config at default location
  ivi-shell config init --force      # Overwrite existing config
  ivi-shell config init --path ./shell.jsonc  # Create at custom path
  ivi-shell config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/ivi-shell/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the paths searched for configuration files and indicates
    /// which one is currently in use (if any).
    Path,

    /// Load and validate the configuration file.
    ///
    /// Reports parse errors, `sameAs` chains that are too deep or dangling,
    /// and rules naming unknown states or events.
    Check,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), IviShellError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
        ConfigCommands::Check => check_config(),
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), IviShellError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(IviShellError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        IviShellError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Show the configuration file search paths.
fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'ivi-shell config init' to create one.");
    }
}

/// Load the active configuration strictly and validate it.
fn check_config() -> Result<(), IviShellError> {
    let loaded = config::get_custom_config_path()
        .map_or_else(config::load_config_default, |path| config::load_config_from_path(path));

    let (config, path) = match loaded {
        Ok(loaded) => loaded,
        Err(ConfigError::NotFound) => {
            println!("{}", "No configuration file found, defaults apply.".dimmed());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    config.validate()?;
    println!("{} {}", "✓".green(), path.display());
    print_summary(&config);
    Ok(())
}

fn print_summary(config: &ShellConfig) {
    println!("  policy engine:  {:?}", config.policy.engine);
    println!("  outputs:        {}", config.outputs.len());
    println!("  rules:          {}", config.policy.rules.len());
    if let Some(command) = &config.shell_client.command {
        println!("  shell client:   {command}");
    }
}

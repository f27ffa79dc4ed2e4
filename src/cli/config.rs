//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::services::naming::NamingScheme;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
    /// Print the configuration file path
    Path,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Suffix for derived merge output file names
    #[arg(long, value_name = "SUFFIX")]
    output_suffix: Option<String>,

    /// Default naming scheme
    #[arg(long, value_enum)]
    scheme: Option<NamingScheme>,

    /// Sort holdTaps and macros by name when writing
    #[arg(long, value_name = "BOOL")]
    sort_behaviors: Option<bool>,

    /// Additional firmware behavior (repeat for multiple, replaces the list)
    #[arg(long = "extra-builtin", value_name = "NAME")]
    extra_builtins: Vec<String>,

    /// Description suffix to strip (repeat for multiple, replaces the list)
    #[arg(long = "strip-suffix", value_name = "TEXT")]
    strip_suffixes: Vec<String>,
}

fn config_path(explicit: Option<&Path>) -> CliResult<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file_path()
            .map_err(|e| CliError::io(format!("Failed to locate configuration: {e}"))),
    }
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, explicit: Option<&Path>) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(explicit),
            ConfigCommand::Set(args) => args.execute(explicit),
            ConfigCommand::Path => {
                println!("{}", config_path(explicit)?.display());
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, explicit: Option<&Path>) -> CliResult<()> {
        let config = Config::resolve(explicit)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            print_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self, explicit: Option<&Path>) -> CliResult<()> {
        // At least one argument must be provided
        if self.output_suffix.is_none()
            && self.scheme.is_none()
            && self.sort_behaviors.is_none()
            && self.extra_builtins.is_empty()
            && self.strip_suffixes.is_empty()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --output-suffix, --scheme, --sort-behaviors, --extra-builtin or --strip-suffix",
            ));
        }

        let path = config_path(explicit)?;
        let mut config = if path.exists() {
            Config::load_from(&path)
                .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?
        } else {
            Config::default()
        };

        if let Some(suffix) = &self.output_suffix {
            config.merge.output_suffix.clone_from(suffix);
        }
        if let Some(scheme) = self.scheme {
            config.merge.scheme = scheme;
        }
        if let Some(sort) = self.sort_behaviors {
            config.merge.sort_behaviors = sort;
        }
        if !self.extra_builtins.is_empty() {
            config.behaviors.extra_builtins.clone_from(&self.extra_builtins);
        }
        if !self.strip_suffixes.is_empty() {
            config.rename.strip_suffixes.clone_from(&self.strip_suffixes);
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid configuration: {e}")))?;
        config
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("{APP_NAME} Configuration");
    println!("{}", "=".repeat(APP_NAME.len() + 14));
    println!();

    println!("Merge:");
    println!("  Output Suffix: {}", config.merge.output_suffix);
    println!("  Sort Behaviors: {}", config.merge.sort_behaviors);
    println!("  Naming Scheme: {}", config.merge.scheme.as_str());
    println!();

    println!("Behaviors:");
    if config.behaviors.extra_builtins.is_empty() {
        println!("  Extra Built-ins: (none)");
    } else {
        println!("  Extra Built-ins: {}", config.behaviors.extra_builtins.join(", "));
    }
    println!();

    println!("Rename:");
    let suffixes: Vec<String> = config
        .rename
        .strip_suffixes
        .iter()
        .map(|suffix| format!("{suffix:?}"))
        .collect();
    println!("  Strip Suffixes: {}", suffixes.join(", "));
    println!();
}

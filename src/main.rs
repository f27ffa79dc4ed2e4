//! hrmkit - home-row-mod toolkit for Glove80 layouts
//!
//! Copies home-row-mod bindings between layout files together with every
//! behavior and layer they depend on, renames legacy behavior names, and
//! restructures layers while keeping layer references consistent.

use clap::{Parser, Subcommand};
use hrmkit::cli::{
    CliError, CliResult, ClosureArgs, ConfigArgs, InsertLayerArgs, LayerRefsArgs, MergeArgs,
    RemoveLayerArgs, RenameArgs, SwapLayersArgs,
};
use hrmkit::config::Config;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// hrmkit - merge and maintain home-row mods in Glove80 layouts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE", env = "HRMKIT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy home-row-mod bindings from one layout into another
    Merge(MergeArgs),
    /// Rename legacy home-row-mod behaviors in place
    Rename(RenameArgs),
    /// Move home-row mods from the base layer onto their own layer
    InsertLayer(InsertLayerArgs),
    /// Promote a modded base layer above the plain one
    SwapLayers(SwapLayersArgs),
    /// Remove a layer and shift every reference to later layers
    RemoveLayer(RemoveLayerArgs),
    /// Show the behaviors and layers selected bindings depend on
    Closure(ClosureArgs),
    /// Show inbound layer references and transparency warnings
    LayerRefs(LayerRefsArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    let explicit = cli.config.as_deref();

    // config commands handle a broken file themselves
    if let Command::Config(args) = &cli.command {
        return args.execute(explicit);
    }

    let config = Config::resolve(explicit)
        .map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))?;
    debug!("Loaded configuration: {:?}", config);

    match &cli.command {
        Command::Merge(args) => args.execute(&config),
        Command::Rename(args) => args.execute(&config),
        Command::InsertLayer(args) => args.execute(),
        Command::SwapLayers(args) => args.execute(),
        Command::RemoveLayer(args) => args.execute(),
        Command::Closure(args) => args.execute(&config),
        Command::LayerRefs(args) => args.execute(),
        Command::Config(_) => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code.code());
    }
}

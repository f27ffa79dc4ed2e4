//! CLI command handlers for hrmkit.
//!
//! Each command lives in its own module with a clap `Args` struct and an
//! `execute()` method returning [`CliResult`](common::CliResult).

pub mod closure;
pub mod common;
pub mod config;
pub mod layer_refs;
pub mod layers;
pub mod merge;
pub mod rename;

// Re-export types used by main.rs and tests
pub use closure::ClosureArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use layer_refs::LayerRefsArgs;
pub use layers::{InsertLayerArgs, RemoveLayerArgs, SwapLayersArgs};
pub use merge::MergeArgs;
pub use rename::RenameArgs;

//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
pub mod render;
mod version;

pub use commands::{handle_config_command, run, Command, ConfigSubcommand};
pub use logging::init_logging;
pub use version::display_version;

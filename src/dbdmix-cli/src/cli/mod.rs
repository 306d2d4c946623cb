//! CLI argument definitions for dbdmix
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;

pub use core::{Cli, Commands, OutputFormat, SettingsArgs};

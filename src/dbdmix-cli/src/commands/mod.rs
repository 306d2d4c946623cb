//! Command handlers for dbdmix CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod check;
pub mod configure;
pub mod list;
pub mod mix;
pub mod session;

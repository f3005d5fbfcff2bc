//! CLI module
//!
//! Command-line interface for the list service.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `fetch` - Stream one list to stdout

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};

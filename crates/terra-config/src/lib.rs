//! Configuration for the Terra terrain toolkit.
//!
//! Settings persist to disk as RON, can be overridden from the command line via clap,
//! and are passed explicitly into sampling and tile streaming. Nothing here is global.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, GeneratorConfig, GraphConfig, TileConfig};
pub use error::ConfigError;

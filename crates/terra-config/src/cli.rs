//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Headless node-graph terrain streaming")]
pub struct CliArgs {
    /// World-space tile edge length.
    #[arg(long)]
    pub length: Option<f64>,

    /// Samples per tile edge.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Divisor applied to world coordinates before sampling.
    #[arg(long)]
    pub spread: Option<f64>,

    /// Generation radius in tiles.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Number of inactive tiles kept for reuse.
    #[arg(long)]
    pub cache_size: Option<usize>,

    /// Tile builder threads (0 builds on the scheduling thread).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Graph file to evaluate.
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of scheduling ticks to simulate.
    #[arg(long, default_value_t = 120)]
    pub ticks: u32,

    /// Directory to write biome preview PNGs into.
    #[arg(long)]
    pub preview_dir: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(length) = args.length {
            self.generator.length = length;
        }
        if let Some(resolution) = args.resolution {
            self.generator.resolution = resolution;
        }
        if let Some(spread) = args.spread {
            self.generator.spread = spread;
        }
        if let Some(radius) = args.radius {
            self.tiles.generation_radius = radius;
        }
        if let Some(size) = args.cache_size {
            self.tiles.cache_size = size;
        }
        if let Some(workers) = args.workers {
            self.tiles.worker_threads = workers;
        }
        if let Some(ref graph) = args.graph {
            self.graph.selected_file = Some(graph.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            resolution: Some(128),
            radius: Some(5),
            graph: Some(PathBuf::from("world.json")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.generator.resolution, 128);
        assert_eq!(config.tiles.generation_radius, 5);
        assert_eq!(config.graph.selected_file, Some(PathBuf::from("world.json")));
        // Non-overridden fields retain defaults
        assert_eq!(config.generator.length, 100.0);
        assert_eq!(config.tiles.cache_size, 30);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["terra", "--workers", "0", "--ticks", "3"]);
        assert_eq!(args.workers, Some(0));
        assert_eq!(args.ticks, 3);
        assert!(args.preview_dir.is_none());
    }
}

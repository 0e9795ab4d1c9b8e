//! Headless terrain streaming.
//!
//! Loads the configured graph (or a starter template), streams tiles around an anchor
//! that walks across the world, and optionally writes node and splat previews.

mod previews;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use glam::DVec3;
use terra_config::{CliArgs, Config};
use terra_graph::{Graph, GraphStatus};
use terra_tile::{GraphTileBuilder, GridPosition, TickReport, TilePool, TileWorkers};

/// Resolves the selected graph, falling back to a template when it is unusable.
fn load_graph(config: &Config) -> Graph {
    let status = GraphStatus::resolve(config.graph.selected_file.as_deref());
    if status.is_ready() {
        if let Some(graph) = status.into_graph() {
            return graph;
        }
    } else {
        tracing::warn!("{}", status.message());
    }
    tracing::info!(
        name = %config.graph.default_graph_name,
        "using starter template graph"
    );
    Graph::default_template(&config.graph.default_graph_name)
}

/// Anchor position at `tick`: a slow diagonal walk, a quarter tile per tick.
fn anchor_at(tick: u32, length: f64) -> DVec3 {
    let step = tick as f64 * length * 0.25;
    DVec3::new(step, 0.0, step * 0.5)
}

#[derive(Default)]
struct Totals {
    built: usize,
    failed: usize,
    promoted: usize,
    evicted: usize,
    dropped: usize,
    skipped: usize,
}

impl Totals {
    fn add(&mut self, report: &TickReport) {
        self.built += report.built;
        self.failed += report.failed;
        self.promoted += report.promoted;
        self.evicted += report.evicted;
        self.dropped += report.dropped;
        self.skipped += usize::from(report.skipped);
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from(".terra"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Ignoring command-line overrides: {e}");
        config = Config::load_or_create(&config_dir).unwrap_or_default();
    }

    let log_dir = config_dir.join("logs");
    terra_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let graph = load_graph(&config);
    tracing::info!(
        name = graph.name(),
        nodes = graph.len(),
        biomes = graph.biomes().len(),
        "graph ready"
    );

    if let Some(dir) = &args.preview_dir {
        match previews::write_node_previews(&graph, dir, config.graph.preview_size) {
            Ok(count) => tracing::info!(count, dir = %dir.display(), "wrote node previews"),
            Err(e) => tracing::error!("Failed to write node previews: {e}"),
        }
    }

    let builder = match GraphTileBuilder::from_graph(&graph, &config.generator) {
        Ok(builder) => Arc::new(builder),
        Err(e) => {
            tracing::error!("Cannot stream tiles: {e}");
            return;
        }
    };

    let threads = config.tiles.worker_threads.min(num_cpus::get());
    let workers = TileWorkers::new(builder.clone(), threads);
    let mut pool = TilePool::with_workers(workers, &config.tiles, &config.generator);
    tracing::info!(
        radius = pool.radius(),
        cache_size = config.tiles.cache_size,
        threads,
        ticks = args.ticks,
        "streaming tiles"
    );

    let mut totals = Totals::default();
    let mut anchor = DVec3::ZERO;
    for tick in 0..args.ticks {
        anchor = anchor_at(tick, config.generator.length);
        totals.add(&pool.tick(anchor));
    }

    tracing::info!(
        built = totals.built,
        failed = totals.failed,
        promoted = totals.promoted,
        evicted = totals.evicted,
        dropped = totals.dropped,
        skipped_updates = totals.skipped,
        active = pool.cache().active_len(),
        cached = pool.cache().cached_len(),
        "streaming finished"
    );

    if let Some(dir) = &args.preview_dir {
        let center = GridPosition::from_world(anchor.x, anchor.z, config.generator.length);
        match pool.cache().active(center) {
            Some(tile) => match previews::write_tile_splat(tile.data(), builder.biomes(), dir) {
                Ok(Some(path)) => tracing::info!(path = %path.display(), "wrote splat preview"),
                Ok(None) => tracing::info!("graph has no biomes, no splat preview"),
                Err(e) => tracing::error!("Failed to write splat preview: {e}"),
            },
            None => tracing::info!(%center, "anchor tile still building, no splat preview"),
        }
    }

    pool.reset_in_flight();
}

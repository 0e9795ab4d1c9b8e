//! PNG previews of graph nodes and streamed tiles.

use std::fs;
use std::path::{Path, PathBuf};

use terra_biome::{Biome, PreviewError, PreviewImage};
use terra_graph::Graph;
use terra_tile::TileData;

/// Writes one PNG per previewable node as `<id>-<title>.png`. Returns how many were
/// written; nodes that cannot be evaluated yet are skipped.
pub fn write_node_previews(graph: &Graph, dir: &Path, size: u32) -> Result<usize, PreviewError> {
    fs::create_dir_all(dir)?;
    let mut written = 0;
    for node in graph.nodes() {
        let Some(image) = graph.preview(node.id, size) else {
            continue;
        };
        let name = format!("{}-{}.png", node.id.0, node.kind.title().to_lowercase());
        image.write_png(&dir.join(name))?;
        written += 1;
    }
    Ok(written)
}

/// Writes the tile's splat map in biome colors. Returns `None` if the tile has no splat.
pub fn write_tile_splat(
    tile: &TileData,
    biomes: &[Biome],
    dir: &Path,
) -> Result<Option<PathBuf>, PreviewError> {
    let Some(splat) = &tile.splat else {
        return Ok(None);
    };
    let colors: Vec<[u8; 3]> = biomes.iter().map(|b| b.settings().color).collect();
    let image = PreviewImage::from_splat(splat, &colors);

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("splat_{}_{}.png", tile.position.x, tile.position.z));
    image.write_png(&path)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use terra_config::GeneratorConfig;
    use terra_tile::{GraphTileBuilder, GridPosition, TileBuilder};

    use super::*;

    #[test]
    fn test_template_previews_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let graph = Graph::default_template("preview");
        let count = write_node_previews(&graph, dir.path(), 8).unwrap();
        // Noise and biome render; the end node does not.
        assert_eq!(count, 2);
        assert!(dir.path().join("0-perlin.png").exists());
        assert!(dir.path().join("2-biome.png").exists());
    }

    #[test]
    fn test_splat_preview_named_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let graph = Graph::default_template("splat");
        let builder = GraphTileBuilder::from_graph(&graph, &GeneratorConfig::default()).unwrap();
        let tile = builder.build(GridPosition::new(-2, 5), 8).unwrap();

        let path = write_tile_splat(&tile, builder.biomes(), dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("splat_-2_5.png"));
        assert!(path.exists());
    }
}

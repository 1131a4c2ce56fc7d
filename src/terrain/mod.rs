//! Terrain generation: pieces, continents, stone, tectonics and coastline diffusion.
//!
//! Generation steps, in order:
//! 1. Partition the map into pieces by equal cellular noise values
//! 2. Merge pieces into continents and decide land and water
//! 3. Assign stone types from a gradient noise
//! 4. Apply tectonic boundary effects between continents
//! 5. Spread coastline height into the surrounding ocean
//! 6. Drown any border cell that was lifted above sea level

pub mod continents;
pub mod diffusion;
pub mod graph;
pub mod pieces;
pub mod stone;
pub mod tectonics;

use crate::data::MapData;
use crate::error::GenerationError;
use crate::noise::{NoiseDefinition, NoiseGenerator};

pub use continents::{Continents, AVERAGE_WATER_HEIGHT, MINIMUM_LAND_HEIGHT};
pub use graph::{AdjacencyGraph, ContinentGraph};
pub use pieces::{Pieces, MAX_PIECES};
pub use tectonics::{BoundaryCounts, BoundaryType};

/// Frequency of the cellular noise that cuts the map into pieces.
pub const PIECES_FREQUENCY: f32 = 0.025;
/// Frequency of the gradient noise that picks stone types.
pub const STONE_FREQUENCY: f32 = 0.03;

pub fn pieces_noise_definition() -> NoiseDefinition {
    NoiseDefinition::cellular(PIECES_FREQUENCY)
}

pub fn stone_noise_definition() -> NoiseDefinition {
    NoiseDefinition::gradient(STONE_FREQUENCY)
}

/// Counts gathered while generating terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainSummary {
    pub pieces: usize,
    pub continents: usize,
    pub boundaries: BoundaryCounts,
    pub coastal_sources: usize,
}

/// Run the full terrain pipeline over `data`.
pub fn generate_terrain(
    data: &mut MapData,
    pieces_noise: &dyn NoiseGenerator,
    stone_noise: &dyn NoiseGenerator,
) -> Result<TerrainSummary, GenerationError> {
    let width = data.width();

    let pieces_grid = pieces_noise.get_noise_grid((0, 0), width, width);
    let pieces = pieces::assign_pieces(data, &pieces_grid)?;
    tracing::debug!(pieces = pieces.len(), "Assigned pieces");

    let continents = continents::build_continents(data, &pieces);

    let stone_grid = stone_noise.get_noise_grid((0, 0), width, width);
    stone::assign_stone_types(data, &stone_grid);

    let boundaries = tectonics::simulate_tectonics(data, &continents.graph);
    let coastal_sources = diffusion::spread_coastline_height(data);

    let drowned = drown_border(data);
    if drowned > 0 {
        tracing::debug!(drowned, "Lowered lifted border cells");
    }

    Ok(TerrainSummary {
        pieces: pieces.len(),
        continents: continents.graph.len(),
        boundaries,
        coastal_sources,
    })
}

/// Border cells can be lifted by tectonics or diffusion after the border was
/// flooded. Any that ended up as land is reset to the average water height.
fn drown_border(data: &mut MapData) -> usize {
    let width = data.width();
    let mut drowned = 0;

    for (x, y, cell) in data.cells_mut().iter_mut() {
        let border = x == 0 || y == 0 || x == width - 1 || y == width - 1;
        if border && cell.is_land() {
            cell.height = AVERAGE_WATER_HEIGHT;
            drowned += 1;
        }
    }

    drowned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseFactory;

    fn generate(seed: u64, width: usize) -> (MapData, TerrainSummary) {
        let mut factory = NoiseFactory::new(seed);
        let pieces = factory.create(pieces_noise_definition());
        let stone = factory.create(stone_noise_definition());

        let mut data = MapData::new(width);
        let summary = generate_terrain(&mut data, &pieces, &stone).unwrap();
        (data, summary)
    }

    #[test]
    fn test_terrain_is_deterministic() {
        let (first, first_summary) = generate(7, 96);
        let (second, second_summary) = generate(7, 96);
        assert_eq!(first, second);
        assert_eq!(first_summary, second_summary);
    }

    #[test]
    fn test_border_stays_water() {
        let (data, _) = generate(11, 96);
        for (x, y, cell) in data.cells().iter() {
            if x == 0 || y == 0 || x == 95 || y == 95 {
                assert!(!cell.is_land(), "border cell ({x}, {y}) is land");
            }
        }
    }

    #[test]
    fn test_drown_border_only_touches_land() {
        let mut data = MapData::new(3);
        data.cell_mut(0, 0).height = 0.3;
        data.cell_mut(1, 0).height = -0.05;
        data.cell_mut(1, 1).height = 0.3;

        assert_eq!(drown_border(&mut data), 1);
        assert_eq!(data.cell(0, 0).height, AVERAGE_WATER_HEIGHT);
        assert_eq!(data.cell(1, 0).height, -0.05);
        assert_eq!(data.cell(1, 1).height, 0.3);
    }

    #[test]
    fn test_terrain_produces_many_pieces() {
        let (_, summary) = generate(3, 96);
        assert!(summary.pieces > 1);
        assert!(summary.continents >= 1);
        assert!(summary.continents <= summary.pieces);
    }
}

use std::collections::HashMap;

use crate::data::MapData;
use crate::error::GenerationError;
use crate::tilemap::Tilemap;

use super::graph::AdjacencyGraph;

/// Number of piece ids a 16-bit signed continent field can hold.
pub const MAX_PIECES: usize = i16::MAX as usize + 1;

/// Range of the height offset a piece's noise value contributes.
const PIECE_HEIGHT_VARIANCE: f32 = 0.05;

/// Result of partitioning the map into pieces.
#[derive(Clone, Debug)]
pub struct Pieces {
    /// Generating noise value of each piece, indexed by piece id.
    pub values: Vec<f32>,
    /// Adjacency between horizontally or vertically touching pieces.
    pub graph: AdjacencyGraph,
}

impl Pieces {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assign every distinct noise value a piece id in row-major order of first appearance.
///
/// Each cell's `continent` temporarily holds its piece id and its height is seeded
/// from the piece's noise value. The adjacency graph is filled in the same scan
/// by looking at west and north neighbours only.
pub fn assign_pieces(data: &mut MapData, noise: &Tilemap<f32>) -> Result<Pieces, GenerationError> {
    let width = data.width();
    debug_assert_eq!((noise.width, noise.height), (width, width));

    let mut ids: HashMap<u32, usize> = HashMap::new();
    let mut values: Vec<f32> = Vec::new();
    let mut graph = AdjacencyGraph::default();

    for y in 0..width {
        for x in 0..width {
            let value = *noise.get(x, y);

            let piece = match ids.get(&value.to_bits()) {
                Some(&piece) => piece,
                None => {
                    let piece = values.len();
                    if piece >= MAX_PIECES {
                        return Err(GenerationError::TooManyPieces {
                            count: count_distinct(noise),
                            max: MAX_PIECES,
                        });
                    }
                    ids.insert(value.to_bits(), piece);
                    values.push(value);
                    graph.ensure_node(piece);
                    piece
                }
            };

            let cell = data.cell_mut(x, y);
            cell.continent = piece as i16;
            cell.height = value * PIECE_HEIGHT_VARIANCE;

            if x > 0 {
                graph.add_edge(piece, data.cell(x - 1, y).continent as usize);
            }
            if y > 0 {
                graph.add_edge(piece, data.cell(x, y - 1).continent as usize);
            }
        }
    }

    Ok(Pieces { values, graph })
}

fn count_distinct(noise: &Tilemap<f32>) -> usize {
    let mut bits: Vec<u32> = noise.as_slice().iter().map(|v| v.to_bits()).collect();
    bits.sort_unstable();
    bits.dedup();
    bits.len()
}

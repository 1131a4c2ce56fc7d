//! Merging pieces into continents and deciding land versus water.
//!
//! Every step walks pieces in ascending id order and neighbours in ascending id
//! order, so "first neighbour found" decisions are reproducible.

use crate::data::MapData;
use crate::union_find::UnionFind;

use super::graph::{AdjacencyGraph, ContinentGraph};
use super::pieces::Pieces;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Divisor of the piece value in the budget exponent.
const BUDGET_EXPONENT_SCALE: f32 = 0.525;
/// Subtracted before flooring the budget so weak pieces buy nothing.
const BUDGET_BIAS: f32 = 0.9;
/// Pieces with a larger absolute value seed land.
const LAND_THRESHOLD: f32 = 0.9;
/// Added to the absolute height of land cells.
pub const MINIMUM_LAND_HEIGHT: f32 = 0.01;
/// Added to the height of water cells.
pub const AVERAGE_WATER_HEIGHT: f32 = -0.1;

/// Outcome of continent construction.
#[derive(Clone, Debug)]
pub struct Continents {
    /// Adjacency between merged continents keyed by union-find root.
    pub graph: ContinentGraph,
    /// Final piece grouping.
    pub sets: UnionFind,
    /// Land classification per piece.
    pub land: Vec<bool>,
}

/// Merge pieces into continents, classify land and water, and rewrite every cell's
/// height and continent id.
///
/// Cells must still hold their piece id in `continent`, as left by
/// [`assign_pieces`](super::pieces::assign_pieces).
pub fn build_continents(data: &mut MapData, pieces: &Pieces) -> Continents {
    let graph = &pieces.graph;
    let mut sets = UnionFind::new(pieces.len());

    buy_neighbors(graph, &pieces.values, &mut sets);
    consume_enclosed(graph, &mut sets);
    merge_singletons(graph, &mut sets);

    let mut land = decide_land(graph, &pieces.values);
    fill_gaps(graph, &mut sets, &mut land);
    flood_border(data, &mut land);
    apply_heights(data, &mut sets, &land);

    let merged = graph.merge(&mut sets, &pieces.values);

    tracing::debug!(
        pieces = pieces.len(),
        continents = merged.len(),
        land_pieces = land.iter().filter(|&&is_land| is_land).count(),
        "Built continents"
    );

    Continents {
        graph: merged,
        sets,
        land,
    }
}

/// Number of unions a piece may buy with its neighbours.
pub fn budget(value: f32) -> i32 {
    (2f32.powf(value.abs() / BUDGET_EXPONENT_SCALE) - BUDGET_BIAS).floor() as i32
}

/// Each piece joins neighbours until its budget runs out.
/// A unit is only spent on a union that joins two different groups.
pub fn buy_neighbors(graph: &AdjacencyGraph, values: &[f32], sets: &mut UnionFind) {
    for piece in 0..graph.len() {
        let mut remaining = budget(values[piece]);

        for &neighbor in graph.neighbors(piece) {
            if remaining <= 0 {
                break;
            }
            if sets.union(piece, neighbor) {
                remaining -= 1;
            }
        }
    }
}

/// A piece whose neighbours all belong to one group is swallowed by it.
pub fn consume_enclosed(graph: &AdjacencyGraph, sets: &mut UnionFind) {
    for piece in 0..graph.len() {
        let mut neighbors = graph.neighbors(piece).iter();
        let Some(&first) = neighbors.next() else {
            continue;
        };

        let group = sets.find(first);
        if neighbors.all(|&neighbor| sets.find(neighbor) == group) {
            sets.union(piece, group);
        }
    }
}

/// Pairs up pieces that are still alone with the first lone neighbour.
pub fn merge_singletons(graph: &AdjacencyGraph, sets: &mut UnionFind) {
    for piece in 0..graph.len() {
        if sets.size(piece) != 1 {
            continue;
        }

        for &neighbor in graph.neighbors(piece) {
            if sets.size(neighbor) == 1 {
                sets.union(piece, neighbor);
                break;
            }
        }
    }
}

/// Strong pieces become land and turn their direct neighbours into land too.
pub fn decide_land(graph: &AdjacencyGraph, values: &[f32]) -> Vec<bool> {
    let seeds: Vec<bool> = values.iter().map(|value| value.abs() > LAND_THRESHOLD).collect();
    let mut land = seeds.clone();

    for (piece, &seed) in seeds.iter().enumerate() {
        if !seed {
            continue;
        }
        for &neighbor in graph.neighbors(piece) {
            land[neighbor] = true;
        }
    }

    land
}

/// Flip pieces whose every neighbour has the opposite classification and sits in
/// another group.
pub fn fill_gaps(graph: &AdjacencyGraph, sets: &mut UnionFind, land: &mut [bool]) {
    for piece in 0..graph.len() {
        let neighbors = graph.neighbors(piece);
        if neighbors.is_empty() {
            continue;
        }

        let own = land[piece];
        let isolated = neighbors
            .iter()
            .all(|&neighbor| land[neighbor] != own && !sets.connected(piece, neighbor));

        if isolated {
            land[piece] = !own;
        }
    }
}

/// Pieces touching the map edge are always water.
pub fn flood_border(data: &MapData, land: &mut [bool]) {
    let width = data.width();
    for (x, y, cell) in data.cells().iter() {
        if x == 0 || y == 0 || x == width - 1 || y == width - 1 {
            land[cell.continent as usize] = false;
        }
    }
}

/// Turn seeded heights into final land and water heights and replace piece ids
/// with continent roots.
fn apply_heights(data: &mut MapData, sets: &mut UnionFind, land: &[bool]) {
    for (_, _, cell) in data.cells_mut().iter_mut() {
        let piece = cell.continent as usize;

        if land[piece] {
            cell.height = cell.height.abs() + MINIMUM_LAND_HEIGHT;
        } else {
            cell.height += AVERAGE_WATER_HEIGHT;
        }

        cell.continent = sets.find(piece) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::pieces::assign_pieces;
    use crate::tilemap::Tilemap;

    fn ring_map(width: usize, ring: f32, inner: f32) -> Tilemap<f32> {
        Tilemap::from_fn(width, width, |x, y| {
            if x == 0 || y == 0 || x == width - 1 || y == width - 1 {
                ring
            } else {
                inner
            }
        })
    }

    #[test]
    fn test_budget_curve() {
        assert_eq!(budget(0.0), 0);
        assert_eq!(budget(0.6), 1);
        assert_eq!(budget(-0.6), 1);
        assert_eq!(budget(1.0), 2);
    }

    #[test]
    fn test_buying_spends_budget_on_new_unions_only() {
        // 0 touches 1, 2, 3; a budget of 2 joins two of them.
        let mut graph = AdjacencyGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(0, 3);

        let mut sets = UnionFind::new(4);
        sets.union(0, 1);
        buy_neighbors(&graph, &[1.0, 0.0, 0.0, 0.0], &mut sets);

        assert!(sets.connected(0, 2));
        assert!(sets.connected(0, 3));
    }

    #[test]
    fn test_buying_stops_when_budget_is_spent() {
        // 0 touches 1..=4 and can afford two of them; 1 and 2 come first in id order.
        let mut graph = AdjacencyGraph::new(5);
        for neighbor in 1..5 {
            graph.add_edge(0, neighbor);
        }

        let mut sets = UnionFind::new(5);
        buy_neighbors(&graph, &[1.0, 0.0, 0.0, 0.0, 0.0], &mut sets);

        assert!(sets.connected(0, 1));
        assert!(sets.connected(0, 2));
        assert!(!sets.connected(0, 3));
        assert!(!sets.connected(0, 4));
        assert!(!sets.connected(3, 4));
        assert_eq!(sets.size(0), 3);
    }

    #[test]
    fn test_enclosed_piece_is_consumed() {
        // 1 and 2 are grouped; 0 only touches them.
        let mut graph = AdjacencyGraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(1, 2);

        let mut sets = UnionFind::new(3);
        sets.union(1, 2);
        consume_enclosed(&graph, &mut sets);

        assert!(sets.connected(0, 1));
    }

    #[test]
    fn test_singletons_pair_with_first_lone_neighbor() {
        let mut graph = AdjacencyGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(2, 3);

        let mut sets = UnionFind::new(4);
        merge_singletons(&graph, &mut sets);

        assert!(sets.connected(0, 1));
        assert!(sets.connected(2, 3));
        assert!(!sets.connected(0, 2));
    }

    #[test]
    fn test_land_spreads_one_hop() {
        // chain 0 - 1 - 2 with only 0 strong
        let mut graph = AdjacencyGraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);

        let land = decide_land(&graph, &[0.95, 0.1, 0.1]);
        assert_eq!(land, vec![true, true, false]);
    }

    #[test]
    fn test_gap_is_filled_only_across_groups() {
        // 0 is water, surrounded by land pieces 1 and 2.
        let mut graph = AdjacencyGraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);

        let mut sets = UnionFind::new(3);
        let mut land = vec![false, true, true];
        fill_gaps(&graph, &mut sets, &mut land);
        assert!(land[0]);

        let mut sets = UnionFind::new(3);
        sets.union(0, 1);
        let mut land = vec![false, true, true];
        fill_gaps(&graph, &mut sets, &mut land);
        assert!(!land[0]);
    }

    #[test]
    fn test_border_piece_becomes_water() {
        let noise = Tilemap::new_with(5, 5, 0.95f32);
        let mut data = MapData::new(5);
        let pieces = assign_pieces(&mut data, &noise).unwrap();
        build_continents(&mut data, &pieces);

        assert!(data.cells().iter().all(|(_, _, cell)| !cell.is_land()));
    }

    #[test]
    fn test_interior_island() {
        let noise = ring_map(7, 0.1, 0.95);
        let mut data = MapData::new(7);
        let pieces = assign_pieces(&mut data, &noise).unwrap();
        let continents = build_continents(&mut data, &pieces);

        assert_eq!(continents.land, vec![false, true]);
        assert!(!data.cell(0, 3).is_land());
        assert!(data.cell(3, 3).is_land());
        assert!((data.cell(3, 3).height - (0.95 * 0.05 + MINIMUM_LAND_HEIGHT)).abs() < 1e-6);
        assert!((data.cell(0, 0).height - (0.1 * 0.05 + AVERAGE_WATER_HEIGHT)).abs() < 1e-6);
    }

    #[test]
    fn test_cells_point_at_roots() {
        let noise = Tilemap::from_fn(12, 12, |x, y| ((x / 3) * 7 + (y / 2) * 3) as f32 / 40.0 - 0.5);
        let mut data = MapData::new(12);
        let pieces = assign_pieces(&mut data, &noise).unwrap();
        let piece_ids: Vec<usize> = data.cells().iter().map(|(_, _, c)| c.continent as usize).collect();

        let mut continents = build_continents(&mut data, &pieces);

        for ((_, _, cell), piece) in data.cells().iter().zip(piece_ids) {
            let root = continents.sets.find(piece);
            assert_eq!(cell.continent as usize, root);
            assert_eq!(continents.sets.find(root), root);
            assert!(continents.graph.get(cell.continent).is_some());
        }
    }
}

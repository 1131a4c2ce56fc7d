//! Continent drift and the effects at boundaries between continents.
//!
//! Each continent drifts along a unit vector picked from its noise value. Every
//! pair of touching cells from different continents is visited once (west and
//! north neighbours of a forward scan) and the boundary between the two
//! continents is classified once per continent pair. Height changes go into an
//! offset buffer that is applied after the scan.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::ops::{Add, Mul, Sub};

use crate::cell::{Conditions, StoneType};
use crate::data::MapData;
use crate::tilemap::Tilemap;

use super::graph::ContinentGraph;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Relative drift below this length makes a transform boundary.
const TRANSFORM_THRESHOLD: f32 = 0.5;
/// Divergent height change on land, per unit strength.
const LAND_OFFSET: f32 = -0.025;
/// Divergent height change on water, per unit strength.
const WATER_OFFSET: f32 = 0.05;
/// Convergent lifting of land cells along a ray, per unit strength.
const LAND_LIFTING: f32 = 0.7;
/// Convergent lifting of water cells along a ray, per unit strength.
const WATER_LIFTING: f32 = 0.05;
/// Sinking of the water side of a land/water convergent boundary.
const WATER_SINKING: f32 = -0.2;
/// Ray length in cells at full strength.
const RAY_LENGTH: f32 = 5.0;
/// Weight of each continent's drift in the ray direction.
const DRIFT_BIAS: f32 = 0.25;

/// 2D vector for drift and positions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self { x: 0.0, y: 0.0 }
        }
    }

    /// Unsigned angle to `other` in radians.
    pub fn angle_to(&self, other: &Vec2) -> f32 {
        let lengths = self.length() * other.length();
        if lengths <= 0.0 {
            return 0.0;
        }
        (self.dot(other) / lengths).clamp(-1.0, 1.0).acos()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

/// How two touching continents move relative to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryType {
    Transform,
    Divergent,
    Convergent,
}

/// Number of cell pairs handled per boundary type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryCounts {
    pub transform: usize,
    pub divergent: usize,
    pub convergent: usize,
}

impl BoundaryCounts {
    fn record(&mut self, boundary: BoundaryType) {
        match boundary {
            BoundaryType::Transform => self.transform += 1,
            BoundaryType::Divergent => self.divergent += 1,
            BoundaryType::Convergent => self.convergent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.transform + self.divergent + self.convergent
    }
}

/// Unit drift vector for a continent's noise value.
pub fn drift_direction(value: f32) -> Vec2 {
    let angle = value * PI;
    Vec2::new(angle.cos(), angle.sin())
}

/// Classify the boundary between cell `a` and cell `b`.
pub fn classify_boundary(drift_a: Vec2, drift_b: Vec2, position_a: Vec2, position_b: Vec2) -> BoundaryType {
    let relative_drift = drift_b - drift_a;
    if relative_drift.length() < TRANSFORM_THRESHOLD {
        return BoundaryType::Transform;
    }

    let relative_position = position_b - position_a;
    if relative_position.dot(&relative_drift) > 0.0 {
        BoundaryType::Divergent
    } else {
        BoundaryType::Convergent
    }
}

/// Apply drift interactions at every continent boundary.
pub fn simulate_tectonics(data: &mut MapData, continents: &ContinentGraph) -> BoundaryCounts {
    let width = data.width();

    let drifts: HashMap<i16, Vec2> = continents
        .iter()
        .map(|(id, node)| (id, drift_direction(node.value)))
        .collect();

    let mut boundaries: HashMap<(i16, i16), BoundaryType> = HashMap::new();
    let mut offsets = Tilemap::new_with(width, width, 0.0f32);
    let mut counts = BoundaryCounts::default();

    for y in 0..width {
        for x in 0..width {
            let mut neighbors = Vec::with_capacity(2);
            if x > 0 {
                neighbors.push((x - 1, y));
            }
            if y > 0 {
                neighbors.push((x, y - 1));
            }

            for (nx, ny) in neighbors {
                let continent_a = data.cell(x, y).continent;
                let continent_b = data.cell(nx, ny).continent;
                if continent_a == continent_b {
                    continue;
                }

                let drift_a = drifts.get(&continent_a).copied().unwrap_or_default();
                let drift_b = drifts.get(&continent_b).copied().unwrap_or_default();
                let position_a = Vec2::new(x as f32, y as f32);
                let position_b = Vec2::new(nx as f32, ny as f32);

                let key = (continent_a.min(continent_b), continent_a.max(continent_b));
                let boundary = *boundaries
                    .entry(key)
                    .or_insert_with(|| classify_boundary(drift_a, drift_b, position_a, position_b));
                counts.record(boundary);

                let pair = BoundaryPair {
                    a: (x, y),
                    b: (nx, ny),
                    drift_a,
                    drift_b,
                };

                match boundary {
                    BoundaryType::Transform => apply_transform(data, &pair),
                    BoundaryType::Divergent => apply_divergent(data, &mut offsets, &pair),
                    BoundaryType::Convergent => apply_convergent(data, &mut offsets, &pair),
                }
            }
        }
    }

    for (x, y, cell) in data.cells_mut().iter_mut() {
        cell.height += *offsets.get(x, y);
    }

    tracing::debug!(
        transform = counts.transform,
        divergent = counts.divergent,
        convergent = counts.convergent,
        continent_pairs = boundaries.len(),
        "Simulated tectonics"
    );

    counts
}

struct BoundaryPair {
    a: (usize, usize),
    b: (usize, usize),
    drift_a: Vec2,
    drift_b: Vec2,
}

impl BoundaryPair {
    fn strength(&self) -> f32 {
        self.drift_a.angle_to(&self.drift_b) / PI
    }

    fn drift_bias(&self) -> Vec2 {
        self.drift_a * DRIFT_BIAS + self.drift_b * DRIFT_BIAS
    }
}

fn position(cell: (usize, usize)) -> Vec2 {
    Vec2::new(cell.0 as f32, cell.1 as f32)
}

fn apply_transform(data: &mut MapData, pair: &BoundaryPair) {
    data.cell_mut(pair.a.0, pair.a.1).conditions |= Conditions::SEISMIC_ACTIVITY;
    data.cell_mut(pair.b.0, pair.b.1).conditions |= Conditions::SEISMIC_ACTIVITY;
}

fn apply_divergent(data: &mut MapData, offsets: &mut Tilemap<f32>, pair: &BoundaryPair) {
    let strength = pair.strength();
    let land_a = data.cell(pair.a.0, pair.a.1).is_land();
    let land_b = data.cell(pair.b.0, pair.b.1).is_land();

    for (x, y) in [pair.a, pair.b] {
        if land_a && land_b {
            data.cell_mut(x, y).conditions |= Conditions::RIFT;
        } else if !land_a && !land_b {
            let cell = data.cell_mut(x, y);
            cell.conditions |= Conditions::RIFT | Conditions::VULCANISM;
            cell.stone_type = StoneType::Granite;
        }
    }

    *offsets.get_mut(pair.a.0, pair.a.1) += strength * if land_a { LAND_OFFSET } else { WATER_OFFSET };
    *offsets.get_mut(pair.b.0, pair.b.1) += strength * if land_b { LAND_OFFSET } else { WATER_OFFSET };
}

fn apply_convergent(data: &mut MapData, offsets: &mut Tilemap<f32>, pair: &BoundaryPair) {
    let strength = pair.strength();
    let land_a = data.cell(pair.a.0, pair.a.1).is_land();
    let land_b = data.cell(pair.b.0, pair.b.1).is_land();

    match (land_a, land_b) {
        (true, true) => {
            let direction = position(pair.b) - position(pair.a) + pair.drift_bias();
            lift_along_ray(data, offsets, pair.a, direction, strength);
        }
        (true, false) | (false, true) => {
            let (land, water) = if land_a { (pair.a, pair.b) } else { (pair.b, pair.a) };

            *offsets.get_mut(water.0, water.1) += WATER_SINKING * strength;

            let cell = data.cell_mut(land.0, land.1);
            cell.conditions |= Conditions::VULCANISM;
            cell.stone_type = StoneType::Granite;

            let direction = position(land) - position(water) + pair.drift_bias();
            lift_along_ray(data, offsets, land, direction, strength);
        }
        (false, false) => {}
    }
}

/// Cells visited by a ray of `length` cells from `origin`, rounded to the grid.
/// Consecutive duplicates are dropped; cells outside the map are skipped.
pub fn ray_cells(width: usize, origin: (usize, usize), direction: Vec2, length: f32) -> Vec<(usize, usize)> {
    let direction = direction.normalize();
    let steps = length.max(0.0).floor() as i32;
    let mut cells = Vec::with_capacity(steps as usize + 1);
    let mut last = None;

    for step in 0..=steps {
        let px = (origin.0 as f32 + direction.x * step as f32).round() as i32;
        let py = (origin.1 as f32 + direction.y * step as f32).round() as i32;

        if last == Some((px, py)) {
            continue;
        }
        last = Some((px, py));

        if px < 0 || py < 0 || px >= width as i32 || py >= width as i32 {
            continue;
        }
        cells.push((px as usize, py as usize));
    }

    cells
}

fn lift_along_ray(data: &MapData, offsets: &mut Tilemap<f32>, origin: (usize, usize), direction: Vec2, strength: f32) {
    for (x, y) in ray_cells(data.width(), origin, direction, strength * RAY_LENGTH) {
        let lifting = if data.cell(x, y).is_land() {
            LAND_LIFTING
        } else {
            WATER_LIFTING
        };
        *offsets.get_mut(x, y) += lifting * strength;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::graph::AdjacencyGraph;
    use crate::union_find::UnionFind;

    /// Two continents split down the middle of a square map.
    fn split_map(width: usize, left_height: f32, right_height: f32, values: [f32; 2]) -> (MapData, ContinentGraph) {
        let mut data = MapData::new(width);
        for (x, _, cell) in data.cells_mut().iter_mut() {
            if x < width / 2 {
                cell.continent = 0;
                cell.height = left_height;
            } else {
                cell.continent = 1;
                cell.height = right_height;
            }
        }

        let mut graph = AdjacencyGraph::new(2);
        graph.add_edge(0, 1);
        let continents = graph.merge(&mut UnionFind::new(2), &values);
        (data, continents)
    }

    #[test]
    fn test_drift_is_unit_length() {
        for value in [-1.0, -0.3, 0.0, 0.42, 1.0] {
            assert!((drift_direction(value).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_classification() {
        let east = Vec2::new(1.0, 0.0);
        let west = Vec2::new(-1.0, 0.0);
        let origin = Vec2::new(0.0, 0.0);
        let right = Vec2::new(1.0, 0.0);

        assert_eq!(classify_boundary(east, east, origin, right), BoundaryType::Transform);
        // b moves away from a
        assert_eq!(classify_boundary(west, east, origin, right), BoundaryType::Divergent);
        // b moves towards a
        assert_eq!(classify_boundary(east, west, origin, right), BoundaryType::Convergent);
    }

    #[test]
    fn test_ray_skips_duplicates_and_outside_cells() {
        let cells = ray_cells(4, (2, 2), Vec2::new(1.0, 0.0), 3.0);
        assert_eq!(cells, vec![(2, 2), (3, 2)]);

        let cells = ray_cells(10, (1, 1), Vec2::new(1.0, 1.0), 2.0);
        assert_eq!(cells, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_transform_marks_both_sides() {
        // identical drift on both continents
        let (mut data, continents) = split_map(6, 0.1, 0.1, [0.25, 0.25]);
        let heights: Vec<f32> = data.cells().iter().map(|(_, _, c)| c.height).collect();

        let counts = simulate_tectonics(&mut data, &continents);

        assert_eq!(counts.transform, 6);
        assert!(data.cell(2, 0).conditions.contains(Conditions::SEISMIC_ACTIVITY));
        assert!(data.cell(3, 0).conditions.contains(Conditions::SEISMIC_ACTIVITY));
        assert!(!data.cell(0, 0).conditions.contains(Conditions::SEISMIC_ACTIVITY));
        let after: Vec<f32> = data.cells().iter().map(|(_, _, c)| c.height).collect();
        assert_eq!(heights, after);
    }

    #[test]
    fn test_divergent_water_becomes_volcanic_granite() {
        // Left drifts west (value 1 -> angle pi), right drifts east (value 0).
        // The scan sees a = right cell, b = left cell: b - a points west, relative drift is west.
        let (mut data, continents) = split_map(6, -0.1, -0.1, [1.0, 0.0]);
        let counts = simulate_tectonics(&mut data, &continents);

        assert_eq!(counts.divergent, 6);
        for y in 0..6 {
            for x in [2, 3] {
                let cell = data.cell(x, y);
                assert!(cell.conditions.contains(Conditions::RIFT | Conditions::VULCANISM));
                assert_eq!(cell.stone_type, StoneType::Granite);
                // full strength water offset
                assert!((cell.height - (-0.1 + WATER_OFFSET)).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_convergent_land_is_lifted_after_scan() {
        // Left drifts east, right drifts west: they collide.
        let (mut data, continents) = split_map(12, 0.1, 0.1, [0.0, 1.0]);
        let counts = simulate_tectonics(&mut data, &continents);

        assert_eq!(counts.convergent, 12);
        // The ray starts at the right-hand cell and heads west into the left continent.
        assert!(data.cell(6, 5).height > 0.1);
        assert!(data.cell(5, 5).height > 0.1);
        // Far from the boundary nothing changes.
        assert_eq!(data.cell(11, 5).height, 0.1);
        assert_eq!(data.cell(0, 5).height, 0.1);
    }

    #[test]
    fn test_pair_keeps_first_classification_when_met_reversed() {
        // Continent 1 covers x >= 2 and juts into (1, 1), so the scan meets the
        // pair both as (1, 0) and, from (1, 2) looking north, as (0, 1).
        let mut data = MapData::new(5);
        for (x, y, cell) in data.cells_mut().iter_mut() {
            cell.continent = if x >= 2 || (x, y) == (1, 1) { 1 } else { 0 };
            cell.height = 0.1;
        }
        let mut graph = AdjacencyGraph::new(2);
        graph.add_edge(0, 1);
        let continents = graph.merge(&mut UnionFind::new(2), &[1.0, 0.0]);

        // Classified fresh, the vertical contacts would be convergent.
        let west = drift_direction(1.0);
        let east = drift_direction(0.0);
        assert_eq!(
            classify_boundary(west, east, Vec2::new(1.0, 2.0), Vec2::new(1.0, 1.0)),
            BoundaryType::Convergent
        );

        let counts = simulate_tectonics(&mut data, &continents);

        assert_eq!(
            counts,
            BoundaryCounts {
                transform: 0,
                divergent: 7,
                convergent: 0
            }
        );
        assert_eq!(data.cell(1, 2).conditions, Conditions::RIFT);
    }

    #[test]
    fn test_divergent_land_only_rifts() {
        let (mut data, continents) = split_map(6, 0.1, 0.1, [1.0, 0.0]);
        let counts = simulate_tectonics(&mut data, &continents);

        assert_eq!(counts.divergent, 6);
        for y in 0..6 {
            for x in [2, 3] {
                let cell = data.cell(x, y);
                assert_eq!(cell.conditions, Conditions::RIFT);
                assert_eq!(cell.stone_type, StoneType::Sandstone);
                assert!((cell.height - (0.1 + LAND_OFFSET)).abs() < 1e-5);
            }
            assert_eq!(data.cell(0, y).conditions, Conditions::empty());
        }
    }

    #[test]
    fn test_convergent_ray_lifts_water_gently() {
        let (mut data, continents) = split_map(12, 0.1, 0.1, [0.0, 1.0]);
        // a lake on the left continent in the path of row 5's ray
        for x in 2..=4 {
            data.cell_mut(x, 5).height = -0.1;
        }

        simulate_tectonics(&mut data, &continents);

        for x in 2..=4 {
            assert!((data.cell(x, 5).height - (-0.1 + WATER_LIFTING)).abs() < 1e-5);
        }
        assert!((data.cell(5, 5).height - (0.1 + LAND_LIFTING)).abs() < 1e-5);
        assert!((data.cell(1, 5).height - (0.1 + LAND_LIFTING)).abs() < 1e-5);
        assert_eq!(data.cell(0, 5).height, 0.1);
    }

    #[test]
    fn test_mixed_convergent_sinks_water_and_marks_land() {
        let (mut data, continents) = split_map(12, 0.1, -0.1, [0.0, 1.0]);
        simulate_tectonics(&mut data, &continents);

        let land = data.cell(5, 5);
        assert!(land.conditions.contains(Conditions::VULCANISM));
        assert_eq!(land.stone_type, StoneType::Granite);
        assert!(data.cell(6, 5).height < -0.1);
    }
}

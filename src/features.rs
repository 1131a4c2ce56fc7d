//! Terrain feature detection: mountains, cliffs and coastlines.
//!
//! Runs after terrain and climate generation and only sets condition flags.

use crate::cell::{Conditions, Direction};
use crate::data::MapData;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Land at or above this height is mountainous.
pub const MOUNTAIN_HEIGHT_THRESHOLD: f32 = 0.2;
/// Height steps above this are too steep to walk.
pub const MAX_TOLERABLE_HEIGHT_DIFFERENCE: f32 = 0.04;

/// Number of cells carrying each feature after detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureCounts {
    pub mountainous: usize,
    pub cliffs: usize,
    pub coastline: usize,
}

/// Run all detectors in order: mountains, cliffs, coastlines.
pub fn detect_features(data: &mut MapData) -> FeatureCounts {
    detect_mountains(data);
    detect_cliffs(data);
    detect_coastlines(data);

    let mut counts = FeatureCounts::default();
    for (_, _, cell) in data.cells().iter() {
        if cell.conditions.contains(Conditions::MOUNTAINOUS) {
            counts.mountainous += 1;
        }
        if cell.has_cliff() {
            counts.cliffs += 1;
        }
        if cell.conditions.contains(Conditions::COASTLINE) {
            counts.coastline += 1;
        }
    }

    tracing::debug!(
        mountainous = counts.mountainous,
        cliffs = counts.cliffs,
        coastline = counts.coastline,
        "Detected features"
    );

    counts
}

/// Flag high land as mountainous and spread the flag down steep slopes.
///
/// A flagged cell flags each lower land neighbour that sits more than the
/// tolerable difference below it; that neighbour then becomes the reference for
/// its own neighbours.
pub fn detect_mountains(data: &mut MapData) {
    let width = data.width();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..width {
        for x in 0..width {
            let cell = data.cell(x, y);
            if !cell.is_land()
                || cell.height < MOUNTAIN_HEIGHT_THRESHOLD
                || cell.conditions.contains(Conditions::MOUNTAINOUS)
            {
                continue;
            }

            data.cell_mut(x, y).conditions |= Conditions::MOUNTAINOUS;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                let reference = data.cell(cx, cy).height;

                for (nx, ny) in data.cells().neighbors(cx, cy) {
                    let neighbor = data.cell(nx, ny);
                    if !neighbor.is_land()
                        || neighbor.conditions.contains(Conditions::MOUNTAINOUS)
                        || neighbor.height >= reference
                        || reference - neighbor.height <= MAX_TOLERABLE_HEIGHT_DIFFERENCE
                    {
                        continue;
                    }

                    data.cell_mut(nx, ny).conditions |= Conditions::MOUNTAINOUS;
                    stack.push((nx, ny));
                }
            }
        }
    }
}

/// Flag non-mountain land facing a steep rise. Only the first qualifying
/// direction in north, east, south, west order is flagged.
pub fn detect_cliffs(data: &mut MapData) {
    let width = data.width();

    for y in 0..width {
        for x in 0..width {
            let cell = *data.cell(x, y);
            if !cell.is_land() || cell.conditions.contains(Conditions::MOUNTAINOUS) {
                continue;
            }

            let cliff = Direction::ALL.into_iter().find(|direction| {
                let (dx, dy) = direction.offset();
                data.get_cell(x as i32 + dx, y as i32 + dy).is_some_and(|neighbor| {
                    cell.height <= neighbor.height
                        && (cell.height - neighbor.height).abs() > MAX_TOLERABLE_HEIGHT_DIFFERENCE
                })
            });

            if let Some(direction) = cliff {
                data.cell_mut(x, y).conditions |= direction.cliff_flag();
            }
        }
    }
}

/// Flag both cells of every land/water pair among the east, south and
/// south-east neighbours.
pub fn detect_coastlines(data: &mut MapData) {
    let width = data.width();

    for y in 0..width {
        for x in 0..width {
            let land = data.cell(x, y).is_land();

            for (nx, ny) in [(x + 1, y), (x, y + 1), (x + 1, y + 1)] {
                if nx >= width || ny >= width {
                    continue;
                }
                if data.cell(nx, ny).is_land() != land {
                    data.cell_mut(x, y).conditions |= Conditions::COASTLINE;
                    data.cell_mut(nx, ny).conditions |= Conditions::COASTLINE;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land_map(width: usize, height: f32) -> MapData {
        let mut data = MapData::new(width);
        for (_, _, cell) in data.cells_mut().iter_mut() {
            cell.height = height;
        }
        data
    }

    #[test]
    fn test_mountain_spreads_only_down_steep_slopes() {
        let mut data = land_map(5, 0.1);
        data.cell_mut(2, 2).height = 0.21;
        data.cell_mut(1, 2).height = 0.19;
        data.cell_mut(3, 2).height = 0.15;

        detect_mountains(&mut data);

        assert!(data.cell(2, 2).conditions.contains(Conditions::MOUNTAINOUS));
        assert!(!data.cell(1, 2).conditions.contains(Conditions::MOUNTAINOUS));
        assert!(data.cell(3, 2).conditions.contains(Conditions::MOUNTAINOUS));
        // 0.15 -> 0.1 is 0.05, steep enough to keep spreading
        assert!(data.cell(4, 2).conditions.contains(Conditions::MOUNTAINOUS));
        // the lower ground north of the peak is steep enough too
        assert!(data.cell(2, 1).conditions.contains(Conditions::MOUNTAINOUS));
    }

    #[test]
    fn test_mountain_ignores_water() {
        let mut data = land_map(3, -0.1);
        data.cell_mut(1, 1).height = 0.5;
        detect_mountains(&mut data);

        assert!(data.cell(1, 1).conditions.contains(Conditions::MOUNTAINOUS));
        assert!(!data.cell(0, 1).conditions.contains(Conditions::MOUNTAINOUS));
    }

    #[test]
    fn test_large_mountain_range() {
        let width = 400;
        let mut data = MapData::new(width);
        for (x, y, cell) in data.cells_mut().iter_mut() {
            cell.height = 50.0 - 0.05 * (y * width + x) as f32;
        }
        detect_mountains(&mut data);

        for (_, _, cell) in data.cells().iter() {
            assert_eq!(cell.is_land(), cell.conditions.contains(Conditions::MOUNTAINOUS));
        }
    }

    #[test]
    fn test_cliff_first_direction_wins() {
        let mut data = land_map(3, 0.05);
        // north and west both rise
        data.cell_mut(1, 0).height = 0.15;
        data.cell_mut(0, 1).height = 0.15;

        detect_cliffs(&mut data);

        let center = data.cell(1, 1).conditions;
        assert!(center.contains(Conditions::CLIFF_NORTH));
        assert!(!center.contains(Conditions::CLIFF_WEST));
    }

    #[test]
    fn test_cliff_needs_steep_rise() {
        let mut data = land_map(3, 0.05);
        data.cell_mut(1, 0).height = 0.08;
        detect_cliffs(&mut data);
        assert!(!data.cell(1, 1).has_cliff());
    }

    #[test]
    fn test_mountains_have_no_cliffs() {
        let mut data = land_map(3, 0.3);
        data.cell_mut(1, 0).height = 0.5;
        detect_mountains(&mut data);
        detect_cliffs(&mut data);
        assert!(!data.cell(1, 1).has_cliff());
    }

    #[test]
    fn test_coastline_flags_are_symmetric() {
        let mut data = land_map(6, -0.1);
        data.cell_mut(2, 2).height = 0.1;
        data.cell_mut(3, 2).height = 0.1;
        data.cell_mut(2, 3).height = 0.1;

        detect_coastlines(&mut data);

        let width = data.width();
        for y in 0..width {
            for x in 0..width {
                let land = data.cell(x, y).is_land();
                for (nx, ny) in [(x + 1, y), (x, y + 1), (x + 1, y + 1)] {
                    if nx < width && ny < width && data.cell(nx, ny).is_land() != land {
                        assert!(data.cell(x, y).conditions.contains(Conditions::COASTLINE));
                        assert!(data.cell(nx, ny).conditions.contains(Conditions::COASTLINE));
                    }
                }
            }
        }
        assert!(!data.cell(5, 5).conditions.contains(Conditions::COASTLINE));
    }
}

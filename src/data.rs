//! Map grid storage and the block ↔ cell coordinate contract.

use crate::cell::Cell;
use crate::tilemap::Tilemap;

/// Side length of a macro cell in blocks.
pub const CELL_SIZE: i32 = 200;

/// Spacing of the sub-biome grid in blocks.
pub const SUB_BIOME_GRID_SIZE: i32 = CELL_SIZE / 10;

/// Serialized format version of [`MapData`].
pub const CURRENT_VERSION: u32 = 1;

/// Default half extent of the world in blocks.
pub const DEFAULT_BLOCK_LIMIT: i32 = 50_000;

/// Grid side length needed for a world spanning `[-block_limit, block_limit)` on both axes.
///
/// The covered region is rounded up to an even number of cells and then padded
/// with a one-cell border, so every valid world column maps strictly inside the grid.
pub fn width_for_block_limit(block_limit: i32) -> usize {
    let covered = (2 * block_limit.max(1) + CELL_SIZE - 1) / CELL_SIZE;
    let covered = covered + covered % 2;
    covered as usize + 2
}

/// The dense cell grid of a generated or loaded map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapData {
    cells: Tilemap<Cell>,
}

impl MapData {
    /// A square grid of default (water, zero-height) cells.
    pub fn new(width: usize) -> Self {
        Self {
            cells: Tilemap::new(width, width),
        }
    }

    /// Rebuild from a flat row-major cell list. Returns `None` if the length is not `width²`.
    pub fn from_cells(width: usize, cells: Vec<Cell>) -> Option<Self> {
        Tilemap::from_vec(width, width, cells).map(|cells| Self { cells })
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.cells.get(x, y)
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        self.cells.get_mut(x, y)
    }

    /// Bounds-checked access with signed cell coordinates.
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get_checked(x, y)
    }

    pub fn cells(&self) -> &Tilemap<Cell> {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut Tilemap<Cell> {
        &mut self.cells
    }

    /// Cell coordinate containing a block coordinate (floor division, then recentred).
    pub fn block_to_cell(&self, block: i32) -> i32 {
        block.div_euclid(CELL_SIZE) + (self.width() / 2) as i32
    }

    /// Block coordinate of the centre of a cell.
    pub fn cell_center_block(&self, cell: i32) -> i32 {
        (cell - (self.width() / 2) as i32) * CELL_SIZE + CELL_SIZE / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_world_width() {
        assert_eq!(width_for_block_limit(DEFAULT_BLOCK_LIMIT), 502);
    }

    #[test]
    fn test_width_stays_even() {
        assert_eq!(width_for_block_limit(50_100) % 2, 0);
        assert_eq!(width_for_block_limit(1) % 2, 0);
    }

    #[test]
    fn test_valid_columns_map_inside_border() {
        for limit in [1_000, 50_000, 50_100, 12_345] {
            let data = MapData::new(width_for_block_limit(limit));
            let last = data.width() as i32 - 1;

            for block in [-limit, -limit + 1, -1, 0, limit - 1] {
                let cell = data.block_to_cell(block);
                assert!(cell >= 1 && cell < last, "block {block} -> cell {cell} (limit {limit})");
            }
        }
    }

    #[test]
    fn test_negative_blocks_round_down() {
        let data = MapData::new(502);
        assert_eq!(data.block_to_cell(-1), 250);
        assert_eq!(data.block_to_cell(0), 251);
        assert_eq!(data.block_to_cell(-200), 250);
        assert_eq!(data.block_to_cell(-201), 249);
    }

    #[test]
    fn test_cell_center_round_trip() {
        let data = MapData::new(502);
        for cell in [1, 100, 251, 500] {
            assert_eq!(data.block_to_cell(data.cell_center_block(cell)), cell);
        }
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(MapData::from_cells(3, vec![Cell::default(); 8]).is_none());
        assert!(MapData::from_cells(3, vec![Cell::default(); 9]).is_some());
    }
}

use crate::data::MapData;
use crate::tilemap::Tilemap;

/// Spread part of every coastal land cell's height into its water neighbours.
///
/// A land cell with water among its 8 neighbours gives up
/// `height * spread_factor(stone)` and shares it evenly across those neighbours.
/// Offsets are collected first and applied once the scan is complete.
/// Returns the number of land cells that gave up height.
pub fn spread_coastline_height(data: &mut MapData) -> usize {
    let width = data.width();
    let mut offsets = Tilemap::new_with(width, width, 0.0f32);
    let mut sources = 0;

    for y in 0..width {
        for x in 0..width {
            let cell = data.cell(x, y);
            if !cell.is_land() {
                continue;
            }

            let ocean: Vec<(usize, usize)> = data
                .cells()
                .neighbors_8(x, y)
                .into_iter()
                .filter(|&(nx, ny)| !data.cell(nx, ny).is_land())
                .collect();
            if ocean.is_empty() {
                continue;
            }

            let available = cell.height * cell.stone_type.spread_factor();
            let share = available / ocean.len() as f32;

            for (nx, ny) in ocean {
                *offsets.get_mut(nx, ny) += share;
            }
            *offsets.get_mut(x, y) -= available;
            sources += 1;
        }
    }

    for (x, y, cell) in data.cells_mut().iter_mut() {
        cell.height += *offsets.get(x, y);
    }

    tracing::debug!(sources, "Spread coastline height");
    sources
}

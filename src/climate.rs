//! Climate fields: temperature from distance to the map centre, humidity from
//! noise and proximity to water.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::data::MapData;
use crate::noise::{NoiseDefinition, NoiseGenerator};
use crate::tilemap::Tilemap;

// =============================================================================
// TEMPERATURE
// =============================================================================

/// Control points of the radial temperature curve.
const TEMPERATURE_CURVE: [(f32, f32); 4] = [(0.0, 0.0), (0.2, 0.4), (0.8, 0.6), (1.0, 1.0)];

/// Angular wobble amplitude relative to the radial scale.
const WOBBLE_AMPLITUDE: f32 = 0.02;

/// Piecewise-linear curve through `points`, clamped to the first and last point.
pub fn evaluate_curve(points: &[(f32, f32)], x: f32) -> f32 {
    let Some(&(first_x, first_y)) = points.first() else {
        return x;
    };
    if x <= first_x {
        return first_y;
    }

    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 1.0 };
            return y0 + (y1 - y0) * t;
        }
    }

    points.last().map_or(x, |&(_, y)| y)
}

/// Temperature in `[0, 1]` of cell `(x, y)` on a `width`-wide map.
pub fn temperature_at(x: usize, y: usize, width: usize) -> f32 {
    let center = width as f32 / 2.0;
    let dx = x as f32 - center;
    let dy = y as f32 - center;

    let distance = (dx * dx + dy * dy).sqrt();
    let angle = dy.atan2(dx);

    let scale = distance / width as f32 * 2.0;
    let offset = (angle * 20.0).sin() + (angle * 15.0).cos().powi(3);
    let amplitude = scale * WOBBLE_AMPLITUDE;

    evaluate_curve(&TEMPERATURE_CURVE, scale + offset * amplitude).clamp(0.0, 1.0)
}

/// Fill every cell's temperature. Rows are computed in parallel.
pub fn generate_temperature(data: &mut MapData) {
    let width = data.width();

    data.cells_mut()
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                cell.temperature = temperature_at(x, y, width);
            }
        });
}

// =============================================================================
// HUMIDITY
// =============================================================================

/// Frequency of the humidity noise.
pub const HUMIDITY_FREQUENCY: f32 = 0.01;
/// Octaves of the humidity noise.
const HUMIDITY_OCTAVES: u32 = 4;
/// Weight of the noise term; the water proximity term gets the rest.
const HUMIDITY_NOISE_WEIGHT: f32 = 0.6;
/// Distance in cells at which water stops adding humidity.
const WATER_REACH: f32 = 24.0;

pub fn humidity_noise_definition() -> NoiseDefinition {
    NoiseDefinition::gradient(HUMIDITY_FREQUENCY).with_fractal(HUMIDITY_OCTAVES, 2.0, 0.5)
}

/// Distance in 4-connected steps from every cell to the nearest water cell.
/// Maps without water get `u32::MAX` everywhere.
pub fn water_distance(data: &MapData) -> Tilemap<u32> {
    let width = data.width();
    let mut distance = Tilemap::new_with(width, width, u32::MAX);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for (x, y, cell) in data.cells().iter() {
        if !cell.is_land() {
            distance.set(x, y, 0);
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let next = *distance.get(x, y) + 1;
        for (nx, ny) in distance.neighbors(x, y) {
            if next < *distance.get(nx, ny) {
                distance.set(nx, ny, next);
                queue.push_back((nx, ny));
            }
        }
    }

    distance
}

/// Humidity from a noise value in `[-1, 1]` and a distance to water in cells.
pub fn humidity_value(noise: f32, distance: u32) -> f32 {
    let noise = (noise + 1.0) * 0.5;
    let proximity = 1.0 - (distance as f32).min(WATER_REACH) / WATER_REACH;
    (HUMIDITY_NOISE_WEIGHT * noise + (1.0 - HUMIDITY_NOISE_WEIGHT) * proximity).clamp(0.0, 1.0)
}

/// Fill every cell's humidity.
pub fn generate_humidity(data: &mut MapData, noise: &dyn NoiseGenerator) {
    let width = data.width();
    let values = noise.get_noise_grid((0, 0), width, width);
    let distance = water_distance(data);

    for (x, y, cell) in data.cells_mut().iter_mut() {
        cell.humidity = humidity_value(*values.get(x, y), *distance.get(x, y));
    }
}

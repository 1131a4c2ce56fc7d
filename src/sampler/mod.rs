//! Query-time sampling of a generated map at world block columns.
//!
//! A [`Sampler`] borrows the finished cell grid and never mutates it, so any
//! number of samplers can run concurrently. Continuous values (height,
//! temperature, humidity) blend the four surrounding macro cells exactly. Discrete
//! choices (biome, sub-biome, stone) pick a weighted winner after a small
//! per-position noise nudge so that borders do not follow the grid.

pub mod blend;
pub mod tint;

use std::collections::HashMap;

use crate::biome::{BiomeDistribution, BiomeId, SubBiomeId};
use crate::cell::{Cell, Conditions, Direction, StoneType};
use crate::data::{MapData, CELL_SIZE, SUB_BIOME_GRID_SIZE};
use crate::noise::{Noise, NoiseDefinition, NoiseFactory, NoiseGenerator};

use blend::{lerp, GridBlend};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Frequency of the blend offset noise, in blocks.
const BLEND_NOISE_FREQUENCY: f32 = 0.02;
/// Largest blend offset in grid units.
const BLEND_NOISE_SCALE: f32 = 0.2;
/// Frequency of the sub-biome selection noise, in sub-biome grid points.
const SUB_BIOME_NOISE_FREQUENCY: f32 = 0.1;
/// Frequency of the stone offset noise, in blocks.
const STONE_NOISE_FREQUENCY: f32 = 0.05;
/// Largest stone blend offset.
const STONE_NOISE_SCALE: f32 = 0.2;

/// Blended cliff strength at which the cliff reconstruction starts.
const CLIFF_STRENGTH_THRESHOLD: f32 = 0.5;
/// Cliff tops are drawn slightly below the higher neighbour.
const CLIFF_HEIGHT_SCALE: f32 = 0.95;

/// Cliff directions that face into the quad, per corner in blend order.
const QUAD_CLIFF_FLAGS: [Conditions; 4] = [
    Conditions::CLIFF_EAST.union(Conditions::CLIFF_SOUTH),
    Conditions::CLIFF_WEST.union(Conditions::CLIFF_SOUTH),
    Conditions::CLIFF_EAST.union(Conditions::CLIFF_NORTH),
    Conditions::CLIFF_WEST.union(Conditions::CLIFF_NORTH),
];

/// Temperature in °C of a normalized temperature of zero at sea level.
const MIN_CELSIUS: f32 = -10.0;
/// Width of the sea level temperature range in °C.
const CELSIUS_RANGE: f32 = 45.0;
/// Cooling in °C per 1000 blocks above sea level.
const LAPSE_RATE: f32 = 6.5;

// =============================================================================
// NOISE
// =============================================================================

/// Noise generators owned by the map for sampling.
pub struct SamplingNoise {
    pub blend_x: Noise,
    pub blend_z: Noise,
    pub sub_biome: Noise,
    pub stone: Noise,
}

impl SamplingNoise {
    /// Create the sampling generators. Always takes four generators from the factory.
    pub fn new(factory: &mut NoiseFactory) -> Self {
        Self {
            blend_x: factory.create(NoiseDefinition::gradient(BLEND_NOISE_FREQUENCY)),
            blend_z: factory.create(NoiseDefinition::gradient(BLEND_NOISE_FREQUENCY)),
            sub_biome: factory.create(NoiseDefinition::gradient(SUB_BIOME_NOISE_FREQUENCY)),
            stone: factory.create(NoiseDefinition::gradient(STONE_NOISE_FREQUENCY)),
        }
    }
}

/// Which sampling noise a cached value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoiseChannel {
    BlendX,
    BlendZ,
    SubBiome,
    Stone,
}

/// Optional cache of noise values for a batch of queries over the same area.
#[derive(Debug, Default)]
pub struct NoiseStore {
    values: HashMap<(NoiseChannel, i32, i32), f32>,
}

impl NoiseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get_or_insert_with(&mut self, channel: NoiseChannel, x: i32, z: i32, f: impl FnOnce() -> f32) -> f32 {
        *self.values.entry((channel, x, z)).or_insert_with(f)
    }
}

struct NoiseLookup<'s> {
    store: Option<&'s mut NoiseStore>,
}

impl NoiseLookup<'_> {
    fn get(&mut self, channel: NoiseChannel, generator: &dyn NoiseGenerator, x: i32, z: i32) -> f32 {
        match self.store.as_deref_mut() {
            Some(store) => store.get_or_insert_with(channel, x, z, || generator.get_noise(x, z)),
            None => generator.get_noise(x, z),
        }
    }
}

// =============================================================================
// SAMPLE
// =============================================================================

/// Map values at one world column.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub height: f32,
    /// Normalized temperature in `[0, 1]`.
    pub temperature: f32,
    pub humidity: f32,
    /// Any of the four surrounding macro cells has an oceanic biome.
    pub is_oceanic: bool,
    pub biome: BiomeId,
    /// Sub-biome candidates of the four surrounding sub-biome grid points.
    pub sub_biomes: [Option<SubBiomeId>; 4],
    pub sub_biome_blend: (f32, f32),
    pub sub_biome: Option<SubBiomeId>,
    /// Sub-biome of the water surface, only set where the column is oceanic.
    pub oceanic_sub_biome: Option<SubBiomeId>,
    /// Stone types of the four surrounding macro cells.
    pub stones: [StoneType; 4],
    pub stone_blend: (f32, f32),
}

/// Normalized temperature to °C at block height `y`.
pub fn celsius(temperature: f32, y: i32) -> f32 {
    let altitude = y.max(0) as f32 / 1000.0;
    MIN_CELSIUS + CELSIUS_RANGE * temperature - LAPSE_RATE * altitude
}

/// Read-only view used to answer queries.
pub struct Sampler<'a> {
    data: &'a MapData,
    biomes: &'a dyn BiomeDistribution,
    noise: &'a SamplingNoise,
}

impl<'a> Sampler<'a> {
    pub fn new(data: &'a MapData, biomes: &'a dyn BiomeDistribution, noise: &'a SamplingNoise) -> Self {
        Self { data, biomes, noise }
    }

    /// Sample the column at block coordinates `(x, z)`.
    pub fn sample(&self, x: i32, z: i32, store: Option<&mut NoiseStore>) -> Sample {
        let mut noise = NoiseLookup { store };
        let half = (self.data.width() / 2) as i32;

        let exact = GridBlend::new(x, z, CELL_SIZE);
        let cells = self.corner_cells(&exact, half);

        let temperature = exact.interpolate(cells.map(|cell| cell.temperature));
        let humidity = exact.interpolate(cells.map(|cell| cell.humidity));
        let height = self.height(&exact, half);

        let is_oceanic = cells
            .iter()
            .any(|cell| self.biomes.definition(self.biomes.determine_biome(cell)).is_oceanic);

        let dx = noise.get(NoiseChannel::BlendX, &self.noise.blend_x, x, z) * BLEND_NOISE_SCALE;
        let dz = noise.get(NoiseChannel::BlendZ, &self.noise.blend_z, x, z) * BLEND_NOISE_SCALE;

        let shifted = exact.with_offset(dx, dz);
        let biome = shifted.select(
            self.corner_cells(&shifted, half)
                .map(|cell| self.biomes.determine_biome(cell)),
        );

        let fine = GridBlend::new(x, z, SUB_BIOME_GRID_SIZE).with_offset(dx, dz);
        let mut sub_biomes = [None; 4];
        let mut oceanic_sub_biomes = [None; 4];

        for (i, (gx, gz)) in fine.corners().into_iter().enumerate() {
            let value = (noise.get(NoiseChannel::SubBiome, &self.noise.sub_biome, gx, gz) + 1.0) * 0.5;
            let center_x = gx.saturating_mul(SUB_BIOME_GRID_SIZE).saturating_add(SUB_BIOME_GRID_SIZE / 2);
            let center_z = gz.saturating_mul(SUB_BIOME_GRID_SIZE).saturating_add(SUB_BIOME_GRID_SIZE / 2);

            let cell = self.cell_at(self.data.block_to_cell(center_x), self.data.block_to_cell(center_z));
            let point_biome = self.biomes.determine_biome(cell);

            sub_biomes[i] = self.biomes.choose_sub_biome(point_biome, value);
            oceanic_sub_biomes[i] = self.biomes.choose_oceanic_sub_biome(point_biome, value);
        }

        Sample {
            height,
            temperature,
            humidity,
            is_oceanic,
            biome,
            sub_biomes,
            sub_biome_blend: fine.t,
            sub_biome: fine.select(sub_biomes),
            oceanic_sub_biome: if is_oceanic {
                fine.select(oceanic_sub_biomes)
            } else {
                None
            },
            stones: cells.map(|cell| cell.stone_type),
            stone_blend: exact.t,
        }
    }

    /// Stone type at block `(x, y, z)` of a column sampled into `sample`.
    pub fn stone_type(&self, x: i32, y: i32, z: i32, sample: &Sample, store: Option<&mut NoiseStore>) -> StoneType {
        let stones = sample.stones;
        if stones.iter().all(|&stone| stone == stones[0]) {
            return stones[0];
        }

        let mut noise = NoiseLookup { store };
        let u = x.wrapping_add(y);
        let v = z.wrapping_sub(y);
        let dx = noise.get(NoiseChannel::Stone, &self.noise.stone, u, v) * STONE_NOISE_SCALE;
        let dz = noise.get(NoiseChannel::Stone, &self.noise.stone, v, u) * STONE_NOISE_SCALE;

        GridBlend {
            origin: (0, 0),
            t: sample.stone_blend,
        }
        .with_clamped_offset(dx, dz)
        .select(stones)
    }

    /// Temperature in °C at block `(x, y, z)`.
    pub fn temperature(&self, x: i32, y: i32, z: i32, store: Option<&mut NoiseStore>) -> f32 {
        celsius(self.sample(x, z, store).temperature, y)
    }

    /// Block and fluid tint at column `(x, z)`.
    pub fn position_tint(&self, x: i32, z: i32, store: Option<&mut NoiseStore>) -> ((u8, u8, u8), (u8, u8, u8)) {
        let sample = self.sample(x, z, store);
        (
            tint::block_tint(sample.temperature, sample.humidity),
            tint::fluid_tint(sample.temperature),
        )
    }

    fn clamp_cell(&self, x: i32, y: i32) -> (usize, usize) {
        let last = self.data.width() as i32 - 1;
        (x.clamp(0, last) as usize, y.clamp(0, last) as usize)
    }

    fn cell_at(&self, x: i32, y: i32) -> &'a Cell {
        let (x, y) = self.clamp_cell(x, y);
        self.data.cell(x, y)
    }

    fn corner_cells(&self, blend: &GridBlend, half: i32) -> [&'a Cell; 4] {
        blend.corners().map(|(cx, cz)| self.cell_at(cx + half, cz + half))
    }

    /// Bilinear height, replaced by a cliff reconstruction where cliff flags
    /// inside the quad dominate.
    fn height(&self, blend: &GridBlend, half: i32) -> f32 {
        let coords = blend.corners().map(|(cx, cz)| self.clamp_cell(cx + half, cz + half));
        let cells = coords.map(|(cx, cz)| self.data.cell(cx, cz));
        let default_height = blend.interpolate(cells.map(|cell| cell.height));

        if !cells.iter().any(|cell| cell.has_cliff()) {
            return default_height;
        }

        let mut strengths = [0.0f32; 4];
        for (i, cell) in cells.iter().enumerate() {
            if cell.conditions.intersects(QUAD_CLIFF_FLAGS[i]) {
                strengths[i] = 1.0;
            }
        }

        let strength = blend.interpolate(strengths);
        if strength < CLIFF_STRENGTH_THRESHOLD {
            return default_height;
        }
        let strength = (strength - CLIFF_STRENGTH_THRESHOLD) / (1.0 - CLIFF_STRENGTH_THRESHOLD);

        let cliff_height = blend.interpolate(coords.map(|(cx, cz)| self.cliff_height(cx, cz)));
        lerp(default_height, cliff_height, strength)
    }

    /// Height of a cliff top seen from cell `(x, y)`.
    fn cliff_height(&self, x: usize, y: usize) -> f32 {
        let cell = self.data.cell(x, y);
        let mut height = cell.height;

        for direction in Direction::ALL {
            if !cell.conditions.contains(direction.cliff_flag()) {
                continue;
            }
            let (dx, dy) = direction.offset();
            if let Some(neighbor) = self.data.get_cell(x as i32 + dx, y as i32 + dy) {
                height = height.max(neighbor.height);
            }
        }

        height * CLIFF_HEIGHT_SCALE
    }
}

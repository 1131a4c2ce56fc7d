//! Deterministic 2D noise for map generation and sampling.
//!
//! Generators are created by a [`NoiseFactory`] that owns the master seed and
//! hands every generator its own seed in creation order. Two factories with the
//! same master seed produce identical generators as long as generators are
//! requested in the same order.

use noise::{NoiseFn, OpenSimplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::tilemap::Tilemap;

/// Source of deterministic noise values in `[-1, 1]` keyed by integer positions.
pub trait NoiseGenerator: Send + Sync {
    /// Noise value at a single integer position.
    fn get_noise(&self, x: i32, y: i32) -> f32;

    /// Noise values for a `width × height` region starting at `origin`.
    /// Cell `(i, j)` of the result holds the value at `origin + (i, j)`.
    fn get_noise_grid(&self, origin: (i32, i32), width: usize, height: usize) -> Tilemap<f32> {
        let mut values = vec![0.0f32; width * height];

        if width > 0 {
            values.par_chunks_mut(width).enumerate().for_each(|(j, row)| {
                for (i, value) in row.iter_mut().enumerate() {
                    *value = self.get_noise(origin.0 + i as i32, origin.1 + j as i32);
                }
            });
        }

        Tilemap::from_vec(width, height, values).unwrap_or_else(|| Tilemap::new(width, height))
    }
}

/// Base noise function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseKind {
    /// Smooth gradient noise.
    Gradient,
    /// Cellular noise returning one constant value per cell.
    Cellular,
}

/// Fractal (fBm) layering parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fractal {
    pub octaves: u32,
    pub lacunarity: f32,
    pub gain: f32,
}

/// Everything needed to build a generator except its seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseDefinition {
    pub kind: NoiseKind,
    pub frequency: f32,
    pub fractal: Option<Fractal>,
}

impl NoiseDefinition {
    pub fn gradient(frequency: f32) -> Self {
        Self {
            kind: NoiseKind::Gradient,
            frequency,
            fractal: None,
        }
    }

    pub fn cellular(frequency: f32) -> Self {
        Self {
            kind: NoiseKind::Cellular,
            frequency,
            fractal: None,
        }
    }

    pub fn with_fractal(mut self, octaves: u32, lacunarity: f32, gain: f32) -> Self {
        self.fractal = Some(Fractal {
            octaves,
            lacunarity,
            gain,
        });
        self
    }
}

/// Creates generators with reproducible per-instance seeds.
pub struct NoiseFactory {
    master_seed: u64,
    rng: ChaCha8Rng,
    created: usize,
}

impl NoiseFactory {
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            rng: ChaCha8Rng::seed_from_u64(master_seed),
            created: 0,
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Number of generators handed out so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Create the next generator. The seed depends only on the master seed and
    /// how many generators were created before.
    pub fn create(&mut self, definition: NoiseDefinition) -> Noise {
        let seed: u32 = self.rng.gen();
        self.created += 1;
        Noise::new(seed, definition)
    }
}

enum Source {
    Gradient(OpenSimplex),
    Cellular(CellularValue),
}

impl Source {
    fn get(&self, x: f64, y: f64) -> f64 {
        match self {
            Source::Gradient(noise) => noise.get([x, y]),
            Source::Cellular(noise) => noise.get([x, y]),
        }
    }
}

/// Concrete generator backed by the `noise` crate.
pub struct Noise {
    seed: u32,
    definition: NoiseDefinition,
    source: Source,
}

impl Noise {
    pub fn new(seed: u32, definition: NoiseDefinition) -> Self {
        let source = match definition.kind {
            NoiseKind::Gradient => Source::Gradient(OpenSimplex::new(seed)),
            NoiseKind::Cellular => Source::Cellular(CellularValue { seed }),
        };

        Self {
            seed,
            definition,
            source,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn definition(&self) -> &NoiseDefinition {
        &self.definition
    }
}

impl NoiseGenerator for Noise {
    fn get_noise(&self, x: i32, y: i32) -> f32 {
        let frequency = self.definition.frequency as f64;
        let px = x as f64 * frequency;
        let py = y as f64 * frequency;

        let value = match self.definition.fractal {
            Some(fractal) => fbm(
                &self.source,
                px,
                py,
                fractal.octaves.max(1),
                fractal.gain as f64,
                fractal.lacunarity as f64,
            ),
            None => self.source.get(px, py),
        };

        value.clamp(-1.0, 1.0) as f32
    }
}

/// Fractional Brownian Motion - layers multiple octaves of noise for self-similar detail.
fn fbm(source: &Source, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * source.get(x * frequency, y * frequency);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Share of a unit cell a feature point may wander from the cell centre.
const CELL_JITTER: f64 = 0.9;

/// Cellular value noise: every position takes the value of its nearest feature
/// point, so the plane is partitioned into regions of equal value.
///
/// Values carry 24 bits of resolution. The `noise` crate's Worley value mode
/// only yields 256 distinct values, too few to keep regions apart.
struct CellularValue {
    seed: u32,
}

impl NoiseFn<f64, 2> for CellularValue {
    fn get(&self, point: [f64; 2]) -> f64 {
        let [x, y] = point;
        let cell_x = x.floor() as i64;
        let cell_y = y.floor() as i64;

        let mut best_distance = f64::MAX;
        let mut best_cell = (cell_x, cell_y);

        for dy in -1..=1 {
            for dx in -1..=1 {
                let gx = cell_x + dx;
                let gy = cell_y + dy;

                let fx = gx as f64 + 0.5 + (unit(hash_cell(gx, gy, self.seed, 0)) - 0.5) * CELL_JITTER;
                let fy = gy as f64 + 0.5 + (unit(hash_cell(gx, gy, self.seed, 1)) - 0.5) * CELL_JITTER;

                let distance = (fx - x) * (fx - x) + (fy - y) * (fy - y);
                if distance < best_distance {
                    best_distance = distance;
                    best_cell = (gx, gy);
                }
            }
        }

        unit(hash_cell(best_cell.0, best_cell.1, self.seed, 2)) * 2.0 - 1.0
    }
}

fn hash_cell(x: i64, y: i64, seed: u32, salt: u64) -> u64 {
    let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (seed as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
        ^ salt.wrapping_mul(0x27D4_EB2F_1656_67C5);

    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^= h >> 33;
    h
}

/// Top 24 bits of a hash as a value in `[0, 1)`.
fn unit(hash: u64) -> f64 {
    (hash >> 40) as f64 / (1u64 << 24) as f64
}

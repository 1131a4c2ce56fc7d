//! Four-corner grid blending shared by height, climate, biome, sub-biome and
//! stone sampling.
//!
//! Grid point `i` of a grid with spacing `size` is centred on block
//! `i * size + size / 2`. A position is surrounded by the four grid points whose
//! centres bound it, and `t` is its fractional offset from corner `00`.

/// Corner order used throughout: `00`, `10` (+x), `01` (+z), `11`.
pub const CORNER_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Four grid points around a position and the blend factors between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridBlend {
    /// Grid coordinates of corner `00`.
    pub origin: (i32, i32),
    /// Blend factors in `[0, 1]` towards the `+x` and `+z` corners.
    pub t: (f32, f32),
}

impl GridBlend {
    /// Blend for block position `(x, z)` on a grid with spacing `size`.
    pub fn new(x: i32, z: i32, size: i32) -> Self {
        let (x0, tx) = axis(x, size);
        let (z0, tz) = axis(z, size);
        Self {
            origin: (x0, z0),
            t: (tx, tz),
        }
    }

    /// Shift the blend by an offset in grid units (expected within ±1).
    /// A factor pushed outside `[0, 1]` moves the corners one step and wraps back.
    pub fn with_offset(&self, dx: f32, dz: f32) -> Self {
        let (x0, tx) = realign(self.origin.0, self.t.0 + dx);
        let (z0, tz) = realign(self.origin.1, self.t.1 + dz);
        Self {
            origin: (x0, z0),
            t: (tx, tz),
        }
    }

    /// Same corners, with blend factors nudged and clamped to `[0, 1]`.
    pub fn with_clamped_offset(&self, dx: f32, dz: f32) -> Self {
        Self {
            origin: self.origin,
            t: ((self.t.0 + dx).clamp(0.0, 1.0), (self.t.1 + dz).clamp(0.0, 1.0)),
        }
    }

    /// Grid coordinates of the four corners in [`CORNER_OFFSETS`] order.
    pub fn corners(&self) -> [(i32, i32); 4] {
        CORNER_OFFSETS.map(|(dx, dz)| (self.origin.0 + dx, self.origin.1 + dz))
    }

    /// Bilinear weight of each corner. The weights sum to one.
    pub fn weights(&self) -> [f32; 4] {
        let (tx, tz) = self.t;
        [
            (1.0 - tx) * (1.0 - tz),
            tx * (1.0 - tz),
            (1.0 - tx) * tz,
            tx * tz,
        ]
    }

    /// Bilinear interpolation of corner values. Returns `values[0]` exactly at `t = (0, 0)`.
    pub fn interpolate(&self, values: [f32; 4]) -> f32 {
        let (tx, tz) = self.t;
        let near = lerp(values[0], values[1], tx);
        let far = lerp(values[2], values[3], tx);
        lerp(near, far, tz)
    }

    /// Pick the corner value with the largest combined weight.
    /// Equal values pool their weights; ties go to the earlier corner.
    pub fn select<T: Copy + PartialEq>(&self, values: [T; 4]) -> T {
        let weights = self.weights();
        let mut best = values[0];
        let mut best_weight = f32::NEG_INFINITY;

        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                continue;
            }
            let weight: f32 = values
                .iter()
                .zip(weights)
                .filter(|(other, _)| *other == value)
                .map(|(_, weight)| weight)
                .sum();
            if weight > best_weight {
                best = *value;
                best_weight = weight;
            }
        }

        best
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn axis(position: i32, size: i32) -> (i32, f32) {
    let shifted = position.saturating_sub(size / 2);
    (
        shifted.div_euclid(size),
        shifted.rem_euclid(size) as f32 / size as f32,
    )
}

fn realign(origin: i32, t: f32) -> (i32, f32) {
    if t < 0.0 {
        (origin - 1, (t + 1.0).clamp(0.0, 1.0))
    } else if t > 1.0 {
        (origin + 1, (t - 1.0).clamp(0.0, 1.0))
    } else {
        (origin, t)
    }
}

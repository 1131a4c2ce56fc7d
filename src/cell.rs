//! Per-cell map record and its small vocabulary types.

use serde::{Deserialize, Serialize};

/// Dominant rock of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoneType {
    #[default]
    Sandstone,
    Granite,
    Limestone,
    Marble,
}

impl StoneType {
    pub const ALL: [StoneType; 4] = [
        StoneType::Sandstone,
        StoneType::Granite,
        StoneType::Limestone,
        StoneType::Marble,
    ];

    /// Share of a coastal cell's height that erodes into neighbouring ocean cells.
    pub fn spread_factor(self) -> f32 {
        match self {
            StoneType::Granite => 0.5,
            StoneType::Limestone => 0.8,
            StoneType::Marble => 0.6,
            StoneType::Sandstone => 0.9,
        }
    }
}

impl std::fmt::Display for StoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandstone => write!(f, "sandstone"),
            Self::Granite => write!(f, "granite"),
            Self::Limestone => write!(f, "limestone"),
            Self::Marble => write!(f, "marble"),
        }
    }
}

bitflags::bitflags! {
    /// Geological and terrain features of a cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Conditions: u16 {
        const VULCANISM = 1 << 0;
        const SEISMIC_ACTIVITY = 1 << 1;
        const RIFT = 1 << 2;
        const COASTLINE = 1 << 3;
        const MOUNTAINOUS = 1 << 4;
        const CLIFF_NORTH = 1 << 5;
        const CLIFF_EAST = 1 << 6;
        const CLIFF_SOUTH = 1 << 7;
        const CLIFF_WEST = 1 << 8;

        const CLIFF = Self::CLIFF_NORTH.bits()
            | Self::CLIFF_EAST.bits()
            | Self::CLIFF_SOUTH.bits()
            | Self::CLIFF_WEST.bits();
    }
}

/// Cardinal direction on the map grid. North is towards negative `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Fixed enumeration order used wherever the first matching direction wins.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn cliff_flag(self) -> Conditions {
        match self {
            Direction::North => Conditions::CLIFF_NORTH,
            Direction::East => Conditions::CLIFF_EAST,
            Direction::South => Conditions::CLIFF_SOUTH,
            Direction::West => Conditions::CLIFF_WEST,
        }
    }
}

/// One macro cell of the map.
///
/// Field order is the serialized order and must not change without a version bump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub conditions: Conditions,
    /// Continent id; a union-find root after generation.
    pub continent: i16,
    /// Land if positive, water otherwise.
    pub height: f32,
    /// Humidity in `[0, 1]`.
    pub humidity: f32,
    pub stone_type: StoneType,
    /// Temperature in `[0, 1]`.
    pub temperature: f32,
}

impl Cell {
    #[inline]
    pub fn is_land(&self) -> bool {
        self.height > 0.0
    }

    pub fn has_cliff(&self) -> bool {
        self.conditions.intersects(Conditions::CLIFF)
    }
}

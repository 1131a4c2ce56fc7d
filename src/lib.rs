//! World map generation library
//!
//! Builds a seed-driven macro map of continents, terrain, stone and climate,
//! and answers block-level queries against it.

pub mod biome;
pub mod cell;
pub mod climate;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod features;
pub mod map;
pub mod noise;
pub mod sampler;
pub mod storage;
pub mod terrain;
pub mod tilemap;
pub mod union_find;

pub use biome::{BiomeDistribution, DefaultBiomeDistribution};
pub use cell::{Cell, Conditions, StoneType};
pub use config::MapConfig;
pub use data::MapData;
pub use error::MapError;
pub use map::{generate_map, Map, MapStatistics};
pub use noise::NoiseFactory;
pub use sampler::{NoiseStore, Sample};
pub use storage::{BlobStore, DirectoryBlobStore, MemoryBlobStore};

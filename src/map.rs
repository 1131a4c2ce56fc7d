//! Map lifecycle and query API.
//!
//! A [`Map`] is created empty, then [`initialize`](Map::initialize)d once by
//! loading a stored blob or generating from a [`NoiseFactory`]. After that the
//! cell grid is immutable and all queries go through a [`Sampler`].

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::biome::BiomeDistribution;
use crate::cell::{Conditions, StoneType};
use crate::climate;
use crate::data::{width_for_block_limit, MapData};
use crate::error::{GenerationError, MapError};
use crate::export::{self, ImageReport};
use crate::features::{self, FeatureCounts};
use crate::noise::NoiseFactory;
use crate::sampler::{NoiseStore, Sample, Sampler, SamplingNoise};
use crate::storage::{self, BlobStore};
use crate::terrain::{self, TerrainSummary};

/// Summary of a generated or loaded map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapStatistics {
    pub width: usize,
    pub continents: usize,
    pub land_cells: usize,
    pub land_fraction: f32,
    pub features: FeatureCounts,
    pub stone_counts: [usize; 4],
    /// Only known for maps generated in this session.
    pub terrain: Option<TerrainSummary>,
}

impl MapStatistics {
    pub fn from_data(data: &MapData, terrain: Option<TerrainSummary>) -> Self {
        let mut continents = HashSet::new();
        let mut land_cells = 0;
        let mut features = FeatureCounts::default();
        let mut stone_counts = [0; 4];

        for (_, _, cell) in data.cells().iter() {
            continents.insert(cell.continent);
            if cell.is_land() {
                land_cells += 1;
            }
            if cell.conditions.contains(Conditions::MOUNTAINOUS) {
                features.mountainous += 1;
            }
            if cell.has_cliff() {
                features.cliffs += 1;
            }
            if cell.conditions.contains(Conditions::COASTLINE) {
                features.coastline += 1;
            }
            if let Some(i) = StoneType::ALL.iter().position(|&s| s == cell.stone_type) {
                stone_counts[i] += 1;
            }
        }

        let total = data.width() * data.width();
        Self {
            width: data.width(),
            continents: continents.len(),
            land_cells,
            land_fraction: if total > 0 { land_cells as f32 / total as f32 } else { 0.0 },
            features,
            stone_counts,
            terrain,
        }
    }

    fn log(&self) {
        tracing::info!(
            width = self.width,
            continents = self.continents,
            land_fraction = self.land_fraction,
            mountainous = self.features.mountainous,
            coastline = self.features.coastline,
            cliffs = self.features.cliffs,
            "Map statistics"
        );
        if let Some(terrain) = &self.terrain {
            tracing::info!(
                pieces = terrain.pieces,
                transform = terrain.boundaries.transform,
                divergent = terrain.boundaries.divergent,
                convergent = terrain.boundaries.convergent,
                coastal_sources = terrain.coastal_sources,
                "Terrain statistics"
            );
        }
    }
}

/// Run the full generation pipeline on a new `width`-wide grid.
///
/// Takes three generators from `factory`: pieces, stone, humidity.
pub fn generate_map(width: usize, factory: &mut NoiseFactory) -> Result<(MapData, TerrainSummary), GenerationError> {
    let pieces_noise = factory.create(terrain::pieces_noise_definition());
    let stone_noise = factory.create(terrain::stone_noise_definition());
    let humidity_noise = factory.create(climate::humidity_noise_definition());

    let mut data = MapData::new(width);

    tracing::info!(width, "Generating terrain");
    let summary = terrain::generate_terrain(&mut data, &pieces_noise, &stone_noise)?;

    tracing::info!("Generating climate");
    climate::generate_temperature(&mut data);
    climate::generate_humidity(&mut data, &humidity_noise);

    tracing::info!("Detecting features");
    features::detect_features(&mut data);

    Ok((data, summary))
}

/// The world map: owns the cell grid, the sampling noise and the biome lookup.
pub struct Map {
    block_limit: i32,
    width: usize,
    biomes: Arc<dyn BiomeDistribution>,
    data: Option<Arc<MapData>>,
    noise: Option<SamplingNoise>,
    statistics: Option<MapStatistics>,
}

impl Map {
    /// An uninitialized map for a world spanning `[-block_limit, block_limit)` on both axes.
    pub fn new(block_limit: i32, biomes: Arc<dyn BiomeDistribution>) -> Self {
        Self {
            block_limit,
            width: width_for_block_limit(block_limit),
            biomes,
            data: None,
            noise: None,
            statistics: None,
        }
    }

    pub fn block_limit(&self) -> i32 {
        self.block_limit
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_initialized(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Arc<MapData>> {
        self.data.as_ref()
    }

    pub fn statistics(&self) -> Option<&MapStatistics> {
        self.statistics.as_ref()
    }

    pub fn biomes(&self) -> &Arc<dyn BiomeDistribution> {
        &self.biomes
    }

    /// Load the map from `blob` or generate it.
    ///
    /// Returns `true` ("dirty") when the map was generated and should be stored.
    /// A missing or unreadable blob falls back to generation.
    pub fn initialize(
        &mut self,
        store: &dyn BlobStore,
        blob: Option<&str>,
        factory: &mut NoiseFactory,
    ) -> Result<bool, MapError> {
        // Sampling noise comes first so loaded and generated maps sample alike.
        self.noise = Some(SamplingNoise::new(factory));

        if let Some(name) = blob {
            match storage::load_map(store, name, self.width) {
                Ok(Some(data)) => {
                    tracing::info!(blob = name, width = self.width, "Loaded map");
                    self.set_data(data, None);
                    return Ok(false);
                }
                Ok(None) => tracing::info!(blob = name, "No stored map, generating"),
                Err(e) => tracing::warn!(blob = name, error = %e, "Could not load stored map, generating"),
            }
        }

        let (data, summary) = generate_map(self.width, factory)?;
        self.set_data(data, Some(summary));
        Ok(true)
    }

    /// Store the map under `blob`.
    pub fn store(&self, store: &dyn BlobStore, blob: &str) -> Result<(), MapError> {
        let data = self.data.as_ref().ok_or(MapError::NotInitialized)?;
        storage::save_map(store, blob, data)?;
        tracing::info!(blob, "Stored map");
        Ok(())
    }

    fn set_data(&mut self, data: MapData, terrain: Option<TerrainSummary>) {
        let statistics = MapStatistics::from_data(&data, terrain);
        statistics.log();
        self.statistics = Some(statistics);
        self.data = Some(Arc::new(data));
    }

    /// Sampler over the initialized map.
    ///
    /// # Panics
    /// If the map has not been initialized.
    pub fn sampler(&self) -> Sampler<'_> {
        match (&self.data, &self.noise) {
            (Some(data), Some(noise)) => Sampler::new(data, self.biomes.as_ref(), noise),
            _ => panic!("map queried before it was generated or loaded"),
        }
    }

    pub fn get_sample(&self, x: i32, z: i32) -> Sample {
        self.sampler().sample(x, z, None)
    }

    /// Like [`get_sample`](Self::get_sample), reusing noise values cached in `store`.
    pub fn get_sample_cached(&self, x: i32, z: i32, store: &mut NoiseStore) -> Sample {
        self.sampler().sample(x, z, Some(store))
    }

    pub fn get_stone_type(&self, x: i32, y: i32, z: i32, sample: &Sample) -> StoneType {
        self.sampler().stone_type(x, y, z, sample, None)
    }

    /// Temperature in °C at a block position.
    pub fn get_temperature(&self, x: i32, y: i32, z: i32) -> f32 {
        self.sampler().temperature(x, y, z, None)
    }

    /// Block and fluid tint at a block position.
    pub fn get_position_tint(&self, x: i32, _y: i32, z: i32) -> ((u8, u8, u8), (u8, u8, u8)) {
        self.sampler().position_tint(x, z, None)
    }

    /// Write the debug images into `directory`.
    pub async fn emit_world_info(&self, directory: impl Into<PathBuf>) -> Result<Vec<ImageReport>, MapError> {
        let data = self.data.clone().ok_or(MapError::NotInitialized)?;
        let biomes = Arc::clone(&self.biomes);
        Ok(export::emit_world_info(data, biomes, directory.into()).await)
    }
}

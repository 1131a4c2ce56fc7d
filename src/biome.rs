//! Biome lookup seam used by the sampler and the biome debug image.
//!
//! Biome placement rules belong to the content layer. The map only needs to ask
//! which biome a cell has, whether that biome is oceanic, and which sub-biomes
//! it offers. [`DefaultBiomeDistribution`] is a small climate-based table used by
//! the command line tool and the tests.

use crate::cell::{Cell, Conditions};

/// Index of a biome in a [`BiomeDistribution`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// Index of a sub-biome in a [`BiomeDistribution`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubBiomeId(pub u16);

/// A sub-biome with its relative selection weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedSubBiome {
    pub id: SubBiomeId,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDefinition {
    pub name: String,
    /// Colour in the biome debug image.
    pub color: (u8, u8, u8),
    /// Oceanic biomes decorate the water surface instead of the ground.
    pub is_oceanic: bool,
    pub sub_biomes: Vec<WeightedSubBiome>,
    /// Sub-biomes for the water surface; empty if the biome has none.
    pub oceanic_sub_biomes: Vec<WeightedSubBiome>,
}

/// Maps cells to biomes. Implementations must be deterministic.
pub trait BiomeDistribution: Send + Sync {
    /// Biome of a generated cell.
    fn determine_biome(&self, cell: &Cell) -> BiomeId;

    /// Definition of a biome returned by [`determine_biome`](Self::determine_biome).
    fn definition(&self, biome: BiomeId) -> &BiomeDefinition;

    /// Display name of a sub-biome.
    fn sub_biome_name(&self, sub_biome: SubBiomeId) -> &str;

    /// Sub-biome of `biome` for a selection value in `[0, 1)`.
    fn choose_sub_biome(&self, biome: BiomeId, value: f32) -> Option<SubBiomeId> {
        choose_weighted(&self.definition(biome).sub_biomes, value)
    }

    /// Oceanic sub-biome of `biome` for a selection value in `[0, 1)`.
    fn choose_oceanic_sub_biome(&self, biome: BiomeId, value: f32) -> Option<SubBiomeId> {
        choose_weighted(&self.definition(biome).oceanic_sub_biomes, value)
    }
}

/// Pick from a weighted list with a value in `[0, 1)`. Values outside the range
/// are clamped; an empty or zero-weight list yields `None`.
pub fn choose_weighted(options: &[WeightedSubBiome], value: f32) -> Option<SubBiomeId> {
    let total: f32 = options.iter().map(|option| option.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let target = value.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    for option in options {
        cumulative += option.weight.max(0.0);
        if target < cumulative {
            return Some(option.id);
        }
    }

    options.iter().rev().find(|option| option.weight > 0.0).map(|option| option.id)
}

// =============================================================================
// DEFAULT DISTRIBUTION
// =============================================================================

const SUB_BIOME_NAMES: [&str; 12] = [
    "open",       // 0
    "grove",      // 1
    "clearing",   // 2
    "dunes",      // 3
    "rocky",      // 4
    "meadow",     // 5
    "thicket",    // 6
    "ice floe",   // 7
    "kelp bed",   // 8
    "reef",       // 9
    "open water", // 10
    "scree",      // 11
];

fn weighted(entries: &[(u16, f32)]) -> Vec<WeightedSubBiome> {
    entries
        .iter()
        .map(|&(id, weight)| WeightedSubBiome {
            id: SubBiomeId(id),
            weight,
        })
        .collect()
}

fn biome(
    name: &str,
    color: (u8, u8, u8),
    is_oceanic: bool,
    sub_biomes: &[(u16, f32)],
    oceanic_sub_biomes: &[(u16, f32)],
) -> BiomeDefinition {
    BiomeDefinition {
        name: name.to_string(),
        color,
        is_oceanic,
        sub_biomes: weighted(sub_biomes),
        oceanic_sub_biomes: weighted(oceanic_sub_biomes),
    }
}

/// Climate table: water by temperature, then mountains and beaches, then land
/// by temperature and humidity.
pub struct DefaultBiomeDistribution {
    biomes: Vec<BiomeDefinition>,
}

impl DefaultBiomeDistribution {
    pub const OCEAN: BiomeId = BiomeId(0);
    pub const FROZEN_OCEAN: BiomeId = BiomeId(1);
    pub const BEACH: BiomeId = BiomeId(2);
    pub const MOUNTAINS: BiomeId = BiomeId(3);
    pub const TUNDRA: BiomeId = BiomeId(4);
    pub const DESERT: BiomeId = BiomeId(5);
    pub const SAVANNA: BiomeId = BiomeId(6);
    pub const JUNGLE: BiomeId = BiomeId(7);
    pub const GRASSLAND: BiomeId = BiomeId(8);
    pub const FOREST: BiomeId = BiomeId(9);

    pub fn new() -> Self {
        let biomes = vec![
            biome("ocean", (30, 70, 160), true, &[(0, 1.0)], &[(10, 3.0), (8, 1.0), (9, 0.5)]),
            biome("frozen ocean", (150, 180, 220), true, &[(0, 1.0)], &[(10, 1.0), (7, 2.0)]),
            biome("beach", (230, 215, 160), false, &[(0, 3.0), (4, 1.0)], &[]),
            biome("mountains", (130, 120, 110), false, &[(4, 2.0), (11, 1.0), (5, 0.5)], &[]),
            biome("tundra", (200, 210, 200), false, &[(0, 2.0), (4, 1.0)], &[]),
            biome("desert", (220, 190, 120), false, &[(3, 3.0), (4, 1.0)], &[]),
            biome("savanna", (180, 170, 80), false, &[(0, 2.0), (1, 1.0)], &[]),
            biome("jungle", (40, 120, 40), false, &[(6, 2.0), (2, 1.0)], &[]),
            biome("grassland", (120, 180, 80), false, &[(5, 3.0), (1, 1.0)], &[]),
            biome("forest", (60, 140, 60), false, &[(1, 3.0), (2, 1.0), (6, 1.0)], &[]),
        ];

        Self { biomes }
    }
}

impl Default for DefaultBiomeDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl BiomeDistribution for DefaultBiomeDistribution {
    fn determine_biome(&self, cell: &Cell) -> BiomeId {
        let temperature = cell.temperature;
        let humidity = cell.humidity;

        if !cell.is_land() {
            return if temperature < 0.2 {
                Self::FROZEN_OCEAN
            } else {
                Self::OCEAN
            };
        }

        if cell.conditions.contains(Conditions::MOUNTAINOUS) {
            Self::MOUNTAINS
        } else if cell.conditions.contains(Conditions::COASTLINE) {
            Self::BEACH
        } else if temperature < 0.25 {
            Self::TUNDRA
        } else if temperature > 0.65 {
            if humidity < 0.3 {
                Self::DESERT
            } else if humidity < 0.55 {
                Self::SAVANNA
            } else {
                Self::JUNGLE
            }
        } else if humidity < 0.35 {
            Self::GRASSLAND
        } else {
            Self::FOREST
        }
    }

    fn definition(&self, biome: BiomeId) -> &BiomeDefinition {
        &self.biomes[biome.0 as usize % self.biomes.len()]
    }

    fn sub_biome_name(&self, sub_biome: SubBiomeId) -> &str {
        SUB_BIOME_NAMES
            .get(sub_biome.0 as usize)
            .copied()
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_weighted() {
        let options = weighted(&[(1, 1.0), (2, 3.0)]);
        assert_eq!(choose_weighted(&options, 0.0), Some(SubBiomeId(1)));
        assert_eq!(choose_weighted(&options, 0.24), Some(SubBiomeId(1)));
        assert_eq!(choose_weighted(&options, 0.26), Some(SubBiomeId(2)));
        assert_eq!(choose_weighted(&options, 1.0), Some(SubBiomeId(2)));
        assert_eq!(choose_weighted(&[], 0.5), None);
    }

    #[test]
    fn test_water_biomes_are_oceanic() {
        let biomes = DefaultBiomeDistribution::new();
        let mut cell = Cell {
            height: -0.1,
            temperature: 0.5,
            ..Default::default()
        };
        assert!(biomes.definition(biomes.determine_biome(&cell)).is_oceanic);

        cell.temperature = 0.1;
        assert_eq!(biomes.determine_biome(&cell), DefaultBiomeDistribution::FROZEN_OCEAN);

        cell.height = 0.1;
        assert!(!biomes.definition(biomes.determine_biome(&cell)).is_oceanic);
    }

    #[test]
    fn test_land_climate_table() {
        let biomes = DefaultBiomeDistribution::new();
        let land = |temperature: f32, humidity: f32| Cell {
            height: 0.1,
            temperature,
            humidity,
            ..Default::default()
        };

        assert_eq!(biomes.determine_biome(&land(0.9, 0.1)), DefaultBiomeDistribution::DESERT);
        assert_eq!(biomes.determine_biome(&land(0.9, 0.9)), DefaultBiomeDistribution::JUNGLE);
        assert_eq!(biomes.determine_biome(&land(0.1, 0.5)), DefaultBiomeDistribution::TUNDRA);
        assert_eq!(biomes.determine_biome(&land(0.5, 0.5)), DefaultBiomeDistribution::FOREST);

        let mut mountain = land(0.5, 0.5);
        mountain.conditions |= Conditions::MOUNTAINOUS | Conditions::COASTLINE;
        assert_eq!(biomes.determine_biome(&mountain), DefaultBiomeDistribution::MOUNTAINS);
    }

    #[test]
    fn test_sub_biomes_only_for_oceans_on_water() {
        let biomes = DefaultBiomeDistribution::new();
        assert!(biomes.choose_oceanic_sub_biome(DefaultBiomeDistribution::OCEAN, 0.5).is_some());
        assert!(biomes.choose_oceanic_sub_biome(DefaultBiomeDistribution::FOREST, 0.5).is_none());
        assert_eq!(
            biomes.choose_sub_biome(DefaultBiomeDistribution::DESERT, 0.1).map(|id| biomes.sub_biome_name(id)),
            Some("dunes")
        );
    }
}

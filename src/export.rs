//! Debug images of a generated map, one pixel per cell.
//!
//! Six images are written: terrain, stone, continent, temperature, humidity and
//! biome. They are rendered on blocking worker threads and each image succeeds
//! or fails on its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::biome::BiomeDistribution;
use crate::cell::{Conditions, StoneType};
use crate::data::MapData;
use crate::error::ExportError;

/// The debug images of a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldImage {
    Terrain,
    Stone,
    Continent,
    Temperature,
    Humidity,
    Biome,
}

impl WorldImage {
    pub const ALL: [WorldImage; 6] = [
        WorldImage::Terrain,
        WorldImage::Stone,
        WorldImage::Continent,
        WorldImage::Temperature,
        WorldImage::Humidity,
        WorldImage::Biome,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            WorldImage::Terrain => "terrain.png",
            WorldImage::Stone => "stone.png",
            WorldImage::Continent => "continent.png",
            WorldImage::Temperature => "temperature.png",
            WorldImage::Humidity => "humidity.png",
            WorldImage::Biome => "biome.png",
        }
    }

    pub fn render(self, data: &MapData, biomes: &dyn BiomeDistribution) -> RgbImage {
        match self {
            WorldImage::Terrain => render_terrain(data),
            WorldImage::Stone => render_stone(data),
            WorldImage::Continent => render_continents(data),
            WorldImage::Temperature => render_temperature(data),
            WorldImage::Humidity => render_humidity(data),
            WorldImage::Biome => render_biomes(data, biomes),
        }
    }
}

/// Outcome of writing one image.
#[derive(Debug)]
pub struct ImageReport {
    pub image: WorldImage,
    pub result: Result<PathBuf, ExportError>,
}

/// Render and write all debug images into `directory`.
///
/// Every image runs as its own blocking task; a failure is reported for that
/// image only and the others still complete.
pub async fn emit_world_info(
    data: Arc<MapData>,
    biomes: Arc<dyn BiomeDistribution>,
    directory: PathBuf,
) -> Vec<ImageReport> {
    let tasks: Vec<_> = WorldImage::ALL
        .into_iter()
        .map(|image| {
            let data = Arc::clone(&data);
            let biomes = Arc::clone(&biomes);
            let directory = directory.clone();
            let handle = tokio::task::spawn_blocking(move || write_image(image, &data, biomes.as_ref(), &directory));
            (image, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for (image, handle) in tasks {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ExportError::Join(e.to_string())),
        };

        match &result {
            Ok(path) => tracing::debug!(image = ?image, path = %path.display(), "Wrote world image"),
            Err(e) => tracing::warn!(image = ?image, error = %e, "Failed to write world image"),
        }

        reports.push(ImageReport { image, result });
    }

    reports
}

/// Render one image and save it as PNG under `directory`.
pub fn write_image(
    image: WorldImage,
    data: &MapData,
    biomes: &dyn BiomeDistribution,
    directory: &Path,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(directory)?;

    let path = directory.join(image.file_name());
    image
        .render(data, biomes)
        .save(&path)
        .map_err(|source| ExportError::Image {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

// =============================================================================
// RENDERERS
// =============================================================================

fn render_cells(data: &MapData, mut color: impl FnMut(usize, usize) -> [u8; 3]) -> RgbImage {
    let width = data.width() as u32;
    let mut img: RgbImage = ImageBuffer::new(width, width);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb(color(x as usize, y as usize));
    }

    img
}

/// Water by depth, land by height, mountains lightened and cliffs darkened.
pub fn render_terrain(data: &MapData) -> RgbImage {
    render_cells(data, |x, y| {
        let cell = data.cell(x, y);

        if !cell.is_land() {
            let depth = (-cell.height / 0.3).clamp(0.0, 1.0);
            return lerp_color([70, 130, 200], [15, 35, 90], depth);
        }

        let base = height_colormap((cell.height / 0.6).clamp(0.0, 1.0));
        if cell.conditions.contains(Conditions::MOUNTAINOUS) {
            lerp_color(base, [255, 255, 255], 0.25)
        } else if cell.has_cliff() {
            lerp_color(base, [0, 0, 0], 0.4)
        } else {
            base
        }
    })
}

pub fn render_stone(data: &MapData) -> RgbImage {
    render_cells(data, |x, y| stone_color(data.cell(x, y).stone_type))
}

/// Each continent gets a stable pseudo-random colour; water is dimmed.
pub fn render_continents(data: &MapData) -> RgbImage {
    render_cells(data, |x, y| {
        let cell = data.cell(x, y);
        let color = id_color(cell.continent);
        if cell.is_land() {
            color
        } else {
            lerp_color(color, [0, 0, 0], 0.6)
        }
    })
}

pub fn render_temperature(data: &MapData) -> RgbImage {
    render_cells(data, |x, y| spectral_colormap(data.cell(x, y).temperature))
}

pub fn render_humidity(data: &MapData) -> RgbImage {
    render_cells(data, |x, y| lerp_color([225, 205, 160], [20, 60, 170], data.cell(x, y).humidity))
}

pub fn render_biomes(data: &MapData, biomes: &dyn BiomeDistribution) -> RgbImage {
    render_cells(data, |x, y| {
        let (r, g, b) = biomes.definition(biomes.determine_biome(data.cell(x, y))).color;
        [r, g, b]
    })
}

fn stone_color(stone: StoneType) -> [u8; 3] {
    match stone {
        StoneType::Sandstone => [215, 190, 130],
        StoneType::Granite => [150, 120, 115],
        StoneType::Limestone => [200, 200, 185],
        StoneType::Marble => [235, 235, 240],
    }
}

fn id_color(id: i16) -> [u8; 3] {
    let hash = (id as u16 as u32).wrapping_mul(2_654_435_761);
    [
        64 + (hash >> 24) as u8 % 192,
        64 + (hash >> 16) as u8 % 192,
        64 + (hash >> 8) as u8 % 192,
    ]
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [0, 1, 2].map(|i| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8)
}

/// Lowland green through brown to snow.
fn height_colormap(t: f32) -> [u8; 3] {
    const STOPS: [[u8; 3]; 4] = [[90, 160, 70], [170, 160, 90], [140, 100, 70], [245, 245, 245]];
    let scaled = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f32;
    let idx = (scaled as usize).min(STOPS.len() - 2);
    lerp_color(STOPS[idx], STOPS[idx + 1], scaled - idx as f32)
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [0, 1, 2].map(|i| ((c1[i] + (c2[i] - c1[i]) * frac) * 255.0) as u8)
}

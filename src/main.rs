use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use map_generator::{DefaultBiomeDistribution, DirectoryBlobStore, Map, MapConfig, NoiseFactory};

#[derive(Parser, Debug)]
#[command(name = "map_generator")]
#[command(about = "Generate or load a world map and export debug images")]
struct Args {
    /// JSON config file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Half extent of the world in blocks
    #[arg(short, long)]
    block_limit: Option<i32>,

    /// Directory holding map blobs
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Name of the blob to load and store
    #[arg(long)]
    blob: Option<String>,

    /// Always generate and never store
    #[arg(long)]
    no_save: bool,

    /// Write debug images into this directory
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    /// Print the sample at block column X,Z (repeatable)
    #[arg(long, value_name = "X,Z", value_parser = parse_column)]
    sample: Vec<(i32, i32)>,
}

fn parse_column(s: &str) -> Result<(i32, i32), String> {
    let (x, z) = s.split_once(',').ok_or_else(|| format!("expected X,Z, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let z = z.trim().parse().map_err(|e| format!("bad Z '{z}': {e}"))?;
    Ok((x, z))
}

fn build_config(args: &Args) -> Result<MapConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(block_limit) = args.block_limit {
        config.block_limit = block_limit;
    }
    if let Some(dir) = &args.save_dir {
        config.save_directory = dir.clone();
    }
    if let Some(blob) = &args.blob {
        config.blob_name = Some(blob.clone());
    }
    if args.no_save {
        config.blob_name = None;
    }
    if let Some(dir) = &args.export_dir {
        config.export_directory = Some(dir.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    println!("Map seed: {}", config.seed);
    println!("Block limit: {} ({}x{} cells)", config.block_limit, config.width(), config.width());

    let store = DirectoryBlobStore::new(&config.save_directory);
    let mut factory = NoiseFactory::new(config.seed);
    let mut map = Map::new(config.block_limit, Arc::new(DefaultBiomeDistribution::new()));

    let dirty = map.initialize(&store, config.blob_name.as_deref(), &mut factory)?;
    if dirty {
        if let Some(blob) = &config.blob_name {
            map.store(&store, blob)?;
            println!("Stored map as {}", store.root().join(format!("{blob}.bin")).display());
        }
    } else {
        println!("Loaded stored map");
    }

    if let Some(stats) = map.statistics() {
        println!(
            "{} continents, {:.1}% land, {} mountainous, {} coastline, {} cliff cells",
            stats.continents,
            stats.land_fraction * 100.0,
            stats.features.mountainous,
            stats.features.coastline,
            stats.features.cliffs
        );
    }

    if let Some(dir) = &config.export_directory {
        let reports = map.emit_world_info(dir.clone()).await?;
        let written = reports.iter().filter(|report| report.result.is_ok()).count();
        println!("Wrote {}/{} images to {}", written, reports.len(), dir.display());
    }

    for &(x, z) in &args.sample {
        let sample = map.get_sample(x, z);
        let biome = map.biomes().definition(sample.biome);
        let sub_biome = sample
            .sub_biome
            .map(|id| map.biomes().sub_biome_name(id))
            .unwrap_or("none");
        let stone = map.get_stone_type(x, 0, z, &sample);

        println!(
            "({x}, {z}): height {:.3}, {:.1}°C, humidity {:.2}, {} / {}, {}",
            sample.height,
            map.get_temperature(x, 0, z),
            sample.humidity,
            biome.name,
            sub_biome,
            stone
        );
    }

    Ok(())
}

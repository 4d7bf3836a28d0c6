use clap::Parser;
use hamlet::errors::{HamletError, HamletResult};
use hamlet::gen::{GenerationConfig, GenerationReport, VillageBuilder, WaterKind};
use hamlet::village::Village;

#[derive(Parser, Clone)]
#[command(name = "villagegen")]
#[command(about = "Generate procedural village files for the Hamlet simulation")]
struct Args {
    /// Village name
    #[arg(long, default_value = "generated_village")]
    name: String,

    /// Village size in tiles per side
    #[arg(long, default_value_t = 64)]
    size: u32,

    /// Tile size in pixels
    #[arg(long, default_value_t = 32)]
    tile_size: u32,

    /// Random seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Water feature to carve (lake, river, lake_with_river, random)
    #[arg(long, default_value = "random")]
    water: String,

    /// Output file path relative to the villages/ directory (e.g. "my_village.bin")
    #[arg(long)]
    output: Option<String>,
}

fn validate_output_path(filename: &str) -> HamletResult<()> {
    use std::path::Path;

    let path = Path::new(filename);
    if path.is_absolute() {
        return Err(HamletError::InvalidVillageData {
            reason: format!(
                "Output path must be relative to the villages/ directory, got absolute path: {}",
                filename
            ),
        });
    }

    if filename.contains("..") {
        return Err(HamletError::InvalidVillageData {
            reason: "Output path cannot contain '..' for security reasons".to_string(),
        });
    }

    Ok(())
}

fn main() -> HamletResult<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let defaults = hamlet::config::load_config();
    let water = args
        .water
        .parse::<WaterKind>()
        .map_err(|reason| HamletError::InvalidGenerationConfig { reason })?;

    let config = GenerationConfig {
        seed: args.seed.unwrap_or(defaults.seed),
        size_tiles: args.size,
        tile_size: args.tile_size,
        water,
        ..defaults
    };

    let output_filename = args.output.clone().unwrap_or_else(|| format!("{}.bin", args.name));
    validate_output_path(&output_filename)?;

    let (village, report) = VillageBuilder::new(config)?.generate_with_report(args.name)?;

    village.save_to_file(&output_filename)?;

    print_village_summary(&village, &report, &output_filename)
}

fn print_village_summary(
    village: &Village,
    report: &GenerationReport,
    output_filename: &str,
) -> HamletResult<()> {
    let villages_dir = Village::get_villages_dir()?;
    let full_path = villages_dir.join(output_filename);

    println!("Village saved successfully to: {}", full_path.display());
    println!("\nVillage summary:");
    println!("  Name: {}", village.name);
    println!(
        "  Grid: {}x{} tiles at {}px ({}x{} pixels)",
        village.size_tiles,
        village.size_tiles,
        village.tile_size,
        village.size_px(),
        village.size_px()
    );
    println!("  Center: {}", village.center);
    println!("  Water tiles: {}", village.water.len());
    println!("  Path tiles: {}", village.paths.len());
    println!("  Buildings: {}", village.buildings.len());
    println!("  Trees: {}", village.trees.len());
    println!("  Bridges: {}", village.bridges.len());
    println!("  Interaction points: {}", village.interaction_points.len());

    let mut kind_counts = std::collections::HashMap::new();
    for building in &village.buildings {
        *kind_counts.entry(building.kind).or_insert(0) += 1;
    }
    if !kind_counts.is_empty() {
        println!("  Building types:");
        let mut sorted: Vec<_> = kind_counts.into_iter().collect();
        sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        for (kind, count) in sorted {
            println!("    {kind}: {count}");
        }
    }

    println!("\nGeneration report:");
    println!("  Roads aborted at water: {}", report.roads_aborted);
    println!(
        "  Connector tiles carved: {} ({} retried, {} abandoned)",
        report.connector_tiles_carved, report.connectors_retried, report.connectors_abandoned
    );
    println!(
        "  Path repairs: {} diagonal links fixed, {} stubs removed",
        report.diagonal_links_repaired, report.stub_paths_removed
    );
    println!(
        "  Trees removed by repair pass: {}",
        report.trees_removed_by_repair
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_validation() {
        assert!(validate_output_path("village.bin").is_ok());
        assert!(validate_output_path("saves/village.bin").is_ok());
        assert!(validate_output_path("/etc/village.bin").is_err());
        assert!(validate_output_path("../village.bin").is_err());
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["villagegen"]);
        assert_eq!(args.size, 64);
        assert_eq!(args.tile_size, 32);
        assert_eq!(args.water, "random");
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_args_water_round_trip() {
        let args = Args::parse_from(["villagegen", "--water", "lake_with_river", "--seed", "7"]);
        assert_eq!(
            args.water.parse::<WaterKind>(),
            Ok(WaterKind::LakeWithRiver)
        );
        assert_eq!(args.seed, Some(7));
    }
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use labkit::designer::outline::perimeter;
use labkit::designer::store::{load_floor, save_floor};
use labkit::{align_all, init_logging, Config, Floor, JsonFileStore, SettingsManager};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "labkit",
    about = "Report on a lab floor plan and align its areas",
    version,
    long_version = LONG_VERSION
)]
struct Cli {
    /// Floor plan file (.json)
    #[arg(value_name = "FLOOR")]
    floor: PathBuf,

    /// Snap nearly touching areas together and save the floor
    #[arg(long)]
    align: bool,

    /// Print the area report even after aligning
    #[arg(long)]
    report: bool,

    /// Settings file (.toml or .json) instead of the user settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match SettingsManager::load_default() {
            Ok(manager) => Ok(manager.config().clone()),
            Err(err) => {
                tracing::warn!(error = %err, "using default settings");
                Ok(Config::default())
            }
        },
    }
}

fn print_report(floor: &Floor) {
    let canvas = floor.canvas();
    println!("Canvas {}: {:.2} m x {:.2} m", canvas.id, canvas.width_m, canvas.height_m);
    for area in floor.areas() {
        let outline = floor.area_outline(&area.id);
        println!(
            "{} ({}): {:.3} m2, {} polygon(s), outline {:.3} m",
            area.name,
            area.id,
            floor.area_total_m2(&area.id),
            floor.polygons_of(&area.id).len(),
            perimeter(&outline)
        );
        for s in &outline {
            println!(
                "    ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                s.start.x, s.start.y, s.end.x, s.end.y
            );
        }
    }
    println!(
        "{} fixture(s), {} block(s), {} opening(s)",
        floor.fixtures().count(),
        floor.blocks().count(),
        floor.openings().count()
    );
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging()?;

    let config = load_config(args.config.as_deref())?;

    let mut store = JsonFileStore::open(&args.floor)
        .with_context(|| format!("Failed to open floor {}", args.floor.display()))?;
    let mut floor = load_floor(&store, config).context("Failed to load floor")?;
    tracing::info!(path = %args.floor.display(), areas = floor.areas().count(), "floor loaded");

    if args.align {
        let report = align_all(&mut floor).context("Alignment failed")?;
        println!(
            "Aligned {} polygon(s) in {} pass(es), re-anchored {} opening(s)",
            report.moved.len(),
            report.passes,
            report.reanchored.len()
        );
        let saved = save_floor(&mut store, &floor).context("Failed to save floor")?;
        for (entity, err) in saved.failures() {
            eprintln!("not saved: {entity}: {err}");
        }
        if !saved.is_complete() {
            bail!("floor saved partially");
        }
    }

    if args.report || !args.align {
        print_report(&floor);
    }

    Ok(())
}

//! islandpath CLI - plan toolpaths for sliced contours
//!
//! Reads layers as JSON (`[{ "z": .., "section": .. }]`) and writes the
//! planned paths, island summaries or path statistics.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use islandpath::{
    classify_topology, plan_layers, LayerInput, LayerPlan, PlanConfig, TravelKind,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "islandpath")]
#[command(about = "Island-aware toolpath planner for planar slices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan toolpaths for every layer
    Plan {
        /// Input layers (.json)
        input: PathBuf,
        /// Planning configuration (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Infill line spacing
        #[arg(long)]
        spacing: Option<f64>,
        /// Infill angle in degrees
        #[arg(long)]
        angle: Option<f64>,
        /// Minimum contour area
        #[arg(long)]
        area_threshold: Option<f64>,
        /// Report inter-island travel through material
        #[arg(long)]
        check_inter_island: bool,
    },
    /// Print island and hole counts per layer
    Islands {
        /// Input layers (.json)
        input: PathBuf,
        /// Minimum contour area
        #[arg(long, default_value_t = 0.1)]
        area_threshold: f64,
    },
    /// Print path statistics per layer
    Info {
        /// Input layers (.json)
        input: PathBuf,
        /// Planning configuration (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            config,
            output,
            spacing,
            angle,
            area_threshold,
            check_inter_island,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(spacing) = spacing {
                config.spacing = spacing;
            }
            if let Some(angle) = angle {
                config.angle_deg = angle;
            }
            if let Some(threshold) = area_threshold {
                config.area_threshold = threshold;
            }
            config.check_inter_island_travel |= check_inter_island;
            plan(&input, &config, output.as_deref())?;
        }
        Commands::Islands {
            input,
            area_threshold,
        } => {
            show_islands(&input, area_threshold)?;
        }
        Commands::Info { input, config } => {
            let config = load_config(config.as_deref())?;
            show_info(&input, &config)?;
        }
    }

    Ok(())
}

/// Log to stderr so JSON on stdout stays clean. `RUST_LOG` overrides the
/// default `warn` level.
fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PlanConfig> {
    match path {
        Some(path) => PlanConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PlanConfig::default()),
    }
}

fn read_layers(input: &Path) -> Result<Vec<LayerInput>> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let layers: Vec<LayerInput> = serde_json::from_str(&json)
        .with_context(|| format!("parsing layers from {}", input.display()))?;
    info!(layers = layers.len(), input = %input.display(), "layers loaded");
    Ok(layers)
}

fn plan(input: &Path, config: &PlanConfig, output: Option<&Path>) -> Result<()> {
    let layers = read_layers(input)?;
    let plans = plan_layers(&layers, config)?;
    let json = serde_json::to_string_pretty(&plans)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Planned {} layers to {}", plans.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn show_islands(input: &Path, area_threshold: f64) -> Result<()> {
    let layers = read_layers(input)?;

    println!("{:>10}  {:>8}  {:>6}", "z", "islands", "holes");
    for layer in &layers {
        let islands = classify_topology(&layer.section, area_threshold);
        let holes: usize = islands.iter().map(|i| i.holes.len()).sum();
        println!("{:>10.3}  {:>8}  {:>6}", layer.z, islands.len(), holes);
    }
    Ok(())
}

fn show_info(input: &Path, config: &PlanConfig) -> Result<()> {
    let layers = read_layers(input)?;
    let plans = plan_layers(&layers, config)?;

    println!(
        "{:>10}  {:>7}  {:>10}  {:>10}  {:>8}  {:>8}  {:>8}",
        "z", "islands", "extrude", "travel", "segments", "rerouted", "repairs"
    );
    for plan in &plans {
        print_stats(plan);
    }

    let extrude: f64 = plans.iter().map(|p| p.path.extrude_length()).sum();
    let travel: f64 = plans.iter().map(|p| p.path.travel_length()).sum();
    println!();
    println!("Layers: {}", plans.len());
    println!("Extrude length: {extrude:.3}");
    println!("Travel length: {travel:.3}");
    Ok(())
}

fn print_stats(plan: &LayerPlan) {
    println!(
        "{:>10.3}  {:>7}  {:>10.3}  {:>10.3}  {:>8}  {:>8}  {:>8}",
        plan.z,
        plan.islands.len(),
        plan.path.extrude_length(),
        plan.path.travel_length(),
        plan.path.extrude_count(),
        plan.path.travel_count(TravelKind::Rerouted),
        plan.diagnostics.interventions().count(),
    );
}

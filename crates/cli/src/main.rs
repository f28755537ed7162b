#![deny(unsafe_code)]
//! CLI binary for the pattern-engine.
//!
//! Subcommands:
//! - `render <algorithm>`: run an engine for N frames, write a PNG
//! - `list`: print available algorithms and palettes
//! - `schema <algorithm>`: print the parameter schema as JSON
//!
//! Set `RUST_LOG=debug` to see engine re-initialization and cache events.

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use glam::DVec2;
use pattern_engine_core::config::Algorithm;
use pattern_engine_core::{ColorPalette, Configuration, Rgba};
use pattern_engine_engines::raster::{run_frames, PointerScript};
use pattern_engine_engines::EngineKind;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "pattern-engine", about = "Generative pattern engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine for N frames and write a PNG snapshot.
    Render {
        /// Algorithm name (e.g. "flow-field").
        algorithm: String,

        /// Canvas width in pixels [default: 800].
        #[arg(short = 'W', long)]
        width: Option<usize>,

        /// Canvas height in pixels [default: 600].
        #[arg(short = 'H', long)]
        height: Option<usize>,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// PRNG seed for deterministic output [default: 42].
        #[arg(long)]
        seed: Option<u64>,

        /// Palette name (default, ocean, neon, fire, earth, monochrome, vapor).
        #[arg(short, long)]
        palette: Option<String>,

        /// Background color as #rrggbb or #rrggbbaa [default: #000000].
        #[arg(long)]
        background: Option<String>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Algorithm options as a JSON object.
        #[arg(long, default_value = "{}")]
        options: String,

        /// Base configuration file. Canvas, seed, palette and background
        /// flags given on the command line replace its values; --options
        /// merge into its options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pointer position "x,y" to hold down from the first frame.
        #[arg(long)]
        pointer: Option<String>,

        /// How many frames the pointer stays pressed (default: all).
        #[arg(long)]
        pointer_frames: Option<usize>,
    },
    /// List available algorithms and palettes.
    List,
    /// Print an algorithm's parameter schema.
    Schema {
        /// Algorithm name.
        algorithm: String,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses "x,y" into a point.
fn parse_pointer(s: &str) -> Result<DVec2, CliError> {
    let invalid = || CliError::Input(format!("invalid --pointer '{s}', expected x,y"));
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(DVec2::new(x, y))
}

fn parse_options(s: &str) -> Result<Value, CliError> {
    let options: Value = serde_json::from_str(s)
        .map_err(|e| CliError::Input(format!("invalid --options JSON: {e}")))?;
    if !options.is_object() {
        return Err(CliError::Input("--options must be a JSON object".into()));
    }
    Ok(options)
}

struct RenderArgs {
    algorithm: Algorithm,
    width: Option<usize>,
    height: Option<usize>,
    seed: Option<u64>,
    palette: Option<String>,
    background: Option<String>,
    options: Value,
}

/// Builds the configuration from an optional base file plus flags. Flags
/// left unset keep the base file's value, or the default without one.
fn build_config(base: Option<Configuration>, args: RenderArgs) -> Result<Configuration, CliError> {
    let mut config = base.unwrap_or_default();
    if args.width.is_some() || args.height.is_some() {
        let width = args.width.map_or(config.width(), |w| w as f64);
        let height = args.height.map_or(config.height(), |h| h as f64);
        config = config.with_canvas(width, height);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(name) = &args.palette {
        config.palette = ColorPalette::from_name(name)?;
    }
    if let Some(hex) = &args.background {
        config.background = Rgba::from_hex(hex)?;
    }
    if let Some(map) = args.options.as_object() {
        for (key, value) in map {
            config = config.with_option(key, value.clone());
        }
    }
    config.algorithm = args.algorithm;
    Ok(config)
}

fn read_config(path: &Path) -> Result<Configuration, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid config file {}: {e}", path.display())))?;
    Ok(Configuration::from_json(&value))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let algorithms = EngineKind::list_algorithms();
            let palettes = ColorPalette::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "algorithms": algorithms,
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Algorithms:");
                for name in algorithms {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Schema { algorithm } => {
            let algorithm = Algorithm::from_name(&algorithm)?;
            let schema = EngineKind::schema_for(algorithm);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Render {
            algorithm,
            width,
            height,
            frames,
            dt,
            seed,
            palette,
            background,
            output,
            options,
            config,
            pointer,
            pointer_frames,
        } => {
            let algorithm = Algorithm::from_name(&algorithm)?;
            let options = parse_options(&options)?;
            let pointer = pointer.as_deref().map(parse_pointer).transpose()?;
            let base = config.as_deref().map(read_config).transpose()?;
            let config = build_config(
                base,
                RenderArgs {
                    algorithm,
                    width,
                    height,
                    seed,
                    palette,
                    background,
                    options,
                },
            )?;

            let script = pointer.map(|position| PointerScript {
                position,
                held_frames: pointer_frames.unwrap_or(frames),
            });
            let seed = config.seed;
            let mut engine = EngineKind::create(config);
            let raster = run_frames(&mut engine, frames, dt, script)?;
            pattern_engine_engines::snapshot::write_png(&raster, &output)?;

            let name = algorithm.name();
            if cli.json {
                let info = serde_json::json!({
                    "algorithm": name,
                    "width": raster.width(),
                    "height": raster.height(),
                    "frames": frames,
                    "seed": seed,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {name} ({}x{}, {frames} frames, seed {seed}) -> {}",
                    raster.width(),
                    raster.height(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

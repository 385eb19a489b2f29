//! strata CLI - slice triangle meshes into G-code
//!
//! Reads a non-indexed vertex buffer dumped as JSON, slices it into layers,
//! plans moves, and writes a `G0`/`G1` program.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use strata_gcode::{parse_gcode, plan_moves, write_gcode, PrinterConfig, Toolpath};
use strata_math::Transform;
use strata_slicer::{slice_mesh, Mesh, SliceOutput, StartAnchor};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Planar mesh slicer and G-code generator", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Slice a mesh JSON file ({ "positions": [...], "transform": [...] })
    Slice {
        /// Input mesh JSON
        mesh: PathBuf,
        #[command(flatten)]
        opts: SliceOpts,
    },
    /// Slice a generated box with a corner at the origin
    Cube {
        /// Edge length (mm)
        #[arg(long, default_value_t = 10.0)]
        size: f32,
        #[command(flatten)]
        opts: SliceOpts,
    },
    /// Parse a G-code file and report what it contains
    Inspect {
        /// G-code file to read
        file: PathBuf,
        /// Dump the parsed moves as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SliceOpts {
    /// Printer config (TOML); defaults apply to missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output G-code file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Override the plane spacing from the config
    #[arg(long)]
    z_res: Option<f64>,
    /// Point each layer's starting segment is chosen relative to
    #[arg(long, value_enum, default_value_t = Anchor::Origin)]
    anchor: Anchor,
    /// Uniform scale applied to the mesh before slicing
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    scale: f64,
    /// Rotate the mesh about X (degrees); 90 stands a Y-up model upright
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate_x: f64,
    /// Lift the mesh so its lowest point sits at Z=0
    #[arg(long)]
    on_bed: bool,
}

impl SliceOpts {
    /// Placement from the command line: scale first, then rotate.
    fn placement(&self) -> Result<Transform> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("--scale must be a positive number, got {}", self.scale);
        }
        let scale = Transform::scale(self.scale, self.scale, self.scale);
        Ok(Transform::rotation_x(self.rotate_x.to_radians()).then(&scale))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Anchor {
    /// Closest to the world origin
    Origin,
    /// Closest to where the previous layer ended
    Reference,
}

impl From<Anchor> for StartAnchor {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::Origin => StartAnchor::Origin,
            Anchor::Reference => StartAnchor::Reference,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Slice { mesh, opts } => {
            let mesh = load_mesh(&mesh)?;
            run_slice(mesh, &opts)?;
        }
        Commands::Cube { size, opts } => {
            run_slice(Mesh::cuboid([size, size, size]), &opts)?;
        }
        Commands::Inspect { file, json } => {
            inspect(&file, json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read mesh {}", path.display()))?;
    let mesh: Mesh = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a mesh JSON document", path.display()))?;
    info!(path = %path.display(), vertices = mesh.vertex_count(), "Loaded mesh");
    Ok(mesh)
}

fn load_config(opts: &SliceOpts) -> Result<PrinterConfig> {
    let mut config = match &opts.config {
        Some(path) => PrinterConfig::load(path)
            .with_context(|| format!("failed to load printer config {}", path.display()))?,
        None => PrinterConfig::default(),
    };
    if let Some(z_res) = opts.z_res {
        config.z_res = z_res;
        config.validate().context("invalid --z-res")?;
    }
    Ok(config)
}

fn run_slice(mesh: Mesh, opts: &SliceOpts) -> Result<()> {
    let config = load_config(opts)?;
    let mesh = mesh.transformed(&opts.placement()?);
    let mesh = if opts.on_bed { mesh.place_on_bed() } else { mesh };

    let sliced = slice_mesh(&mesh, &config.slice_settings(opts.anchor.into()))
        .context("slicing failed")?;
    let toolpath = plan_moves(&sliced.segments, &config);
    let gcode = write_gcode(&toolpath.moves);

    match &opts.output {
        Some(path) => {
            fs::write(path, &gcode)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{gcode}"),
    }

    print_summary(&sliced, &toolpath);
    Ok(())
}

fn print_summary(sliced: &SliceOutput, toolpath: &Toolpath) {
    let stats = &sliced.stats;
    if stats.input_rejected {
        eprintln!("Mesh rejected: vertex buffer missing or malformed");
        return;
    }
    if let Some((z_min, z_max)) = stats.z_range {
        eprintln!("Z range:          {z_min:.3} .. {z_max:.3}");
    }
    eprintln!("Planes visited:   {}", stats.planes_visited);
    eprintln!("Layers accepted:  {}", stats.layers_accepted);
    eprintln!("Degenerate:       {}", stats.degenerate_layers);
    eprintln!("Broken chains:    {}", stats.broken_chains);
    if stats.classification_faults > 0 {
        eprintln!("Skipped faces:    {}", stats.classification_faults);
    }
    eprintln!("Segments:         {}", sliced.segments.len());

    let path = &toolpath.stats;
    eprintln!(
        "Moves:            {} print, {} travel",
        path.print_moves, path.travel_moves
    );
    eprintln!(
        "Distance:         {:.2} mm printed, {:.2} mm travel",
        path.printed_distance, path.travel_distance
    );
    eprintln!("Filament:         {:.5} mm", path.total_extrusion);
}

fn inspect(file: &Path, json: bool) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let parsed = parse_gcode(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed.moves)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    for warning in &parsed.warnings {
        println!(
            "  line {}: skipped {:?} ({:?})",
            warning.line, warning.token, warning.kind
        );
    }
    if !parsed.discarded_lines.is_empty() {
        println!("  Discarded lines: {}", parsed.discarded_lines.len());
    }

    let toolpath = parsed.into_toolpath();
    let stats = &toolpath.stats;
    println!("  Moves: {} print, {} travel", stats.print_moves, stats.travel_moves);
    println!(
        "  Distance: {:.2} mm printed, {:.2} mm travel",
        stats.printed_distance, stats.travel_distance
    );
    println!("  Filament: {:.5} mm", stats.total_extrusion);
    if let Some(last) = toolpath.moves.last() {
        println!(
            "  Ends at: ({:.3}, {:.3}, {:.3})",
            last.end.x, last.end.y, last.end.z
        );
    }

    Ok(())
}

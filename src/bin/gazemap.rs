use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use gazemap::{
    Algorithm, HeatmapService, MemoryBackgrounds, Raster, ServiceConfig,
    simulate::{RandomWalk, compare_algorithms, random_walk_points},
};

#[derive(Parser, Debug)]
#[command(name = "gazemap", version)]
struct Cli {
    /// Log debug detail (cache hits, grid sizes).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a heatmap from a points JSON file over a background image.
    Render(RenderArgs),
    /// Generate random-walk points, time both estimators, render the result.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct EstimationArgs {
    /// Service config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kernel bandwidth in pixels.
    #[arg(long, env = "GAZEMAP_BANDWIDTH")]
    bandwidth: Option<f64>,

    /// Grid cell size in pixels.
    #[arg(long = "grid", env = "GAZEMAP_GRID_SPACING")]
    grid_spacing: Option<f64>,

    /// Density estimator: `brute-force` or `bounded-radius`.
    #[arg(long, env = "GAZEMAP_ALGORITHM")]
    algorithm: Option<Algorithm>,
}

impl EstimationArgs {
    fn resolve(&self) -> anyhow::Result<ServiceConfig> {
        let mut cfg = match &self.config {
            Some(path) => ServiceConfig::from_path(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(b) = self.bandwidth {
            cfg.default_bandwidth = b;
        }
        if let Some(s) = self.grid_spacing {
            cfg.default_grid_spacing = s;
        }
        if let Some(a) = self.algorithm {
            cfg.algorithm = a;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Background image (PNG or any still format).
    #[arg(long)]
    background: PathBuf,

    /// Points JSON: `{"points": [[x, y], ...]}`.
    #[arg(long)]
    points: PathBuf,

    /// Surface id used for the cache key (defaults to the background file stem).
    #[arg(long)]
    surface: Option<String>,

    #[command(flatten)]
    estimation: EstimationArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Background image; a white canvas of `--width x --height` when omitted.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Canvas width when no background is given.
    #[arg(long, default_value_t = 500)]
    width: u32,

    /// Canvas height when no background is given.
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Number of random walkers.
    #[arg(long, env = "GAZEMAP_WALKERS", default_value_t = 200)]
    walkers: usize,

    /// Points generated per walker.
    #[arg(long, env = "GAZEMAP_POINTS_PER_WALKER", default_value_t = 2000)]
    points_per_walker: usize,

    /// Random-walk step length in pixels.
    #[arg(long, env = "GAZEMAP_STEP", default_value_t = 5.0)]
    step: f64,

    /// RNG seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    estimation: EstimationArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.estimation.resolve()?;
    let surface = match args.surface {
        Some(s) => s,
        None => args
            .background
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned)
            .context("cannot derive a surface id from the background path; pass --surface")?,
    };

    let backgrounds = MemoryBackgrounds::new();
    backgrounds.insert(surface.clone(), gazemap::load_raster_file(&args.background)?);
    let service = HeatmapService::new(cfg, Arc::new(backgrounds))?;

    let body = std::fs::read(&args.points)
        .with_context(|| format!("read points '{}'", args.points.display()))?;
    let uploaded = service.upload_json(&surface, &body)?;
    tracing::info!(surface = %surface, uploaded, "loaded points");

    let artifact = service.request_default_heatmap(&surface)?;
    gazemap::write_png(&artifact.raster, &args.out)?;
    eprintln!(
        "wrote {} ({}x{} grid, fingerprint {:016x})",
        args.out.display(),
        artifact.grid_size.0,
        artifact.grid_size.1,
        artifact.fingerprint
    );
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let cfg = args.estimation.resolve()?;
    let background = match &args.background {
        Some(path) => gazemap::load_raster_file(path)?,
        None => Raster::solid(args.width, args.height, [255, 255, 255, 255]),
    };

    let walk = RandomWalk {
        walkers: args.walkers,
        points_per_walker: args.points_per_walker,
        step: args.step,
        seed: args.seed,
    };
    let points = random_walk_points(background.width, background.height, &walk);
    eprintln!("generated {} points", points.len());

    let cmp = compare_algorithms(
        &points,
        background.width,
        background.height,
        cfg.default_bandwidth,
        cfg.default_grid_spacing,
    )?;
    eprintln!(
        "brute-force:    {:.3}s",
        cmp.brute_force.elapsed.as_secs_f64()
    );
    eprintln!(
        "bounded-radius: {:.3}s",
        cmp.bounded_radius.elapsed.as_secs_f64()
    );
    eprintln!("max drift vs peak: {:.4}%", cmp.max_relative_diff * 100.0);

    let grid = match cfg.algorithm {
        Algorithm::BruteForce => &cmp.brute_force.grid,
        Algorithm::BoundedRadius => &cmp.bounded_radius.grid,
    };
    let normalized = gazemap::normalize(grid);
    let out = gazemap::render(&normalized, cfg.default_grid_spacing, &background)?;
    gazemap::write_png(&out, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

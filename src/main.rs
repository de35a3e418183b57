// Demo: scatter random weighted points, rasterize them, then write a PNG
// and/or show the result in a window.
// • --png out.png   writes the RGBA raster (alpha kept, texture-ready)
// • --window        opens a preview; R reshuffles the points, ESC quits
// • --plane         sizes the raster to the data's bounding box, as a 3D plane would

use std::path::PathBuf;

use clap::Parser;
use heatmap_plane::config::{self, HeatmapConfig};
use heatmap_plane::demo::{Rng32, random_points};
use heatmap_plane::export::{composite_over, save_png};
use heatmap_plane::window::Preview;
use heatmap_plane::{Error, Heatmap, HeatmapPlane, Raster, WeightedPoint};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Background behind the heatmap in the preview window.
const BACKGROUND: u32 = 0x00_10_12_18;

/// Render a density heat-map from random sample points.
#[derive(Parser, Debug)]
#[command(name = "heatmap-plane", version, about)]
struct Args {
    /// TOML config (size, max, radius, blur, gradient).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of random points.
    #[arg(short = 'n', long, default_value_t = 3)]
    points: usize,

    /// RNG seed for the points.
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Point values are drawn from [0, max-value).
    #[arg(long, default_value_t = 1500.0)]
    max_value: f32,

    /// Write the raster here as PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Show the raster in a window.
    #[arg(long)]
    window: bool,

    /// Fit the raster to the points' bounding box.
    #[arg(long)]
    plane: bool,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let directive = args.log_level.as_deref().unwrap_or("heatmap_plane=info");
    let filter = match directive.parse::<Directive>() {
        Ok(d) => EnvFilter::from_default_env().add_directive(d),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => HeatmapConfig::default(),
    };

    let mut rng = Rng32::from_seed(args.seed);
    let scatter = |rng: &mut Rng32| {
        random_points(rng, args.points, cfg.width as f32, cfg.height as f32, args.max_value)
    };
    let mut points = scatter(&mut rng);

    let mut target = if args.plane {
        Target::Plane(HeatmapPlane::with_heatmap(cfg.build()?)?)
    } else {
        Target::Flat(cfg.build()?)
    };
    let raster = target.render(&points, cfg.min_opacity)?;
    tracing::info!(
        points = points.len(),
        width = raster.width(),
        height = raster.height(),
        "rendered heatmap"
    );

    if let Some(path) = &args.png {
        save_png(&raster, path)?;
    }

    if args.window {
        let mut raster = raster;
        let mut preview = Preview::new(
            "heatmap-plane | R: reshuffle  ESC: quit",
            raster.width() as usize,
            raster.height() as usize,
        )?;
        let mut frame = composite_over(&raster, BACKGROUND);
        while preview.is_open() {
            if preview.r_pressed_once() {
                points = scatter(&mut rng);
                raster = target.render(&points, cfg.min_opacity)?;
                frame = composite_over(&raster, BACKGROUND);
                tracing::info!("reshuffled {} points", points.len());
            }
            preview.present(&frame)?;
        }
    }

    Ok(())
}

/// Where the points end up: the configured raster, or a plane fitted to the data
/// (plane max 2000, no opacity floor).
enum Target {
    Flat(Heatmap),
    Plane(HeatmapPlane),
}

impl Target {
    fn render(&mut self, points: &[WeightedPoint], min_opacity: f32) -> Result<Raster, Error> {
        match self {
            Target::Flat(heatmap) => {
                heatmap.set_points(points.iter().copied());
                Ok(heatmap.draw(Some(min_opacity))?.clone())
            }
            Target::Plane(plane) => {
                let tex = plane.update(points)?;
                tracing::info!(scale = ?tex.scale, revision = tex.revision, "plane texture updated");
                Ok(plane.heatmap().raster().clone())
            }
        }
    }
}

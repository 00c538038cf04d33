use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{ error, info, Level };

use ray_caster::canvas::Canvas;
use ray_caster::consts::OUT_FILE;
use ray_caster::error::Result;
use ray_caster::parallel::render_with_camera;
use ray_caster::scene::Scene;

/// Render a scene of spheres, cylinders and planes to an image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scene description; renders the built-in demo when omitted
    #[clap(short, long, parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Canvas width in pixels, overriding the scene
    #[clap(long)]
    width: Option<usize>,

    /// Canvas height in pixels, overriding the scene
    #[clap(long)]
    height: Option<usize>,

    /// Number of render workers [default: number of logical CPUs]
    #[clap(short, long)]
    workers: Option<usize>,

    /// Output image [default: ./out.png]; `.ppm` is written as plain PPM,
    /// other extensions go through the image encoder
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Log per-worker progress
    #[clap(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[clap(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn run(args: Args) -> Result<()> {
    let mut scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => {
            info!("no scene given, rendering the demo scene");
            Scene::demo()?
        }
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or(scene.camera.hsize);
        let height = args.height.unwrap_or(scene.camera.vsize);
        scene = scene.with_canvas_size(width, height)?;
    }

    let workers = args.workers.unwrap_or_else(num_cpus::get);
    let canvas = Canvas::filled(scene.camera.hsize, scene.camera.vsize,
        scene.world.background);

    render_with_camera(&canvas, &scene.camera, &scene.world, workers)?;

    let output = args.output.unwrap_or_else(|| PathBuf::from(OUT_FILE));
    canvas.save(&output)?;
    info!("wrote {}", output.display());

    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}

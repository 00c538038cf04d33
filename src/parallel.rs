use std::ops::Range;
use std::time::Instant;

use tracing::{ debug, error, info };

use crate::camera::Camera;
use crate::canvas::PixelSink;
use crate::color::Color;
use crate::consts::PRIMARY_T_MIN;
use crate::error::{ Error, Result, invalid };
use crate::world::World;

/// Renders a world onto a sink using a fixed pool of worker threads.
///
/// Uses the default viewport for a `width` by `height` canvas. See
/// `render_with_camera`.
pub fn render_parallel_rows<S>(sink: &S, width: usize, height: usize,
    world: &World, worker_count: usize) -> Result<()>
    where S: PixelSink + ?Sized {
    let camera = Camera::new(width, height)?;
    render_with_camera(sink, &camera, world, worker_count)
}

/// Renders a world through a camera onto a sink.
///
/// Rows are split into at most `worker_count` contiguous blocks, one per
/// worker, so no two workers ever write the same pixel. The call blocks until
/// every worker has finished. If any worker fails, the first failure (in row
/// order) is returned once all of them have stopped.
pub fn render_with_camera<S>(sink: &S, camera: &Camera, world: &World,
    worker_count: usize) -> Result<()>
    where S: PixelSink + ?Sized {
    info!(
        "rendering {}x{} ({} objects, {} lights)",
        camera.hsize, camera.vsize, world.objects.len(), world.lights.len()
    );

    render_rows_with(sink, camera.hsize, camera.vsize, worker_count, |x, y| {
        let ray = camera.ray_for_pixel(x, y);
        world.trace_ray(&ray, PRIMARY_T_MIN, f64::INFINITY)
    })
}

/// Runs `trace` for every pixel of a `width` by `height` canvas on a pool of
/// scoped workers, writing the packed results to `sink`.
fn render_rows_with<S, F>(sink: &S, width: usize, height: usize,
    worker_count: usize, trace: F) -> Result<()>
    where S: PixelSink + ?Sized, F: Fn(usize, usize) -> Result<Color> + Sync {
    if worker_count == 0 {
        return invalid("at least one render worker is required");
    }

    let blocks = partition_rows(height, worker_count);
    info!("dispatching {} row blocks to workers", blocks.len());
    let start = Instant::now();

    let trace = &trace;
    let outcome = crossbeam::scope(|scope| {
        let handles: Vec<_> = blocks.iter().cloned().map(|rows| {
            scope.spawn(move |_| render_block(sink, width, rows, trace))
        }).collect();

        // Join every worker before looking at any result.
        handles.into_iter().enumerate().map(|(worker, handle)| {
            handle.join().unwrap_or(Err(Error::WorkerPanicked { worker }))
        }).collect::<Vec<_>>()
    });

    // Every handle is joined above, so the scope itself only fails if a
    // worker panicked while unwinding.
    let results = outcome.map_err(|_| Error::WorkerPanicked { worker: 0 })?;

    let mut first_failure = None;
    for result in results {
        if let Err(e) = result {
            error!("render worker failed: {}", e);
            first_failure.get_or_insert(e);
        }
    }

    if let Some(e) = first_failure {
        return Err(e);
    }

    info!("render finished in {:.2?}", start.elapsed());
    Ok(())
}

/// Splits `height` rows into at most `workers` contiguous, non-empty blocks.
///
/// Blocks are as even as possible; the first `height % workers` blocks get
/// one extra row.
pub fn partition_rows(height: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1).min(height);
    if workers == 0 {
        return Vec::new();
    }

    let base = height / workers;
    let extra = height % workers;

    let mut blocks = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let len = base + if i < extra { 1 } else { 0 };
        blocks.push(start..start + len);
        start += len;
    }

    blocks
}

/// Traces every pixel in a block of rows and writes it to the sink.
///
/// Stops at the first pixel that fails; rows already traced stay written.
fn render_block<S, F>(sink: &S, width: usize, rows: Range<usize>, trace: &F)
    -> Result<()>
    where S: PixelSink + ?Sized, F: Fn(usize, usize) -> Result<Color> {
    debug!("rendering rows {}..{}", rows.start, rows.end);

    for y in rows.clone() {
        for x in 0..width {
            let color = trace(x, y).map_err(|e| Error::RenderTask {
                first_row: rows.start,
                last_row: rows.end - 1,
                source: Box::new(e),
            })?;

            sink.set_pixel(x, y, color.to_packed());
        }
    }

    debug!("finished rows {}..{}", rows.start, rows.end);
    Ok(())
}

#[cfg(test)]
use crate::{
    canvas::Canvas,
    light::{ Light, Material },
    shape::Shape,
    vector::Vector3,
};

#[cfg(test)]
fn mixed_world() -> World {
    let objects = vec![
        Shape::sphere(Vector3::new(0.0, -1.0, 3.0), 1.0,
            Material::new(Color::red(), Some(0.5)).unwrap()).unwrap(),
        Shape::sphere(Vector3::new(2.0, 0.0, 4.0), 1.0,
            Material::new(Color::blue(), Some(0.5)).unwrap()).unwrap(),
        Shape::cylinder(Vector3::new(-2.0, -1.0, 5.0), Vector3::new(0.2, 1.0, 0.1),
            0.6, 2.0, Material::new(Color::green(), Some(0.01)).unwrap()).unwrap(),
        Shape::plane(Vector3::new(0.0, -2.0, 0.0), Vector3::up(),
            Material::matte(Color::yellow())).unwrap(),
    ];

    let lights = vec![
        Light::ambient(0.2).unwrap(),
        Light::point(0.6, Vector3::new(2.0, 1.0, 0.0)).unwrap(),
        Light::directional(0.2, Vector3::new(1.0, 4.0, 4.0)).unwrap(),
    ];

    World::new(objects, lights)
}

#[test]
fn partition_covers_every_row_once() {
    let blocks = partition_rows(10, 3);

    assert_eq!(blocks, vec![0..4, 4..7, 7..10]);
}

#[test]
fn partition_with_more_workers_than_rows() {
    let blocks = partition_rows(3, 8);

    assert_eq!(blocks, vec![0..1, 1..2, 2..3]);
}

#[test]
fn single_ambient_lit_sphere() {
    let sphere = Shape::sphere(Vector3::new(0.0, 0.0, 3.0), 1.0,
        Material::matte(Color::red())).unwrap();
    let world = World::new(vec![sphere], vec![Light::ambient(1.0).unwrap()]);
    let canvas = Canvas::new(800, 600);

    render_parallel_rows(&canvas, 800, 600, &world, 4).unwrap();

    assert_eq!(canvas.read_pixel(400, 300), Some(Color::red()));
    assert_eq!(canvas.read_pixel(0, 0), Some(world.background));
    assert_eq!(canvas.read_pixel(799, 599), Some(world.background));
    assert_eq!(canvas.read_pixel(20, 300), Some(world.background));
}

#[test]
fn empty_world_renders_background() {
    let world = World::empty().with_background(Color::rgb(1, 2, 3));
    let canvas = Canvas::new(16, 9);

    render_parallel_rows(&canvas, 16, 9, &world, 2).unwrap();

    assert!(canvas.pixels().iter().all(|p| *p == Color::rgb(1, 2, 3)));
}

#[test]
fn worker_count_does_not_change_the_image() {
    let world = mixed_world();

    let single = Canvas::new(120, 90);
    render_parallel_rows(&single, 120, 90, &world, 1).unwrap();

    let many = Canvas::new(120, 90);
    render_parallel_rows(&many, 120, 90, &world, 8).unwrap();

    assert_eq!(single.pixels(), many.pixels());
    // Make sure the scene actually put something on screen.
    assert!(single.pixels().iter().any(|p| *p != world.background));
}

#[test]
fn every_pixel_written_exactly_once() {
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct CountingSink {
        width: usize,
        counts: Vec<AtomicUsize>,
    }

    impl PixelSink for CountingSink {
        fn set_pixel(&self, x: usize, y: usize, _rgb: u32) {
            self.counts[y * self.width + x].fetch_add(1, Ordering::SeqCst);
        }
    }

    let sink = CountingSink {
        width: 37,
        counts: (0..37 * 23).map(|_| AtomicUsize::new(0)).collect(),
    };

    render_parallel_rows(&sink, 37, 23, &mixed_world(), 5).unwrap();

    assert!(sink.counts.iter().all(|c| c.load(Ordering::SeqCst) == 1));
}

#[test]
fn floor_under_directional_light() {
    let floor = Shape::plane(Vector3::new(0.0, -1.0, 0.0), Vector3::up(),
        Material::new(Color::rgb(100, 100, 100), Some(0.0)).unwrap()).unwrap();
    let world = World::new(vec![floor], vec![
        Light::directional(0.5, Vector3::up()).unwrap(),
    ]);
    let canvas = Canvas::new(80, 60);

    render_parallel_rows(&canvas, 80, 60, &world, 3).unwrap();

    // Bottom row looks steeply down at the floor; the row just below the
    // horizon grazes it.
    let steep = canvas.read_pixel(40, 59).unwrap();
    let grazing = canvas.read_pixel(40, 31).unwrap();
    assert!(steep.r > grazing.r);

    // Rows above the horizon never reach the floor.
    assert_eq!(canvas.read_pixel(40, 0), Some(world.background));
}

#[test]
fn invalid_render_arguments_fail_before_dispatch() {
    let world = World::empty();
    let canvas = Canvas::new(4, 4);

    assert!(matches!(render_parallel_rows(&canvas, 4, 4, &world, 0),
        Err(Error::Validation(_))));
    assert!(matches!(render_parallel_rows(&canvas, 0, 4, &world, 1),
        Err(Error::Validation(_))));
    assert!(matches!(render_parallel_rows(&canvas, 4, 0, &world, 1),
        Err(Error::Validation(_))));
}

#[test]
fn panicking_sink_fails_the_render() {
    struct FlakySink;

    impl PixelSink for FlakySink {
        fn set_pixel(&self, _x: usize, y: usize, _rgb: u32) {
            if y == 7 {
                panic!("display went away");
            }
        }
    }

    let result = render_parallel_rows(&FlakySink, 8, 8, &World::empty(), 4);

    assert!(matches!(result, Err(Error::WorkerPanicked { worker: 3 })));
}

#[test]
fn failing_blocks_report_the_lowest_one() {
    let canvas = Canvas::new(4, 8);

    // Four blocks of two rows; rows 3 and 6 sit in the second and fourth.
    let result = render_rows_with(&canvas, 4, 8, 4, |_, y| {
        if y == 3 || y == 6 {
            Err(Error::DegenerateVector)
        } else {
            Ok(Color::red())
        }
    });

    match result {
        Err(Error::RenderTask { first_row, last_row, source }) => {
            assert_eq!((first_row, last_row), (2, 3));
            assert!(matches!(*source, Error::DegenerateVector));
        },
        other => panic!("expected a render task error, got {:?}", other),
    }

    // The healthy blocks still finished.
    for &y in [0, 1, 4, 5].iter() {
        for x in 0..4 {
            assert_eq!(canvas.read_pixel(x, y), Some(Color::red()));
        }
    }

    // Failing blocks keep the rows traced before the failure.
    assert_eq!(canvas.read_pixel(3, 2), Some(Color::red()));
    assert_eq!(canvas.read_pixel(0, 3), Some(Color::black()));
    assert_eq!(canvas.read_pixel(0, 7), Some(Color::black()));
}

use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use parking_lot::Mutex;

use crate::color::Color;
use crate::error::Result;

/// A display surface the renderer writes pixels to.
///
/// Colors arrive packed as `0x00RRGGBB` (see `Color::to_packed`). Render
/// workers call `set_pixel` concurrently from several threads, so
/// implementations must tolerate concurrent writes through a shared
/// reference. Writes are best-effort: a sink that can no longer display
/// anything (say, a closed window) should drop pixels rather than panic.
pub trait PixelSink: Sync {
    fn set_pixel(&self, x: usize, y: usize, rgb: u32);
}

impl<'a, S: PixelSink + ?Sized> PixelSink for &'a S {
    fn set_pixel(&self, x: usize, y: usize, rgb: u32) {
        (**self).set_pixel(x, y, rgb)
    }
}

/// A canvas for drawing pixels.
///
/// Every row of the canvas sits behind its own lock, which makes it a
/// `PixelSink` render workers can share without contending on disjoint rows.
/// Once rendering finishes, the canvas can be saved to an image file.
#[derive(Debug)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, one locked vector per row.
    rows: Vec<Mutex<Vec<Color>>>,
}

impl PixelSink for Canvas {
    /// Out-of-bounds pixels are ignored.
    fn set_pixel(&self, x: usize, y: usize, rgb: u32) {
        self.write_pixel(x, y, Color::from_packed(rgb))
    }
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    ///
    /// This function allocates `width * height` colors, which may take up a
    /// decent amount of memory, depending on image size.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas::filled(width, height, Color::black())
    }

    /// Creates a canvas with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Canvas {
        Canvas {
            width,
            height,
            rows: (0..height).map(|_| Mutex::new(vec![color; width])).collect(),
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use ray_caster::color::Color;
    /// # use ray_caster::canvas::Canvas;
    /// let purple = Color::rgb(255, 0, 255);
    /// let canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&self, x: usize, y: usize, pixel: Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.rows[y].lock()[x] = pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.rows[y].lock()[x])
    }

    /// Copies out every pixel, row by row.
    pub fn pixels(&self) -> Vec<Color> {
        self.rows.iter().flat_map(|row| row.lock().clone()).collect()
    }

    /// Converts the canvas into an 8-bit RGB image.
    pub fn to_image(&self) -> image::RgbImage {
        let pixels = self.pixels();
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            pixels[(y as usize * self.width) + x as usize].into()
        })
    }

    /// Saves the canvas to a file.
    ///
    /// Paths ending in `.ppm` are written as plain-text PPM; anything else is
    /// handed to the `image` crate, which picks the format from the extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let is_ppm = path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("ppm"))
            .unwrap_or(false);

        if is_ppm {
            let out = BufWriter::new(File::create(path)?);
            self.write_ppm(out)?;
        } else {
            self.to_image().save(path)?;
        }

        Ok(())
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Lines in the PPM file are clamped to 70 columns. If some color exceeds
    /// the 70 column mark on a line, it is moved to the next line over.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        // Write PPM header, as well as metadata
        writeln!(&mut out, "P3")?;
        writeln!(&mut out, "{} {}", self.width, self.height)?;
        writeln!(&mut out, "255")?; // Maximum color value

        let mut col = 1;
        for pixel in self.pixels().iter() {
            for channel in [pixel.r, pixel.g, pixel.b].iter() {
                let s = channel.to_string();

                if col == 1 {
                    write!(&mut out, "{}", s)?;
                    col += s.len();
                } else if col + 1 + s.len() > 70 {
                    write!(&mut out, "\n{}", s)?;
                    col = 1 + s.len();
                } else {
                    write!(&mut out, " {}", s)?;
                    col += 1 + s.len();
                }
            }
        }

        // Terminate the PPM file with a newline
        writeln!(&mut out)?;
        out.flush()
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let c = Canvas::new(2, 2);
    c.set_pixel(2, 0, Color::red().to_packed());
    c.set_pixel(0, 5, Color::red().to_packed());

    assert!(c.pixels().iter().all(|p| *p == Color::black()));
    assert_eq!(c.read_pixel(2, 0), None);
}

#[test]
fn ppm_header_and_pixels() {
    let c = Canvas::new(5, 3);
    c.write_pixel(0, 0, Color::rgb(255, 0, 0));
    c.write_pixel(2, 1, Color::rgb(0, 128, 0));
    c.write_pixel(4, 2, Color::rgb(0, 0, 255));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "5 3");
    assert_eq!(lines[2], "255");
    assert!(lines[3].starts_with("255 0 0 0 0 0"));
    assert!(ppm.ends_with("0 0 255\n"));
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let c = Canvas::filled(10, 2, Color::rgb(255, 204, 153));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    assert!(ppm.lines().all(|l| l.len() <= 70));
    let values = ppm.lines().skip(3).flat_map(|l| l.split(' ')).count();
    assert_eq!(values, 10 * 2 * 3);
}

#[test]
fn concurrent_writes_land() {
    let c = Canvas::new(64, 64);

    crossbeam::scope(|scope| {
        for row in 0..64 {
            let c = &c;
            scope.spawn(move |_| {
                for x in 0..64 {
                    c.set_pixel(x, row, Color::rgb(x as u8, row as u8, 7).to_packed());
                }
            });
        }
    }).unwrap();

    assert_eq!(c.read_pixel(5, 9), Some(Color::rgb(5, 9, 7)));
    assert_eq!(c.read_pixel(63, 63), Some(Color::rgb(63, 63, 7)));
}

#[test]
fn image_conversion_keeps_channels() {
    let c = Canvas::new(3, 2);
    c.write_pixel(2, 1, Color::rgb(1, 2, 3));

    let img = c.to_image();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3]);
}

#[test]
fn sink_unpacks_colors() {
    let c = Canvas::new(2, 2);
    c.set_pixel(1, 1, 0x00_12_34_56);

    assert_eq!(c.read_pixel(1, 1), Some(Color::rgb(0x12, 0x34, 0x56)));
    assert_eq!(c.read_pixel(0, 1), Some(Color::black()));
}

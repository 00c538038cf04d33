use crate::consts::{ VIEWPORT_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_DISTANCE };
use crate::error::{ Result, invalid };
use crate::ray::Ray;
use crate::vector::Vector3;

/// A camera record mapping canvas pixels to rays.
///
/// The camera sits at the world origin looking down +Z. The viewport is a
/// `viewport_width` by `viewport_height` rectangle `distance` units in front
/// of it, and each canvas pixel maps to a point on that rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub viewport_width: f64,
    pub viewport_height: f64,
    pub distance: f64,

    pub origin: Vector3,
}

impl Camera {
    /// Creates a camera with the default viewport.
    pub fn new(hsize: usize, vsize: usize) -> Result<Camera> {
        Camera::with_viewport(hsize, vsize,
            VIEWPORT_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_DISTANCE)
    }

    pub fn with_viewport(hsize: usize, vsize: usize, viewport_width: f64,
        viewport_height: f64, distance: f64) -> Result<Camera> {
        if hsize == 0 || vsize == 0 {
            return invalid(format!(
                "canvas must be at least 1x1, got {}x{}", hsize, vsize
            ));
        }

        for &(what, value) in [
            ("viewport width", viewport_width),
            ("viewport height", viewport_height),
            ("viewport distance", distance),
        ].iter() {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{} must be positive, got {}", what, value));
            }
        }

        Ok(Camera {
            hsize,
            vsize,
            viewport_width,
            viewport_height,
            distance,
            origin: Vector3::zero(),
        })
    }

    /// Maps centered canvas coordinates to a direction through the viewport.
    ///
    /// `x` grows to the right and `y` grows upward, both measured from the
    /// center of the canvas.
    pub fn canvas_to_viewport(&self, x: f64, y: f64) -> Vector3 {
        Vector3::new(
            x * self.viewport_width / self.hsize as f64,
            y * self.viewport_height / self.vsize as f64,
            self.distance,
        )
    }

    /// Builds the ray through an image pixel.
    ///
    /// Image pixels count from the top-left corner with `py` growing
    /// downward, so the row is flipped before mapping to the viewport.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        let x = px as f64 - self.hsize as f64 / 2.0;
        let y = self.vsize as f64 / 2.0 - py as f64;

        Ray::new(self.origin, self.canvas_to_viewport(x, y))
    }
}

#[test]
fn ray_through_center() {
    let c = Camera::new(800, 600).unwrap();
    let r = c.ray_for_pixel(400, 300);

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(800, 600).unwrap();

    // Top-left pixel looks up and to the left.
    let r = c.ray_for_pixel(0, 0);
    assert_eq!(r.direction, Vector3::new(-0.5, 0.5, 1.0));

    // Bottom-right pixel looks down and to the right.
    let r = c.ray_for_pixel(799, 599);
    assert_eq!(r.direction, Vector3::new(399.0 / 800.0, -299.0 / 600.0, 1.0));
}

#[test]
fn custom_viewport() {
    let c = Camera::with_viewport(100, 50, 2.0, 1.0, 3.0).unwrap();

    assert_eq!(c.canvas_to_viewport(50.0, -25.0), Vector3::new(1.0, -0.5, 3.0));
}

#[test]
fn mapping_is_deterministic() {
    let c = Camera::new(31, 17).unwrap();

    assert_eq!(c.ray_for_pixel(3, 11), c.ray_for_pixel(3, 11));
}

#[test]
fn malformed_cameras_are_rejected() {
    assert!(Camera::new(0, 10).is_err());
    assert!(Camera::new(10, 0).is_err());
    assert!(Camera::with_viewport(10, 10, 0.0, 1.0, 1.0).is_err());
    assert!(Camera::with_viewport(10, 10, 1.0, 1.0, f64::NAN).is_err());
}

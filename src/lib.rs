pub mod vector;
pub mod ray;
pub mod color;

pub mod shape;
pub mod intersect;
pub mod light;
pub mod world;

pub mod camera;
pub mod canvas;
pub mod parallel;

pub mod scene;

pub mod consts;
pub mod error;

pub use error::{ Error, Result };

use consts::FEQ_EPSILON;

/// Compares two floats for equality within `FEQ_EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

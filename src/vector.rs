use std::convert::TryFrom;
use std::ops::{ Add, Sub, Neg, Mul };

use crate::error::{ Error, Result, invalid };
use crate::feq;

/// A 3D vector, also used for points.
///
/// Equality is component-wise, within `FEQ_EPSILON`.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

/// Conversion from a slice of exactly three finite reals.
///
/// Scene descriptions store vectors as JSON arrays, so a slice of the wrong
/// length is reported as a validation error instead of being padded.
impl TryFrom<&[f64]> for Vector3 {
    type Error = Error;

    fn try_from(v: &[f64]) -> Result<Vector3> {
        match *v {
            [x, y, z] => Vector3::try_new(x, y, z),
            _ => invalid(format!(
                "expected a vector of 3 components, got {}", v.len()
            )),
        }
    }
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    /// Creates a vector, rejecting NaN and infinite components.
    pub fn try_new(x: f64, y: f64, z: f64) -> Result<Vector3> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return invalid(format!(
                "vector components must be finite, got ({}, {}, {})", x, y, z
            ));
        }

        Ok(Vector3 { x, y, z })
    }

    pub const fn zero() -> Vector3 {
        Vector3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// The world "up" direction.
    pub const fn up() -> Vector3 {
        Vector3 { x: 0.0, y: 1.0, z: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        f64::sqrt(self.length_squared())
    }

    /// Returns the unit vector with the same direction.
    ///
    /// Fails with `Error::DegenerateVector` when the length is exactly zero.
    pub fn normalize(&self) -> Result<Vector3> {
        let len = self.length();
        if len == 0.0 {
            return Err(Error::DegenerateVector);
        }

        Ok(*self * (1.0 / len))
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn opposite(&self) -> Vector3 {
        -*self
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - (*normal * 2.0 * self.dot(normal))
    }

    /// Splits a vector into its components along and across a unit `axis`.
    ///
    /// Returns `(along, perpendicular)` where `along` is the signed length of
    /// the projection onto `axis`.
    pub fn decompose(&self, axis: &Vector3) -> (f64, Vector3) {
        let along = self.dot(axis);
        (along, *self - *axis * along)
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// use ray_caster::vector::Vector3;
///
/// let v = Vector3::new(1.0, 2.0, 3.0);
/// assert_eq!(v * 2.0, Vector3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Implements scalar left-multiplication for a vector.
///
/// ```
/// use ray_caster::vector::Vector3;
///
/// let v = Vector3::new(1.0, 2.0, 3.0);
/// assert_eq!(2.0 * v, Vector3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        Vector3 {
            x: self * other.x,
            y: self * other.y,
            z: self * other.z,
        }
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a1 = Vector3::new(3.0, -2.0, 5.0);
    let a2 = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let p1 = Vector3::new(3.0, 2.0, 1.0);
    let p2 = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn opposite_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a.opposite(), Vector3::new(-1.0, 2.0, -3.0));
    assert_eq!(-a, a.opposite());
}

#[test]
fn mul_scalar() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector3::new(3.5, -7.0, 10.5));
    assert_eq!(0.5 * a, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn length_of_vectors() {
    assert_eq!(Vector3::new(1.0, 2.0, 3.0).length(), f64::sqrt(14.0));
    assert_eq!(Vector3::new(-1.0, -2.0, -3.0).length(), f64::sqrt(14.0));
}

#[test]
fn normalize_clean() {
    let v = Vector3::new(4.0, 0.0, 0.0);

    assert_eq!(v.normalize().unwrap(), Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let e = Vector3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    let n = v.normalize().unwrap();
    assert_eq!(n, e);
    assert!(feq(n.length(), 1.0));
}

#[test]
fn normalize_zero_is_degenerate() {
    let err = Vector3::zero().normalize().unwrap_err();

    assert!(matches!(err, Error::DegenerateVector));
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn decompose_along_axis() {
    let v = Vector3::new(3.0, 4.0, 5.0);
    let (along, perp) = v.decompose(&Vector3::up());

    assert_eq!(along, 4.0);
    assert_eq!(perp, Vector3::new(3.0, 0.0, 5.0));
}

#[test]
fn try_new_rejects_non_finite() {
    assert!(Vector3::try_new(1.0, f64::NAN, 0.0).is_err());
    assert!(Vector3::try_new(f64::INFINITY, 0.0, 0.0).is_err());
    assert!(Vector3::try_new(1.0, 2.0, 3.0).is_ok());
}

#[test]
fn try_from_slice_checks_dimension() {
    let ok = Vector3::try_from(&[1.0f64, 2.0, 3.0][..]).unwrap();
    assert_eq!(ok, Vector3::new(1.0, 2.0, 3.0));

    let short = Vector3::try_from(&[1.0f64, 2.0][..]);
    assert!(matches!(short, Err(Error::Validation(_))));

    let long = Vector3::try_from(&[1.0f64, 2.0, 3.0, 4.0][..]);
    assert!(matches!(long, Err(Error::Validation(_))));
}

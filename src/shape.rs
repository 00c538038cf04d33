use crate::color::Color;
use crate::consts::{ FEQ_EPSILON, PARALLEL_EPSILON };
use crate::error::{ Result, invalid };
use crate::light::Material;
use crate::ray::Ray;
use crate::vector::Vector3;

/// The geometry of a `Shape`.
///
/// Every variant is expressed directly in world space. Axes are normalized
/// when the shape is constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeType {
    /// A sphere around `center`.
    Sphere { center: Vector3, radius: f64 },

    /// A finite cylinder closed by two flat caps. The bottom cap is centered
    /// on `base_center`, the top cap `height` further along `axis`.
    Cylinder { base_center: Vector3, axis: Vector3, radius: f64, height: f64 },

    /// An infinite plane through `point`, with normal `axis`.
    Plane { point: Vector3, axis: Vector3 },
}

/// A renderable object: a piece of geometry plus its surface material.
///
/// Shapes are validated when built and immutable afterwards, so a `World`
/// can share them between render workers without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    ty: ShapeType,
    material: Material,
}

impl Shape {
    /// Creates a sphere. The radius must be positive.
    pub fn sphere(center: Vector3, radius: f64, material: Material)
        -> Result<Shape> {
        check_point("sphere center", center)?;
        check_positive("sphere radius", radius)?;

        Ok(Shape {
            ty: ShapeType::Sphere { center, radius },
            material,
        })
    }

    /// Creates a capped cylinder standing on `base_center` along `axis`.
    pub fn cylinder(base_center: Vector3, axis: Vector3, radius: f64,
        height: f64, material: Material) -> Result<Shape> {
        check_point("cylinder base center", base_center)?;
        let axis = check_axis("cylinder axis", axis)?;
        check_positive("cylinder radius", radius)?;
        check_positive("cylinder height", height)?;

        Ok(Shape {
            ty: ShapeType::Cylinder { base_center, axis, radius, height },
            material,
        })
    }

    /// Creates a plane through `point` with normal `axis`.
    pub fn plane(point: Vector3, axis: Vector3, material: Material)
        -> Result<Shape> {
        check_point("plane point", point)?;
        let axis = check_axis("plane axis", axis)?;

        Ok(Shape {
            ty: ShapeType::Plane { point, axis },
            material,
        })
    }

    pub fn ty(&self) -> &ShapeType {
        &self.ty
    }

    /// Returns a reference to this Shape's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn color(&self) -> Color {
        self.material.color
    }

    pub fn specular(&self) -> Option<f64> {
        self.material.specular
    }

    /// The orientation of the shape.
    ///
    /// This is the cylinder's axis or the plane's normal. Spheres have no
    /// orientation and report the world up direction.
    pub fn axis(&self) -> Vector3 {
        match self.ty {
            ShapeType::Sphere { .. } => Vector3::up(),
            ShapeType::Cylinder { axis, .. }
                | ShapeType::Plane { axis, .. } => axis,
        }
    }

    /// Intersects a ray with this shape.
    ///
    /// Returns every `t` at which the ray meets the surface, including
    /// intersections behind the ray origin. Picking the visible hit is left
    /// to the caller.
    pub fn intersect(&self, ray: &Ray) -> Vec<f64> {
        match self.ty {
            ShapeType::Sphere { center, radius } =>
                Shape::intersect_sphere(ray, center, radius),
            ShapeType::Cylinder { base_center, axis, radius, height } =>
                Shape::intersect_cylinder(ray, base_center, axis, radius, height),
            ShapeType::Plane { point, axis } =>
                Shape::intersect_plane(ray, point, axis),
        }
    }

    /// Obtain the unit normal vector of a Shape at a point on its surface.
    pub fn normal_at(&self, at: Vector3) -> Result<Vector3> {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            // A plane has the same normal vector at all points across itself.
            ShapeType::Plane { axis, .. } => Ok(axis),
            ShapeType::Cylinder { base_center, axis, radius, height } =>
                Shape::normal_at_cylinder(at, base_center, axis, radius, height),
        }
    }

    /// Checks whether a ray intersects a Sphere.
    ///
    /// Returns either nothing or both roots of the quadratic. A tangent ray
    /// yields two equal roots.
    fn intersect_sphere(ray: &Ray, center: Vector3, radius: f64) -> Vec<f64> {
        let sphere_to_ray = ray.origin - center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - radius.powi(2);

        let discriminant = b.powi(2) - (4.0 * a * c);

        // A zero direction has no parametrization to solve for.
        if discriminant < 0.0 || a == 0.0 {
            return Vec::new();
        }

        let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

        vec![t1, t2]
    }

    /// Intersects a ray with a plane.
    fn intersect_plane(ray: &Ray, point: Vector3, axis: Vector3) -> Vec<f64> {
        // A ray parallel to the plane never meets it.
        let denom = ray.direction.dot(&axis);
        if denom == 0.0 {
            return Vec::new();
        }

        vec![(point - ray.origin).dot(&axis) / denom]
    }

    /// Intersects a ray with a capped cylinder.
    ///
    /// The ray is split into components along and across the axis. The side
    /// is an infinite cylinder in the perpendicular plane, clipped to the
    /// height range; the caps are disks tested separately. At most the two
    /// closest hits are kept.
    fn intersect_cylinder(ray: &Ray, base_center: Vector3, axis: Vector3,
        radius: f64, height: f64) -> Vec<f64> {
        let (origin_along, origin_perp) = (ray.origin - base_center).decompose(&axis);
        let (direction_along, direction_perp) = ray.direction.decompose(&axis);

        let mut ts = Vec::with_capacity(4);

        // Side surface. If the ray runs along the axis only the caps count.
        let a = direction_perp.dot(&direction_perp);
        if a > PARALLEL_EPSILON {
            let b = 2.0 * origin_perp.dot(&direction_perp);
            let c = origin_perp.dot(&origin_perp) - radius.powi(2);
            let disc = b.powi(2) - 4.0 * a * c;

            if disc >= 0.0 {
                let t0 = (-b - disc.sqrt()) / (2.0 * a);
                let t1 = (-b + disc.sqrt()) / (2.0 * a);

                for &t in [t0, t1].iter() {
                    let h = origin_along + t * direction_along;
                    if 0.0 <= h && h <= height {
                        ts.push(t);
                    }
                }
            }
        }

        // Caps. A ray perpendicular to the axis can't cross them.
        if direction_along != 0.0 {
            for &cap_height in [0.0, height].iter() {
                let t = (cap_height - origin_along) / direction_along;
                let offset = origin_perp + direction_perp * t;
                if offset.length_squared() <= radius.powi(2) {
                    ts.push(t);
                }
            }
        }

        // A ray through the rim meets the side and a cap at the same point.
        ts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ts.dedup_by(|a, b| (*a - *b).abs() < FEQ_EPSILON);
        ts.truncate(2);
        ts
    }

    /// Returns the outward normal on a cylinder.
    ///
    /// Points within `FEQ_EPSILON` of a cap plane (and inside the radius) get
    /// the cap normal, everything else the radial direction.
    fn normal_at_cylinder(at: Vector3, base_center: Vector3, axis: Vector3,
        radius: f64, height: f64) -> Result<Vector3> {
        let (along, perp) = (at - base_center).decompose(&axis);
        let on_disk = perp.length() <= radius + FEQ_EPSILON;

        if on_disk && along.abs() <= FEQ_EPSILON {
            Ok(-axis)
        } else if on_disk && (along - height).abs() <= FEQ_EPSILON {
            Ok(axis)
        } else {
            perp.normalize()
        }
    }
}

fn check_point(what: &str, p: Vector3) -> Result<()> {
    if !p.is_finite() {
        return invalid(format!("{} must be finite, got {:?}", what, p));
    }

    Ok(())
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return invalid(format!("{} must be positive, got {}", what, value));
    }

    Ok(())
}

fn check_axis(what: &str, axis: Vector3) -> Result<Vector3> {
    check_point(what, axis)?;
    axis.normalize().or_else(|_| invalid(format!("{} must be non-zero", what)))
}

#[cfg(test)]
use crate::feq;

#[cfg(test)]
fn unit_sphere() -> Shape {
    Shape::sphere(Vector3::zero(), 1.0, Material::default()).unwrap()
}

#[cfg(test)]
fn floor() -> Shape {
    Shape::plane(Vector3::zero(), Vector3::up(), Material::default()).unwrap()
}

#[cfg(test)]
fn upright_cylinder() -> Shape {
    // Radius 1, from y = 0 to y = 2.
    Shape::cylinder(Vector3::zero(), Vector3::new(0.0, 3.0, 0.0), 1.0, 2.0,
        Material::default()).unwrap()
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let xs = unit_sphere().intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], 4.0));
    assert!(feq(xs[1], 6.0));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let xs = unit_sphere().intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], 5.0));
    assert!(feq(xs[1], 5.0));
}

#[test]
fn ray_misses_sphere() {
    let r = Ray::new(Vector3::new(0.0, 2.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

    assert!(unit_sphere().intersect(&r).is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let xs = unit_sphere().intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], -1.0));
    assert!(feq(xs[1], 1.0));
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    let xs = unit_sphere().intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], -6.0));
    assert!(feq(xs[1], -4.0));
}

#[test]
fn sphere_hits_lie_on_the_surface() {
    let center = Vector3::new(1.0, -2.0, 7.0);
    let s = Shape::sphere(center, 2.5, Material::default()).unwrap();

    let rays = [
        Ray::new(Vector3::zero(), Vector3::new(0.1, -0.3, 1.0)),
        Ray::new(Vector3::new(-4.0, 1.0, 0.0), Vector3::new(0.6, -0.4, 0.9)),
        Ray::new(Vector3::new(1.0, -2.0, 7.0), Vector3::new(0.0, 1.0, 0.0)),
        Ray::new(Vector3::new(5.0, 5.0, 5.0), Vector3::new(-0.5, -0.9, 0.2)),
    ];

    let mut hits = 0;
    for r in rays.iter() {
        for t in s.intersect(r) {
            let p = r.position(t);
            assert!((p - center).length() - 2.5 < 1e-9);
            assert!((p - center).length() - 2.5 > -1e-9);

            let n = s.normal_at(p).unwrap();
            assert!(feq(n.length(), 1.0));
            assert_eq!(n, (p - center) * (1.0 / 2.5));
            hits += 1;
        }
    }

    assert!(hits > 0);
}

#[test]
fn normal_on_sphere_nonaxial() {
    let k = 3.0f64.sqrt() / 3.0;
    let n = unit_sphere().normal_at(Vector3::new(k, k, k)).unwrap();

    assert_eq!(n, Vector3::new(k, k, k));
}

#[test]
fn normal_on_translated_sphere() {
    let s = Shape::sphere(Vector3::new(0.0, 1.0, 0.0), 1.0,
        Material::default()).unwrap();
    let n = s.normal_at(Vector3::new(0.0, 1.70711, -0.70711)).unwrap();

    assert_eq!(n, Vector3::new(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_plane() {
    let p = floor();

    assert_eq!(p.normal_at(Vector3::zero()).unwrap(), Vector3::up());
    assert_eq!(p.normal_at(Vector3::new(10.0, 0.0, -10.0)).unwrap(), Vector3::up());
    assert_eq!(p.normal_at(Vector3::new(-5.0, 0.0, 150.0)).unwrap(), Vector3::up());
}

#[test]
fn plane_axis_is_normalized() {
    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 0.0, -4.0),
        Material::default()).unwrap();

    assert_eq!(p.axis(), Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_parallel_to_plane() {
    let p = floor();

    let above = Ray::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    let coplanar = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 1.0));

    assert!(p.intersect(&above).is_empty());
    assert!(p.intersect(&coplanar).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above() {
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    let xs = floor().intersect(&r);

    assert_eq!(xs, vec![1.0]);
}

#[test]
fn ray_intersecting_plane_from_below() {
    let r = Ray::new(Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
    let xs = floor().intersect(&r);

    assert_eq!(xs, vec![1.0]);
}

#[test]
fn plane_hit_satisfies_plane_equation() {
    let point = Vector3::new(1.0, 2.0, 3.0);
    let axis = Vector3::new(1.0, 1.0, -0.5).normalize().unwrap();
    let p = Shape::plane(point, axis, Material::default()).unwrap();

    let r = Ray::new(Vector3::new(-3.0, 0.5, 8.0), Vector3::new(0.4, 0.2, -1.0));
    let xs = p.intersect(&r);
    assert_eq!(xs.len(), 1);

    let hit = r.position(xs[0]);
    assert!(feq((hit - point).dot(&axis), 0.0));
}

#[test]
fn ray_strikes_cylinder_side() {
    let c = upright_cylinder();
    let r = Ray::new(Vector3::new(-5.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let xs = c.intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], 4.0));
    assert!(feq(xs[1], 6.0));
}

#[test]
fn ray_misses_cylinder_above_height() {
    let c = upright_cylinder();
    let r = Ray::new(Vector3::new(-5.0, 2.5, 0.0), Vector3::new(1.0, 0.0, 0.0));

    assert!(c.intersect(&r).is_empty());
}

#[test]
fn ray_along_axis_hits_both_caps() {
    let c = upright_cylinder();
    let r = Ray::new(Vector3::new(0.5, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    let xs = c.intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], 3.0));
    assert!(feq(xs[1], 5.0));
}

#[test]
fn ray_along_axis_outside_radius_misses() {
    let c = upright_cylinder();
    let r = Ray::new(Vector3::new(1.5, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert!(c.intersect(&r).is_empty());
}

#[test]
fn diagonal_ray_enters_cap_and_leaves_side() {
    let c = upright_cylinder();
    // Enters through the top cap at (0, 2, 0) and exits the side.
    let r = Ray::new(Vector3::new(-1.0, 3.0, 0.0), Vector3::new(1.0, -1.0, 0.0));
    let xs = c.intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0], 1.0));
    assert!(feq(xs[1], 2.0));
}

#[test]
fn cylinder_hits_lie_within_bounds() {
    let base = Vector3::new(1.0, 0.0, 4.0);
    let axis = Vector3::new(1.0, 1.0, 0.0).normalize().unwrap();
    let c = Shape::cylinder(base, axis, 0.75, 3.0, Material::default()).unwrap();

    let rays = [
        Ray::new(Vector3::zero(), Vector3::new(0.3, 0.2, 1.0)),
        Ray::new(Vector3::new(-2.0, 3.0, 4.0), Vector3::new(1.0, -0.5, 0.0)),
        Ray::new(Vector3::new(-1.0, -1.0, 4.0), Vector3::new(1.0, 1.0, 0.05)),
        Ray::new(Vector3::new(3.0, 3.0, 0.0), Vector3::new(-0.1, -0.2, 1.0)),
    ];

    let mut hits = 0;
    for r in rays.iter() {
        let xs = c.intersect(r);
        assert!(xs.len() <= 2);

        for t in xs {
            let p = r.position(t);
            let (along, perp) = (p - base).decompose(&axis);
            assert!(along >= -1e-9 && along <= 3.0 + 1e-9);
            assert!(perp.length() <= 0.75 + 1e-9);

            let n = c.normal_at(p).unwrap();
            assert!(feq(n.length(), 1.0));
            hits += 1;
        }
    }

    assert!(hits > 0);
}

#[test]
fn normals_on_cylinder() {
    let c = upright_cylinder();

    assert_eq!(c.normal_at(Vector3::new(1.0, 1.0, 0.0)).unwrap(),
        Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(c.normal_at(Vector3::new(0.0, 0.5, -1.0)).unwrap(),
        Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(c.normal_at(Vector3::new(0.5, 2.0, 0.0)).unwrap(), Vector3::up());
    assert_eq!(c.normal_at(Vector3::new(0.0, 0.0, 0.5)).unwrap(), -Vector3::up());
}

#[test]
fn malformed_shapes_are_rejected() {
    let m = Material::default();

    assert!(Shape::sphere(Vector3::zero(), 0.0, m).is_err());
    assert!(Shape::sphere(Vector3::zero(), -1.0, m).is_err());
    assert!(Shape::sphere(Vector3::new(f64::NAN, 0.0, 0.0), 1.0, m).is_err());
    assert!(Shape::cylinder(Vector3::zero(), Vector3::zero(), 1.0, 1.0, m).is_err());
    assert!(Shape::cylinder(Vector3::zero(), Vector3::up(), 0.0, 1.0, m).is_err());
    assert!(Shape::cylinder(Vector3::zero(), Vector3::up(), 1.0, 0.0, m).is_err());
    assert!(Shape::plane(Vector3::zero(), Vector3::zero(), m).is_err());
}

use crate::ray::Ray;
use crate::shape::Shape;

/// An intersection.
///
/// Parameter `t` is the offset along the ray at which it meets `what`.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,
}

/// Two intersections are equal if their offsets are equal and they refer to
/// the *same* shape (pointer equality), not merely equal-looking shapes.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, what: &'a Shape) -> Intersection<'a> {
        Intersection { t, what }
    }
}

/// Finds the closest intersection within `[t_min, t_max]`.
///
/// Shapes are scanned in order and a hit only replaces the current one when
/// its `t` is strictly smaller, so on exact ties the earlier shape wins.
pub fn closest_hit<'a, I>(shapes: I, ray: &Ray, t_min: f64, t_max: f64)
    -> Option<Intersection<'a>>
    where I: IntoIterator<Item = &'a Shape> {
    let mut closest: Option<Intersection<'a>> = None;

    for shape in shapes {
        for t in shape.intersect(ray) {
            if !(t_min <= t && t <= t_max) {
                continue;
            }

            if closest.map_or(true, |hit| t < hit.t) {
                closest = Some(Intersection::new(t, shape));
            }
        }
    }

    closest
}

#[cfg(test)]
use crate::{ light::Material, vector::Vector3 };

#[cfg(test)]
fn sphere_at(z: f64) -> Shape {
    Shape::sphere(Vector3::new(0.0, 0.0, z), 1.0, Material::default()).unwrap()
}

#[test]
fn closest_hit_picks_smallest_t() {
    let shapes = vec![sphere_at(10.0), sphere_at(5.0)];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let hit = closest_hit(&shapes, &r, 1.0, f64::INFINITY).unwrap();
    assert_eq!(hit, Intersection::new(4.0, &shapes[1]));
}

#[test]
fn closest_hit_respects_bounds() {
    let shapes = vec![sphere_at(0.0)];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    // The t = -1 root is behind the origin; only t = 1 is inside the range.
    let hit = closest_hit(&shapes, &r, 0.5, f64::INFINITY).unwrap();
    assert_eq!(hit.t, 1.0);

    assert!(closest_hit(&shapes, &r, 1.5, f64::INFINITY).is_none());
    assert!(closest_hit(&shapes, &r, -5.0, -2.0).is_none());
}

#[test]
fn closest_hit_bounds_are_inclusive() {
    let shapes = vec![sphere_at(5.0)];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let hit = closest_hit(&shapes, &r, 4.0, 4.0).unwrap();
    assert_eq!(hit.t, 4.0);
}

#[test]
fn exact_ties_go_to_the_first_shape() {
    let shapes = vec![sphere_at(5.0), sphere_at(5.0)];
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let hit = closest_hit(&shapes, &r, 1.0, f64::INFINITY).unwrap();
    assert!(std::ptr::eq(hit.what, &shapes[0]));
}

#[test]
fn empty_scene_has_no_hit() {
    let shapes: Vec<Shape> = Vec::new();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert!(closest_hit(&shapes, &r, 1.0, f64::INFINITY).is_none());
}

use crate::color::Color;
use crate::consts::{ BACKGROUND, SHADOW_EPSILON };
use crate::error::Result;
use crate::intersect::{ Intersection, closest_hit };
use crate::light::{ Light, Material };
use crate::ray::Ray;
use crate::shape::Shape;
use crate::vector::Vector3;

/// A world with objects and lights.
///
/// Worlds collect every object and light for rendering, and most shading
/// logic lives here. A world is never mutated while it is being rendered;
/// workers only ever hold a shared reference to it.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub objects: Vec<Shape>,
    pub lights: Vec<Light>,

    /// Returned for rays that hit nothing.
    pub background: Color,
}

impl Default for World {
    fn default() -> World {
        World::empty()
    }
}

impl World {
    /// Creates a world from objects and lights, on the default background.
    pub fn new(objects: Vec<Shape>, lights: Vec<Light>) -> World {
        World { objects, lights, ..World::empty() }
    }

    /// Creates an empty world with no objects and no lights.
    pub fn empty() -> World {
        World {
            objects: Vec::new(),
            lights: Vec::new(),
            background: Color::rgb(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2]),
        }
    }

    pub fn with_background(mut self, background: Color) -> World {
        self.background = background;
        self
    }

    /// Finds the nearest object hit by a ray with `t` in `[t_min, t_max]`.
    pub fn closest_intersection(&self, r: &Ray, t_min: f64, t_max: f64)
        -> Option<Intersection<'_>> {
        closest_hit(&self.objects, r, t_min, t_max)
    }

    /// Determines whether anything blocks the light reaching `point`.
    ///
    /// `lightv` is the unit vector toward the light and `t_max` the distance
    /// to it. The shadow ray starts `SHADOW_EPSILON` away from the surface so
    /// that the surface doesn't shadow itself.
    pub fn is_shadowed(&self, point: Vector3, lightv: Vector3, t_max: f64) -> bool {
        let r = Ray::new(point, lightv);
        self.closest_intersection(&r, SHADOW_EPSILON, t_max).is_some()
    }

    /// Calculates the total light intensity at a surface point.
    ///
    /// Ambient lights always count; point and directional lights count unless
    /// something lies between the point and the light. The sum is not clamped.
    pub fn compute_lighting(&self, point: Vector3, normalv: Vector3,
        eyev: Vector3, m: &Material) -> f64 {
        self.lights.iter()
            .map(|light| light.contribution(m, point, normalv, eyev,
                |lightv, t_max| self.is_shadowed(point, lightv, t_max)))
            .sum()
    }

    /// Determines the color seen along a ray.
    ///
    /// Only hits with `t` in `[t_min, t_max]` are visible. Rays that hit
    /// nothing see the background. Errors from a shape's normal calculation
    /// are returned rather than papered over, since they point at a
    /// malformed scene.
    pub fn trace_ray(&self, r: &Ray, t_min: f64, t_max: f64) -> Result<Color> {
        let hit = match self.closest_intersection(r, t_min, t_max) {
            Some(hit) => hit,
            None => return Ok(self.background),
        };

        let point = r.position(hit.t);
        let normalv = hit.what.normal_at(point)?;
        let eyev = r.direction.opposite().normalize()?;

        let intensity = self.compute_lighting(point, normalv, eyev, hit.what.material());
        Ok(hit.what.color().scale(intensity))
    }
}

#[cfg(test)]
use crate::feq;

#[cfg(test)]
fn red_sphere_world(lights: Vec<Light>) -> World {
    let sphere = Shape::sphere(
        Vector3::new(0.0, 0.0, 3.0), 1.0, Material::matte(Color::red())
    ).unwrap();

    World::new(vec![sphere], lights)
}

#[test]
fn color_ray_miss() {
    let w = red_sphere_world(vec![Light::ambient(1.0).unwrap()]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::white());
}

#[test]
fn color_ray_miss_uses_custom_background() {
    let w = World::empty().with_background(Color::rgb(10, 20, 30));
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::rgb(10, 20, 30));
}

#[test]
fn full_ambient_keeps_object_color() {
    let w = red_sphere_world(vec![Light::ambient(1.0).unwrap()]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::red());
}

#[test]
fn hits_before_t_min_are_invisible() {
    let w = red_sphere_world(vec![Light::ambient(1.0).unwrap()]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    // Both hits (t = 2 and t = 4) sit before t_min.
    assert_eq!(w.trace_ray(&r, 5.0, f64::INFINITY).unwrap(), Color::white());
}

#[test]
fn ambient_lights_add_up() {
    let w = red_sphere_world(vec![
        Light::ambient(0.25).unwrap(),
        Light::ambient(0.25).unwrap(),
    ]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::rgb(128, 0, 0));
}

#[test]
fn no_lights_means_black() {
    let w = red_sphere_world(Vec::new());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::black());
}

#[test]
fn point_light_facing_the_hit() {
    // Light sits at the camera, straight along the normal of the hit point.
    let w = red_sphere_world(vec![Light::point(0.5, Vector3::zero()).unwrap()]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(w.trace_ray(&r, 1.0, f64::INFINITY).unwrap(), Color::rgb(128, 0, 0));
}

#[test]
fn trace_ray_is_idempotent() {
    let w = red_sphere_world(vec![
        Light::ambient(0.2).unwrap(),
        Light::point(0.6, Vector3::new(2.0, 1.0, 0.0)).unwrap(),
        Light::directional(0.2, Vector3::new(1.0, 4.0, 4.0)).unwrap(),
    ]);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.1, 0.2, 1.0));

    let first = w.trace_ray(&r, 1.0, f64::INFINITY).unwrap();
    let second = w.trace_ray(&r, 1.0, f64::INFINITY).unwrap();
    assert_eq!(first, second);
}

#[test]
fn shadow_object_between_point_and_light() {
    let floor = Shape::plane(Vector3::zero(), Vector3::up(),
        Material::new(Color::white(), Some(0.5)).unwrap()).unwrap();
    let blocker = Shape::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0,
        Material::default()).unwrap();
    let light = Light::point(0.7, Vector3::new(0.0, 10.0, 0.0)).unwrap();

    let point = Vector3::zero();
    let eyev = Vector3::up();
    let m = *floor.material();

    let open = World::new(vec![floor.clone()], vec![light]);
    let blocked = World::new(vec![floor, blocker], vec![light]);

    assert!(open.compute_lighting(point, Vector3::up(), eyev, &m) > 0.0);
    assert_eq!(blocked.compute_lighting(point, Vector3::up(), eyev, &m), 0.0);
    assert!(blocked.is_shadowed(point, Vector3::up(), 10.0));
}

#[test]
fn shadow_leaves_ambient_untouched() {
    let floor = Shape::plane(Vector3::zero(), Vector3::up(),
        Material::default()).unwrap();
    let blocker = Shape::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0,
        Material::default()).unwrap();
    let w = World::new(vec![floor, blocker], vec![
        Light::ambient(0.2).unwrap(),
        Light::directional(0.8, Vector3::up()).unwrap(),
    ]);

    let m = Material::default();
    let lit = w.compute_lighting(Vector3::zero(), Vector3::up(), Vector3::up(), &m);
    assert!(feq(lit, 0.2));
}

#[test]
fn object_behind_point_light_does_not_shadow() {
    let beyond = Shape::sphere(Vector3::new(0.0, 20.0, 0.0), 1.0,
        Material::default()).unwrap();
    let w = World::new(vec![beyond], Vec::new());

    // The light is 10 units away; the sphere sits past it.
    assert!(!w.is_shadowed(Vector3::zero(), Vector3::up(), 10.0));
    // A directional light has no distance bound, so the sphere shadows.
    assert!(w.is_shadowed(Vector3::zero(), Vector3::up(), f64::INFINITY));
}

#[test]
fn surface_does_not_shadow_itself() {
    let sphere = Shape::sphere(Vector3::zero(), 1.0, Material::default()).unwrap();
    let w = World::new(vec![sphere], Vec::new());

    let top = Vector3::new(0.0, 1.0, 0.0);
    assert!(!w.is_shadowed(top, Vector3::up(), f64::INFINITY));
}

#[test]
fn directional_light_on_floor_brighter_looking_down() {
    let floor = Shape::plane(Vector3::new(0.0, -1.0, 0.0), Vector3::up(),
        Material::new(Color::white(), Some(0.0)).unwrap()).unwrap();
    let w = World::new(vec![floor], vec![
        Light::directional(1.0, Vector3::up()).unwrap(),
    ]);
    let m = *w.objects[0].material();

    let steep = Vector3::new(0.0, 1.0, -1.0).normalize().unwrap();
    let grazing = Vector3::new(0.0, 0.01, -1.0).normalize().unwrap();
    let p = Vector3::new(0.0, -1.0, 5.0);

    let steep_lit = w.compute_lighting(p, Vector3::up(), steep, &m);
    let grazing_lit = w.compute_lighting(p, Vector3::up(), grazing, &m);
    assert!(steep_lit > grazing_lit);
}

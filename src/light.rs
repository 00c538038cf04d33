use crate::color::Color;
use crate::consts::SPECULAR_EXPONENT_SCALE;
use crate::error::{ Result, invalid };
use crate::vector::Vector3;

/// A light source.
///
/// Every light has a non-negative scalar intensity. Ambient light reaches
/// every point equally; point and directional lights shade a surface by the
/// angle between its normal and the direction toward the light, and can be
/// blocked by other objects.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient { intensity: f64 },

    /// A light emitting from a single position.
    Point { intensity: f64, position: Vector3 },

    /// A light infinitely far away. `direction` points from a surface toward
    /// the light.
    Directional { intensity: f64, direction: Vector3 },
}

impl Light {
    /// Creates an ambient light.
    pub fn ambient(intensity: f64) -> Result<Light> {
        check_intensity(intensity)?;
        Ok(Light::Ambient { intensity })
    }

    /// Creates a point light.
    pub fn point(intensity: f64, position: Vector3) -> Result<Light> {
        check_intensity(intensity)?;
        if !position.is_finite() {
            return invalid("point light position must be finite");
        }

        Ok(Light::Point { intensity, position })
    }

    /// Creates a directional light.
    ///
    /// The direction is normalized up front, so a zero-length direction is
    /// rejected here rather than while shading.
    pub fn directional(intensity: f64, direction: Vector3) -> Result<Light> {
        check_intensity(intensity)?;
        if !direction.is_finite() {
            return invalid("directional light direction must be finite");
        }

        let direction = direction.normalize()
            .or_else(|_| invalid("directional light direction must be non-zero"))?;

        Ok(Light::Directional { intensity, direction })
    }

    pub fn intensity(&self) -> f64 {
        match *self {
            Light::Ambient { intensity }
                | Light::Point { intensity, .. }
                | Light::Directional { intensity, .. } => intensity,
        }
    }

    /// Finds the unit vector from `point` toward this light, along with the
    /// farthest `t` a shadow ray along that vector needs to check.
    ///
    /// Returns `None` for ambient light, which has no direction, and for a
    /// point light sitting exactly on `point`.
    pub fn direction_from(&self, point: Vector3) -> Option<(Vector3, f64)> {
        match *self {
            Light::Ambient { .. } => None,
            Light::Point { position, .. } => {
                let to_light = position - point;
                let distance = to_light.length();
                to_light.normalize().ok().map(|lightv| (lightv, distance))
            },
            Light::Directional { direction, .. } => {
                direction.normalize().ok().map(|lightv| (lightv, f64::INFINITY))
            },
        }
    }

    /// Calculates how much this light contributes at a surface point.
    ///
    /// `is_shadowed` is handed the unit vector toward the light and the
    /// farthest `t` to check, and reports whether anything blocks the light.
    /// A shadowed light contributes nothing.
    pub fn contribution<F>(&self, m: &Material, point: Vector3,
        normalv: Vector3, eyev: Vector3, is_shadowed: F) -> f64
        where F: FnOnce(Vector3, f64) -> bool {
        if let Light::Ambient { intensity } = *self {
            return intensity;
        }

        let (lightv, t_max) = match self.direction_from(point) {
            Some(found) => found,
            None => return 0.0,
        };

        if is_shadowed(lightv, t_max) {
            return 0.0;
        }

        lighting(self.intensity(), m, normalv, eyev, lightv)
    }
}

fn check_intensity(intensity: f64) -> Result<()> {
    if !(intensity.is_finite() && intensity >= 0.0) {
        return invalid(format!(
            "light intensity must be a non-negative real, got {}", intensity
        ));
    }

    Ok(())
}

/// A material record.
///
/// `specular` is `None` for matte surfaces. Otherwise it lies in `[0, 1]`,
/// and higher values give a tighter highlight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub specular: Option<f64>,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            specular: None,
        }
    }
}

impl Material {
    pub fn new(color: Color, specular: Option<f64>) -> Result<Material> {
        if let Some(s) = specular {
            if !(0.0..=1.0).contains(&s) {
                return invalid(format!(
                    "specular must lie in [0, 1], got {}", s
                ));
            }
        }

        Ok(Material { color, specular })
    }

    /// A matte material of the given color.
    pub fn matte(color: Color) -> Material {
        Material { color, specular: None }
    }

    /// The shininess exponent for the specular highlight, if any.
    ///
    /// Maps `specular` linearly onto `[1, 1 + SPECULAR_EXPONENT_SCALE]`.
    pub fn specular_exponent(&self) -> Option<f64> {
        self.specular.map(|s| 1.0 + s * SPECULAR_EXPONENT_SCALE)
    }
}

/// Calculate the diffuse and specular intensity of one unblocked light.
///
/// `lightv` is the unit vector toward the light, `eyev` points from the
/// surface toward the viewer, and `normalv` is the surface normal. The result
/// is not clamped; colors saturate when they are scaled.
pub fn lighting(intensity: f64, m: &Material,
    normalv: Vector3, eyev: Vector3, lightv: Vector3) -> f64 {
    let mut total = 0.0;

    // Diffuse: only the side of the surface facing the light is lit.
    let light_dot_normal = normalv.dot(&lightv);
    if light_dot_normal > 0.0 {
        let lengths = normalv.length() * lightv.length();
        if lengths > 0.0 {
            total += intensity * light_dot_normal / lengths;
        }
    }

    // Specular: R = 2N(N.L) - L, compared against the eye vector.
    if let Some(exponent) = m.specular_exponent() {
        let reflectv = (-lightv).reflect(&normalv);
        let reflect_dot_eye = reflectv.dot(&eyev);
        if reflect_dot_eye > 0.0 {
            let lengths = reflectv.length() * eyev.length();
            if lengths > 0.0 {
                total += intensity * (reflect_dot_eye / lengths).powf(exponent);
            }
        }
    }

    total
}

#[cfg(test)]
use crate::feq;

#[test]
fn eye_between_light_and_surface() {
    let m = Material::new(Color::white(), Some(0.5)).unwrap();
    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, -1.0);

    assert!(feq(lighting(1.0, &m, normalv, eyev, lightv), 2.0));
}

#[test]
fn eye_offset_45_without_specular() {
    let m = Material::matte(Color::white());
    let eyev = Vector3::new(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt()) / 2.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, -1.0);

    assert!(feq(lighting(1.0, &m, normalv, eyev, lightv), 1.0));
}

#[test]
fn eye_offset_45_with_linear_specular() {
    // specular 0.0 maps to an exponent of 1
    let m = Material::new(Color::white(), Some(0.0)).unwrap();
    let eyev = Vector3::new(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt()) / 2.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(1.0, &m, normalv, eyev, lightv);
    assert!(feq(res, 1.0 + 2.0f64.sqrt() / 2.0));
}

#[test]
fn tighter_highlight_for_higher_specular() {
    let eyev = Vector3::new(0.0, 0.1, -1.0).normalize().unwrap();
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, -1.0);

    let dull = Material::new(Color::white(), Some(0.01)).unwrap();
    let shiny = Material::new(Color::white(), Some(1.0)).unwrap();

    let dull_res = lighting(1.0, &dull, normalv, eyev, lightv);
    let shiny_res = lighting(1.0, &shiny, normalv, eyev, lightv);
    assert!(dull_res > shiny_res);
}

#[test]
fn light_behind_surface() {
    let m = Material::new(Color::white(), Some(1.0)).unwrap();
    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(lighting(1.0, &m, normalv, eyev, lightv), 0.0);
}

#[test]
fn ambient_light_ignores_geometry_and_shadows() {
    let light = Light::ambient(0.3).unwrap();
    let m = Material::default();

    let res = light.contribution(&m, Vector3::zero(), Vector3::up(),
        Vector3::up(), |_, _| true);
    assert!(feq(res, 0.3));
}

#[test]
fn shadowed_light_contributes_nothing() {
    let light = Light::point(0.8, Vector3::new(0.0, 10.0, 0.0)).unwrap();
    let m = Material::new(Color::white(), Some(0.5)).unwrap();

    let lit = light.contribution(&m, Vector3::zero(), Vector3::up(),
        Vector3::up(), |_, _| false);
    let shadowed = light.contribution(&m, Vector3::zero(), Vector3::up(),
        Vector3::up(), |_, _| true);

    assert!(lit > 0.0);
    assert_eq!(shadowed, 0.0);
}

#[test]
fn point_light_direction_and_distance() {
    let light = Light::point(1.0, Vector3::new(0.0, 3.0, 4.0)).unwrap();
    let (lightv, t_max) = light.direction_from(Vector3::zero()).unwrap();

    assert_eq!(lightv, Vector3::new(0.0, 0.6, 0.8));
    assert!(feq(t_max, 5.0));

    // A light sitting on the point has no direction.
    let on_point = Light::point(1.0, Vector3::zero()).unwrap();
    assert!(on_point.direction_from(Vector3::zero()).is_none());
}

#[test]
fn directional_light_is_unbounded() {
    let light = Light::directional(1.0, Vector3::new(0.0, 2.0, 0.0)).unwrap();
    let (lightv, t_max) = light.direction_from(Vector3::new(5.0, 0.0, 5.0)).unwrap();

    assert_eq!(lightv, Vector3::up());
    assert!(t_max.is_infinite());
}

#[test]
fn malformed_lights_are_rejected() {
    assert!(Light::ambient(-0.1).is_err());
    assert!(Light::point(f64::NAN, Vector3::zero()).is_err());
    assert!(Light::directional(1.0, Vector3::zero()).is_err());
}

#[test]
fn specular_outside_unit_range_is_rejected() {
    assert!(Material::new(Color::red(), Some(1.5)).is_err());
    assert!(Material::new(Color::red(), Some(-0.1)).is_err());
    assert!(Material::new(Color::red(), None).is_ok());
}

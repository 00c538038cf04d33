use std::convert::{ TryFrom, TryInto };
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };
use tracing::info;

use crate::camera::Camera;
use crate::color::Color;
use crate::consts::{
    CANVAS_WIDTH, CANVAS_HEIGHT,
    VIEWPORT_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_DISTANCE,
};
use crate::error::{ Error, Result };
use crate::light::{ Light, Material };
use crate::shape::Shape;
use crate::vector::Vector3;
use crate::world::World;

/// A renderable scene: the world plus the camera looking at it.
#[derive(Clone, Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Loads a scene description from a JSON file.
    pub fn load(path: &Path) -> Result<Scene> {
        info!("loading scene from {}", path.display());

        let text = fs::read_to_string(path)?;
        let scene = Scene::from_json(&text)?;

        info!(
            "scene has {} objects and {} lights, canvas {}x{}, background {}",
            scene.world.objects.len(), scene.world.lights.len(),
            scene.camera.hsize, scene.camera.vsize,
            scene.world.background.to_hex()
        );
        Ok(scene)
    }

    /// Parses a scene description from a JSON string.
    pub fn from_json(text: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(text)?;
        scene_json.try_into()
    }

    /// The built-in demo: three spheres resting on a huge yellow one.
    pub fn demo() -> Result<Scene> {
        let objects = vec![
            Shape::sphere(Vector3::new(0.0, -1.0, 3.0), 1.0,
                Material::new(Color::red(), Some(0.5))?)?,
            Shape::sphere(Vector3::new(2.0, 0.0, 4.0), 1.0,
                Material::new(Color::blue(), Some(0.5))?)?,
            Shape::sphere(Vector3::new(-2.0, 0.0, 4.0), 1.0,
                Material::new(Color::green(), Some(0.01))?)?,
            Shape::sphere(Vector3::new(0.0, -5001.0, 0.0), 5000.0,
                Material::new(Color::yellow(), Some(1.0))?)?,
        ];

        let lights = vec![
            Light::ambient(0.2)?,
            Light::point(0.6, Vector3::new(2.0, 1.0, 0.0))?,
            Light::directional(0.2, Vector3::new(1.0, 4.0, 4.0))?,
        ];

        Ok(Scene {
            world: World::new(objects, lights),
            camera: Camera::new(CANVAS_WIDTH, CANVAS_HEIGHT)?,
        })
    }

    /// Replaces the canvas size, keeping the viewport.
    pub fn with_canvas_size(mut self, width: usize, height: usize) -> Result<Scene> {
        let c = &self.camera;
        self.camera = Camera::with_viewport(width, height,
            c.viewport_width, c.viewport_height, c.distance)?;
        Ok(self)
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let viewport = scene_json.viewport.unwrap_or_default();
        let camera = Camera::with_viewport(
            scene_json.canvas_width,
            scene_json.canvas_height,
            viewport.width,
            viewport.height,
            viewport.distance,
        )?;

        let objects = scene_json.shapes.into_iter()
            .map(Shape::try_from)
            .collect::<Result<Vec<_>>>()?;
        let lights = scene_json.lights.into_iter()
            .map(Light::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut world = World::new(objects, lights);
        if let Some(background) = scene_json.background {
            world.background = Color::try_from(background.as_slice())?;
        }

        Ok(Scene { world, camera })
    }
}

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    canvas_width: usize,
    canvas_height: usize,

    #[serde(default)]
    viewport: Option<ViewportJson>,
    #[serde(default)]
    background: Option<Vec<i64>>,

    #[serde(default)]
    lights: Vec<LightJson>,
    #[serde(default)]
    shapes: Vec<ShapeJson>,
}

#[derive(Clone, Serialize, Deserialize)]
struct ViewportJson {
    width: f64,
    height: f64,
    distance: f64,
}

impl Default for ViewportJson {
    fn default() -> ViewportJson {
        ViewportJson {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            distance: VIEWPORT_DISTANCE,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "ty", rename_all = "snake_case")]
enum LightJson {
    Ambient { intensity: f64 },
    Point { intensity: f64, position: Vec<f64> },
    Directional { intensity: f64, direction: Vec<f64> },
}

impl TryFrom<LightJson> for Light {
    type Error = Error;

    fn try_from(light_json: LightJson) -> Result<Light> {
        match light_json {
            LightJson::Ambient { intensity } => Light::ambient(intensity),
            LightJson::Point { intensity, position } =>
                Light::point(intensity, vector(&position)?),
            LightJson::Directional { intensity, direction } =>
                Light::directional(intensity, vector(&direction)?),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "ty", rename_all = "snake_case")]
enum ShapeJson {
    Sphere {
        center: Vec<f64>,
        radius: f64,
        color: Vec<i64>,
        specular: Option<f64>,
    },
    Cylinder {
        base_center: Vec<f64>,
        axis: Vec<f64>,
        radius: f64,
        height: f64,
        color: Vec<i64>,
        specular: Option<f64>,
    },
    Plane {
        point: Vec<f64>,
        axis: Vec<f64>,
        color: Vec<i64>,
        specular: Option<f64>,
    },
}

impl TryFrom<ShapeJson> for Shape {
    type Error = Error;

    fn try_from(shape_json: ShapeJson) -> Result<Shape> {
        match shape_json {
            ShapeJson::Sphere { center, radius, color, specular } =>
                Shape::sphere(vector(&center)?, radius,
                    material(&color, specular)?),
            ShapeJson::Cylinder { base_center, axis, radius, height, color, specular } =>
                Shape::cylinder(vector(&base_center)?, vector(&axis)?, radius,
                    height, material(&color, specular)?),
            ShapeJson::Plane { point, axis, color, specular } =>
                Shape::plane(vector(&point)?, vector(&axis)?,
                    material(&color, specular)?),
        }
    }
}

fn vector(v: &[f64]) -> Result<Vector3> {
    Vector3::try_from(v)
}

fn material(color: &[i64], specular: Option<f64>) -> Result<Material> {
    Material::new(Color::try_from(color)?, specular)
}

#[cfg(test)]
use crate::shape::ShapeType;

#[test]
fn parse_full_scene() {
    let scene = Scene::from_json(r#"{
        "canvas_width": 64,
        "canvas_height": 48,
        "viewport": { "width": 2.0, "height": 1.5, "distance": 1.0 },
        "background": [0, 0, 0],
        "lights": [
            { "ty": "ambient", "intensity": 0.2 },
            { "ty": "point", "intensity": 0.6, "position": [2, 1, 0] },
            { "ty": "directional", "intensity": 0.2, "direction": [1, 4, 4] }
        ],
        "shapes": [
            { "ty": "sphere", "center": [0, -1, 3], "radius": 1,
              "color": [255, 0, 0], "specular": 0.5 },
            { "ty": "cylinder", "base_center": [-2, -1, 5], "axis": [0, 2, 0],
              "radius": 0.5, "height": 2, "color": [0, 255, 0] },
            { "ty": "plane", "point": [0, -2, 0], "axis": [0, 1, 0],
              "color": [255, 255, 0] }
        ]
    }"#).unwrap();

    assert_eq!(scene.camera.hsize, 64);
    assert_eq!(scene.camera.vsize, 48);
    assert_eq!(scene.camera.viewport_width, 2.0);
    assert_eq!(scene.world.background, Color::black());
    assert_eq!(scene.world.lights.len(), 3);
    assert_eq!(scene.world.objects.len(), 3);

    assert_eq!(scene.world.objects[0].specular(), Some(0.5));
    assert_eq!(scene.world.objects[1].specular(), None);
    match scene.world.objects[1].ty() {
        ShapeType::Cylinder { axis, .. } => assert_eq!(*axis, Vector3::up()),
        _ => panic!("expected a cylinder"),
    }
}

#[test]
fn defaults_for_optional_fields() {
    let scene = Scene::from_json(r#"{
        "canvas_width": 10,
        "canvas_height": 10
    }"#).unwrap();

    assert_eq!(scene.camera, Camera::new(10, 10).unwrap());
    assert_eq!(scene.world, World::empty());
}

#[test]
fn wrong_dimension_is_rejected() {
    let result = Scene::from_json(r#"{
        "canvas_width": 10,
        "canvas_height": 10,
        "shapes": [
            { "ty": "sphere", "center": [0, 0], "radius": 1, "color": [255, 0, 0] }
        ]
    }"#);

    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn malformed_shape_is_rejected() {
    let result = Scene::from_json(r#"{
        "canvas_width": 10,
        "canvas_height": 10,
        "shapes": [
            { "ty": "cylinder", "base_center": [0, 0, 0], "axis": [0, 0, 0],
              "radius": 1, "height": 1, "color": [255, 0, 0] }
        ]
    }"#);

    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn unknown_shape_is_a_json_error() {
    let result = Scene::from_json(r#"{
        "canvas_width": 10,
        "canvas_height": 10,
        "shapes": [ { "ty": "cone" } ]
    }"#);

    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn demo_scene() {
    let scene = Scene::demo().unwrap();

    assert_eq!(scene.world.objects.len(), 4);
    assert_eq!(scene.world.lights.len(), 3);
    assert_eq!(scene.world.background, Color::white());
    assert_eq!(scene.camera.hsize, CANVAS_WIDTH);
}

#[test]
fn resizing_keeps_viewport() {
    let scene = Scene::from_json(r#"{
        "canvas_width": 10,
        "canvas_height": 10,
        "viewport": { "width": 3.0, "height": 2.0, "distance": 0.5 }
    }"#).unwrap().with_canvas_size(30, 20).unwrap();

    assert_eq!(scene.camera.hsize, 30);
    assert_eq!(scene.camera.vsize, 20);
    assert_eq!(scene.camera.viewport_width, 3.0);
    assert_eq!(scene.camera.distance, 0.5);
}

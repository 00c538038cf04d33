// Runtime parameters
pub const CANVAS_WIDTH: usize = 400;
pub const CANVAS_HEIGHT: usize = 400;
pub const OUT_FILE: &str = "./out.png";

// Viewport, one unit in front of the camera at the world origin
pub const VIEWPORT_WIDTH: f64 = 1.0;
pub const VIEWPORT_HEIGHT: f64 = 1.0;
pub const VIEWPORT_DISTANCE: f64 = 1.0;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied to shadow rays so a surface never shadows itself
pub const SHADOW_EPSILON: f64 = 0.001;

// Rays nearly parallel to a plane or cylinder axis are treated as parallel
pub const PARALLEL_EPSILON: f64 = 1e-12;

// Specular values in [0, 1] map to exponents in [1, 1 + SPECULAR_EXPONENT_SCALE]
pub const SPECULAR_EXPONENT_SCALE: f64 = 999.0;

// Background color, RGB
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

// Primary rays ignore anything closer than the viewport plane
pub const PRIMARY_T_MIN: f64 = 1.0;

use std::convert::TryFrom;
use std::fmt;

use crate::error::{ Error, Result, invalid };

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Each value
/// ranges from 0 to 255 inclusive, which the `u8` channels enforce.
///
/// # Examples
///
/// Scale a color by a lighting intensity:
///
/// ```
/// # use ray_caster::color::Color;
/// let red = Color::red();
/// assert_eq!(red.scale(0.5), Color::rgb(128, 0, 0));
/// assert_eq!(red.scale(4.0), Color::red());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Conversion from a slice of three integer channels.
///
/// Scene descriptions store colors as JSON arrays. Slices that don't hold
/// exactly three channels, or channels outside of 0 to 255, are rejected.
impl TryFrom<&[i64]> for Color {
    type Error = Error;

    fn try_from(v: &[i64]) -> Result<Color> {
        let (r, g, b) = match *v {
            [r, g, b] => (r, g, b),
            _ => return invalid(format!(
                "expected a color of 3 channels, got {}", v.len()
            )),
        };

        let channel = |c: i64| u8::try_from(c).map_err(|_| Error::Validation(
            format!("color channel {} is outside of 0..=255", c)
        ));

        Ok(Color { r: channel(r)?, g: channel(g)?, b: channel(b)? })
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> image::Rgb<u8> {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// Formats a color as a `#rrggbb` hex string.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub const fn black() -> Color {
        Color::rgb(0, 0, 0)
    }

    /// The color white.
    pub const fn white() -> Color {
        Color::rgb(255, 255, 255)
    }

    /// The color red.
    pub const fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    /// The color green.
    pub const fn green() -> Color {
        Color::rgb(0, 255, 0)
    }

    /// The color blue.
    pub const fn blue() -> Color {
        Color::rgb(0, 0, 255)
    }

    /// The color yellow.
    pub const fn yellow() -> Color {
        Color::rgb(255, 255, 0)
    }

    /// Scales each channel by a lighting intensity.
    ///
    /// Channels are rounded to the nearest integer, then clamped to the range
    /// 0 to 255. Intensities are not clamped beforehand, so an intensity above
    /// 1.0 brightens the color until it saturates.
    pub fn scale(&self, intensity: f64) -> Color {
        let channel = |c: u8| (c as f64 * intensity).round().clamp(0.0, 255.0) as u8;

        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    /// Packs the color as `0x00RRGGBB`.
    pub fn to_packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Unpacks a `0x00RRGGBB` value, ignoring the top byte.
    pub fn from_packed(packed: u32) -> Color {
        Color {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Formats the color as a `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

#[test]
fn scale_rounds_and_clamps() {
    let c = Color::rgb(100, 200, 10);

    assert_eq!(c.scale(1.0), c);
    assert_eq!(c.scale(0.0), Color::black());
    assert_eq!(c.scale(0.5), Color::rgb(50, 100, 5));
    assert_eq!(c.scale(1.5), Color::rgb(150, 255, 15));
    assert_eq!(c.scale(0.25), Color::rgb(25, 50, 3));
}

#[test]
fn scale_ignores_negative_intensity() {
    assert_eq!(Color::white().scale(-2.0), Color::black());
}

#[test]
fn packed_representation() {
    let c = Color::rgb(0x12, 0xab, 0xff);

    assert_eq!(c.to_packed(), 0x0012abff);
    assert_eq!(Color::from_packed(0xff12abff), c);
}

#[test]
fn hex_representation() {
    assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
    assert_eq!(Color::black().to_hex(), "#000000");
}

#[test]
fn try_from_slice_validates_channels() {
    let ok = Color::try_from(&[255i64, 0, 128][..]).unwrap();
    assert_eq!(ok, Color::rgb(255, 0, 128));

    assert!(matches!(Color::try_from(&[256i64, 0, 0][..]), Err(Error::Validation(_))));
    assert!(matches!(Color::try_from(&[0i64, -1, 0][..]), Err(Error::Validation(_))));
    assert!(matches!(Color::try_from(&[0i64, 0][..]), Err(Error::Validation(_))));
}

//! Spatial and common types

use crate::error::{BlossomError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2D vector in logical pixels (y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians, scaled by `length`
    pub fn from_polar(angle: f32, length: f32) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Viewport or surface dimensions in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// A `[min, max)` range that randomized attributes are drawn from.
///
/// A degenerate range (`min == max`) always yields `min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, value: f32) -> bool {
        if self.min == self.max {
            value == self.min
        } else {
            value >= self.min && value < self.max
        }
    }

    /// Fails when the range is inverted or not finite
    pub fn validate(&self, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(BlossomError::InvalidConfig(format!(
                "{field}: range bounds must be finite"
            )));
        }
        if self.min > self.max {
            return Err(BlossomError::InvalidConfig(format!(
                "{field}: min {} is greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// RGBA color, straight alpha, components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse a CSS-style color: `#RGB`, `#RRGGBB`, `#RRGGBBAA`,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)` with 0-255 channels and 0-1 alpha.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| BlossomError::InvalidColor(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| BlossomError::InvalidColor(s.to_string()))?;

        let parts: Vec<f32> = body
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| BlossomError::InvalidColor(s.to_string()))?;

        if parts.iter().any(|c| !c.is_finite()) {
            return Err(BlossomError::InvalidColor(s.to_string()));
        }
        let channel = |c: f32| c.clamp(0.0, 255.0) / 255.0;

        match parts.as_slice() {
            [r, g, b] => Ok(Self::new(channel(*r), channel(*g), channel(*b), 1.0)),
            [r, g, b, a] => Ok(Self::new(
                channel(*r),
                channel(*g),
                channel(*b),
                a.clamp(0.0, 1.0),
            )),
            _ => Err(BlossomError::InvalidColor(s.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut c = [0u8; 3];
            for (i, ch) in hex.chars().enumerate() {
                let v = ch.to_digit(16)? as u8;
                c[i] = v * 16 + v;
            }
            Some(Color::new(
                c[0] as f32 / 255.0,
                c[1] as f32 / 255.0,
                c[2] as f32 / 255.0,
                1.0,
            ))
        }
        6 | 8 => {
            let r = channel(0)?;
            let g = channel(2)?;
            let b = channel(4)?;
            let a = if hex.len() == 8 { channel(6)? } else { 255 };
            Some(Color::new(
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                a as f32 / 255.0,
            ))
        }
        _ => None,
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(4.0, 5.0);

        assert_eq!(v1 + v2, Vec2::new(5.0, 7.0));
        assert_eq!(v2 - v1, Vec2::new(3.0, 3.0));
        assert_eq!(v1 * 2.0, Vec2::new(2.0, 4.0));

        let mut v = v1;
        v += v2;
        assert_eq!(v, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn test_from_polar() {
        let v = Vec2::from_polar(std::f32::consts::FRAC_PI_2, 3.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 3.0).abs() < 1e-5);
        assert!((v.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFF8844);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!((c.b - 0.267).abs() < 0.01);
    }

    #[test]
    fn test_color_parse_css_forms() {
        let gold = Color::parse("#FFD700").unwrap();
        assert!((gold.g - 215.0 / 255.0).abs() < 1e-4);
        assert_eq!(gold.a, 1.0);

        let short = Color::parse("#fff").unwrap();
        assert_eq!(short, Color::WHITE);

        let pink = Color::parse("rgba(255, 183, 197, 0.6)").unwrap();
        assert!((pink.g - 183.0 / 255.0).abs() < 1e-4);
        assert!((pink.a - 0.6).abs() < 1e-6);

        let overlay = Color::parse("rgb(0, 0, 0)").unwrap();
        assert_eq!(overlay, Color::BLACK);
    }

    #[test]
    fn test_color_parse_clamps_channels() {
        let c = Color::parse("rgb(300, -5, 128)").unwrap();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);

        let c = Color::parse("rgba(512, 0, 0, 2)").unwrap();
        assert_eq!(c, Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_color_parse_rejects_garbage() {
        assert!(Color::parse("gold").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("rgba(1, 2)").is_err());
        assert!(Color::parse("rgb(nan, 0, 0)").is_err());
        assert!(Color::parse("rgb(a, b, c)").is_err());
    }

    #[test]
    fn test_range_validate() {
        assert!(ValueRange::new(0.0, 1.0).validate("speed").is_ok());
        assert!(ValueRange::constant(2.0).validate("size").is_ok());
        assert!(ValueRange::new(2.0, 1.0).validate("size").is_err());
        assert!(ValueRange::new(0.0, f32::INFINITY).validate("size").is_err());
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0.0, -10.0, 100.0, 10.0);
        assert!(r.contains(Vec2::new(50.0, -5.0)));
        assert!(!r.contains(Vec2::new(50.0, 0.0)));
        assert!(!r.contains(Vec2::new(100.0, -5.0)));
    }
}

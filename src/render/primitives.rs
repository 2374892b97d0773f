use std::sync::Arc;

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> ChartResult<Self> {
        let invalid = || ChartError::InvalidData(format!("invalid hex color `{text}`"));
        let digits = text.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| -> ChartResult<f64> {
            let raw = u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())?;
            Ok(f64::from(raw) / 255.0)
        };
        let short = |index: usize| -> ChartResult<f64> {
            let raw = u8::from_str_radix(&digits[index..=index], 16).map_err(|_| invalid())?;
            Ok(f64::from(raw * 17) / 255.0)
        };

        match digits.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb`; alpha is carried separately as opacity.
    #[must_use]
    pub fn to_hex(self) -> String {
        let to_byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.red),
            to_byte(self.green),
            to_byte(self.blue)
        )
    }

    #[must_use]
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.red as f32,
            self.green as f32,
            self.blue as f32,
            self.alpha as f32,
        ]
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Paint attributes shared by every primitive kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub color: Color,
    pub visible: bool,
    pub opacity: f64,
    pub width: f64,
}

impl PaintStyle {
    #[must_use]
    pub const fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            visible: true,
            opacity: 1.0,
            width,
        }
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ChartError::InvalidData(
                "paint width must be finite and > 0".to_owned(),
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidData(
                "paint opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Interleaved `x, y` coordinates in scale space.
///
/// Shared so that an unchanged polyline can be recognized by pointer.
pub type Polyline = Arc<[f64]>;

/// Marker size, in pixels, for points whose value is not finite.
pub const TRIANGLE_SIZE: f64 = 12.0;

/// Marker radius, in pixels, for isolated finite points.
pub const CIRCLE_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polyline(Polyline),
    /// Upward triangle centered on its centroid; `size` is the side length in pixels.
    Triangle { center: [f64; 2], size: f64 },
    Circle { center: [f64; 2], radius: f64 },
}

impl Shape {
    /// Cheap equality: shared polylines compare by pointer first.
    #[must_use]
    pub fn same_geometry(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Polyline(a), Self::Polyline(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => self == other,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        match self {
            Self::Polyline(coordinates) => {
                if coordinates.len() < 4 || coordinates.len() % 2 != 0 {
                    return Err(ChartError::InvalidData(
                        "polyline needs at least two interleaved points".to_owned(),
                    ));
                }
                if coordinates.iter().any(|value| !value.is_finite()) {
                    return Err(ChartError::InvalidData(
                        "polyline coordinates must be finite".to_owned(),
                    ));
                }
            }
            Self::Triangle { center, size: extent } | Self::Circle { center, radius: extent } => {
                if !center[0].is_finite() || !center[1].is_finite() {
                    return Err(ChartError::InvalidData(
                        "marker center must be finite".to_owned(),
                    ));
                }
                if !extent.is_finite() || *extent <= 0.0 {
                    return Err(ChartError::InvalidData(
                        "marker size must be finite and > 0".to_owned(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One cacheable draw item. The renderer keeps per-`cache_id` state
/// between frames and only rebuilds what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPrimitive {
    pub cache_id: String,
    pub shape: Shape,
    pub style: PaintStyle,
}

impl SeriesPrimitive {
    #[must_use]
    pub fn new(cache_id: impl Into<String>, shape: Shape, style: PaintStyle) -> Self {
        Self {
            cache_id: cache_id.into(),
            shape,
            style,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.cache_id.is_empty() {
            return Err(ChartError::InvalidData(
                "primitive cache id must not be empty".to_owned(),
            ));
        }
        self.shape.validate()?;
        self.style.validate()
    }
}

/// Pixel-space vertices of a centroid-centered upward triangle:
/// bottom-left, bottom-right, apex.
#[must_use]
pub fn triangle_vertices(center: [f64; 2], size: f64) -> [[f64; 2]; 3] {
    let altitude = size * 3f64.sqrt() / 2.0;
    let base_y = center[1] + altitude / 3.0;
    [
        [center[0] - size / 2.0, base_y],
        [center[0] + size / 2.0, base_y],
        [center[0], center[1] - altitude * 2.0 / 3.0],
    ]
}

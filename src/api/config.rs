use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chart::DEFAULT_LINE_WIDTH;
use crate::core::{Extent, ScaleType};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{SCROLL_ZOOM_SPEED_FACTOR, ZOOM_HINT_DELAY};
use crate::render::RendererType;

/// Public line chart bootstrap configuration.
///
/// Serializable so hosts can persist chart setup next to their own state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    /// Explicit renderer choice; `None` picks the best one available.
    #[serde(default)]
    pub preferred_renderer: Option<RendererType>,
    #[serde(default)]
    pub x_scale_type: ScaleType,
    #[serde(default)]
    pub y_scale_type: ScaleType,
    #[serde(default)]
    pub ignore_y_outliers: bool,
    #[serde(default)]
    pub disable_tooltip: bool,
    #[serde(default)]
    pub fixed_view_box: Option<Extent>,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_scroll_zoom_speed")]
    pub scroll_zoom_speed: f64,
    #[serde(default = "default_zoom_hint_delay_ms")]
    pub zoom_hint_delay_ms: u64,
    #[serde(default = "default_coalesce_updates")]
    pub coalesce_updates: bool,
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            preferred_renderer: None,
            x_scale_type: ScaleType::Linear,
            y_scale_type: ScaleType::Linear,
            ignore_y_outliers: false,
            disable_tooltip: false,
            fixed_view_box: None,
            device_pixel_ratio: default_device_pixel_ratio(),
            line_width: default_line_width(),
            scroll_zoom_speed: default_scroll_zoom_speed(),
            zoom_hint_delay_ms: default_zoom_hint_delay_ms(),
            coalesce_updates: default_coalesce_updates(),
        }
    }
}

impl LineChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_preferred_renderer(mut self, renderer: RendererType) -> Self {
        self.preferred_renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn with_scale_types(mut self, x_scale_type: ScaleType, y_scale_type: ScaleType) -> Self {
        self.x_scale_type = x_scale_type;
        self.y_scale_type = y_scale_type;
        self
    }

    #[must_use]
    pub fn with_ignore_y_outliers(mut self, ignore: bool) -> Self {
        self.ignore_y_outliers = ignore;
        self
    }

    #[must_use]
    pub fn with_disable_tooltip(mut self, disable: bool) -> Self {
        self.disable_tooltip = disable;
        self
    }

    #[must_use]
    pub fn with_fixed_view_box(mut self, view_box: Extent) -> Self {
        self.fixed_view_box = Some(view_box);
        self
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub fn with_scroll_zoom_speed(mut self, speed: f64) -> Self {
        self.scroll_zoom_speed = speed;
        self
    }

    #[must_use]
    pub fn with_zoom_hint_delay(mut self, delay: Duration) -> Self {
        self.zoom_hint_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_coalesce_updates(mut self, coalesce: bool) -> Self {
        self.coalesce_updates = coalesce;
        self
    }

    #[must_use]
    pub fn zoom_hint_delay(&self) -> Duration {
        Duration::from_millis(self.zoom_hint_delay_ms)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "device pixel ratio must be finite and > 0, got {}",
                self.device_pixel_ratio
            )));
        }
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "line width must be finite and > 0, got {}",
                self.line_width
            )));
        }
        if !self.scroll_zoom_speed.is_finite() || self.scroll_zoom_speed <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "scroll zoom speed must be finite and > 0, got {}",
                self.scroll_zoom_speed
            )));
        }
        if let Some(view_box) = self.fixed_view_box {
            if !view_box.is_valid() {
                return Err(ChartError::InvalidExtent {
                    min: view_box.x.0,
                    max: view_box.x.1,
                });
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize line chart config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse line chart config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

fn default_scroll_zoom_speed() -> f64 {
    SCROLL_ZOOM_SPEED_FACTOR
}

fn default_zoom_hint_delay_ms() -> u64 {
    u64::try_from(ZOOM_HINT_DELAY.as_millis()).unwrap_or(u64::MAX)
}

fn default_coalesce_updates() -> bool {
    true
}

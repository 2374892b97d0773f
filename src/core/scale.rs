use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ticks::{
    MAX_DECIMAL_EXPONENT, MIN_DECIMAL_EXPONENT, decimal, floor_snapped, linear_ticks, log_ticks,
    nice_linear,
};
use crate::error::{ChartError, ChartResult};

/// Smallest positive value a log domain is clamped to.
pub const LOG_DOMAIN_FLOOR: f64 = f64::MIN_POSITIVE;

/// Fraction of the span added on each side by `padded_domain`.
pub const DOMAIN_PADDING_RATIO: f64 = 0.05;

/// Padding used when a linear domain collapses onto zero.
const ZERO_SPAN_PADDING: f64 = 0.01;

/// Tick count the nice rounding aims for.
const NICE_TICK_COUNT: usize = 10;

/// Tolerance for matching a value against the 1-2-5 log grid.
const LOG_GRID_TOLERANCE: f64 = 1e-9;

/// Mapping family used on one chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    #[default]
    Linear,
    Log10,
    /// Linear mapping over epoch milliseconds.
    Time,
}

impl ScaleType {
    #[must_use]
    pub fn scale(self) -> &'static dyn Scale {
        create_scale(self)
    }
}

/// Pure mapping between a data domain and an output range.
///
/// Implementations are stateless; domain and range travel with every call.
/// No operation panics or returns non-finite output for finite input, so
/// bad data never escapes to renderers.
pub trait Scale: fmt::Debug + Send + Sync {
    fn scale_type(&self) -> ScaleType;

    /// Maps a domain value into `range`.
    fn forward(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64;

    /// Maps a range value back into `domain`.
    fn reverse(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64;

    /// View-independent monotone transform into the scale's linear space.
    ///
    /// `forward` is an affine map of this transform, which lets renderers
    /// cache transformed geometry and re-project with a camera only.
    fn transform(&self, value: f64) -> f64;

    /// Inverse of [`Scale::transform`].
    fn untransform(&self, value: f64) -> f64;

    /// Extends the domain outward to round values. Idempotent.
    fn nice_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)>;

    /// Adds breathing room around the domain before rounding.
    fn padded_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)>;

    /// Round values within the domain, roughly `size_guidance` of them.
    fn ticks(&self, domain: (f64, f64), size_guidance: usize) -> Vec<f64>;

    /// Whether the value may take part in extent computations.
    fn is_safe_number(&self, value: f64) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinearScale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Log10Scale;

/// Linear scale over epoch milliseconds; only formatting differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeScale;

static LINEAR: LinearScale = LinearScale;
static LOG10: Log10Scale = Log10Scale;
static TIME: TimeScale = TimeScale;

/// Returns the shared instance for `scale_type`.
#[must_use]
pub fn create_scale(scale_type: ScaleType) -> &'static dyn Scale {
    match scale_type {
        ScaleType::Linear => &LINEAR,
        ScaleType::Log10 => &LOG10,
        ScaleType::Time => &TIME,
    }
}

fn validate_domain((min, max): (f64, f64)) -> ChartResult<(f64, f64)> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidData(
            "scale domain must be finite".to_owned(),
        ));
    }
    if min > max {
        return Err(ChartError::InvalidExtent { min, max });
    }
    Ok((min, max))
}

fn affine_forward(domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
    let domain_spread = domain.1 - domain.0;
    if domain_spread == 0.0 || !domain_spread.is_finite() {
        return range.0;
    }
    let range_spread = range.1 - range.0;
    (range_spread / domain_spread) * (value - domain.0) + range.0
}

fn affine_reverse(domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
    let range_spread = range.1 - range.0;
    if range_spread == 0.0 || !range_spread.is_finite() {
        return domain.0;
    }
    let domain_spread = domain.1 - domain.0;
    (domain_spread / range_spread) * (value - range.0) + domain.0
}

fn linear_padding(min: f64, max: f64) -> f64 {
    if min == max {
        if min == 0.0 {
            ZERO_SPAN_PADDING
        } else {
            min.abs() * DOMAIN_PADDING_RATIO
        }
    } else {
        (max - min) * DOMAIN_PADDING_RATIO
    }
}

impl Scale for LinearScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Linear
    }

    fn forward(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        affine_forward(domain, range, value)
    }

    fn reverse(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        affine_reverse(domain, range, value)
    }

    fn transform(&self, value: f64) -> f64 {
        value
    }

    fn untransform(&self, value: f64) -> f64 {
        value
    }

    fn nice_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        let (mut min, mut max) = validate_domain(domain)?;
        if min == max {
            let padding = linear_padding(min, max);
            min -= padding;
            max += padding;
        }
        if !(max - min).is_finite() {
            return Ok((min, max));
        }
        Ok(nice_linear(min, max, NICE_TICK_COUNT))
    }

    fn padded_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        let (min, max) = validate_domain(domain)?;
        let padding = linear_padding(min, max);
        Ok((min - padding, max + padding))
    }

    fn ticks(&self, domain: (f64, f64), size_guidance: usize) -> Vec<f64> {
        linear_ticks(domain.0, domain.1, size_guidance)
    }

    fn is_safe_number(&self, value: f64) -> bool {
        value.is_finite()
    }
}

impl Scale for TimeScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Time
    }

    fn forward(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        LINEAR.forward(domain, range, value)
    }

    fn reverse(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        LINEAR.reverse(domain, range, value)
    }

    fn transform(&self, value: f64) -> f64 {
        value
    }

    fn untransform(&self, value: f64) -> f64 {
        value
    }

    fn nice_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        LINEAR.nice_domain(domain)
    }

    fn padded_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        LINEAR.padded_domain(domain)
    }

    fn ticks(&self, domain: (f64, f64), size_guidance: usize) -> Vec<f64> {
        LINEAR.ticks(domain, size_guidance)
    }

    fn is_safe_number(&self, value: f64) -> bool {
        value.is_finite()
    }
}

fn clamp_positive(value: f64) -> f64 {
    if value > LOG_DOMAIN_FLOOR {
        value
    } else {
        LOG_DOMAIN_FLOOR
    }
}

fn log_transform(value: f64) -> f64 {
    clamp_positive(value).log10()
}

fn log_untransform(value: f64) -> f64 {
    clamp_positive(10f64.powf(value))
}

/// Splits a positive value into `(mantissa, exponent)` with
/// `1 <= mantissa < 10` up to snapping tolerance.
fn decompose(value: f64) -> (f64, i32) {
    let exponent = (floor_snapped(value.log10()) as i32)
        .clamp(MIN_DECIMAL_EXPONENT, MAX_DECIMAL_EXPONENT);
    (value / decimal(1.0, exponent), exponent)
}

fn log_grid_floor(value: f64) -> f64 {
    let (mantissa, exponent) = decompose(value);
    let step = if mantissa >= 5.0 * (1.0 - LOG_GRID_TOLERANCE) {
        5.0
    } else if mantissa >= 2.0 * (1.0 - LOG_GRID_TOLERANCE) {
        2.0
    } else {
        1.0
    };
    clamp_positive(decimal(step, exponent))
}

fn log_grid_ceil(value: f64) -> f64 {
    let (mantissa, exponent) = decompose(value);
    if mantissa <= 1.0 + LOG_GRID_TOLERANCE {
        clamp_positive(decimal(1.0, exponent))
    } else if mantissa <= 2.0 * (1.0 + LOG_GRID_TOLERANCE) {
        decimal(2.0, exponent)
    } else if mantissa <= 5.0 * (1.0 + LOG_GRID_TOLERANCE) {
        decimal(5.0, exponent)
    } else {
        decimal(1.0, exponent + 1)
    }
}

fn log_grid_previous(grid_value: f64) -> f64 {
    let (mantissa, exponent) = decompose(grid_value);
    let previous = if mantissa >= 5.0 * (1.0 - LOG_GRID_TOLERANCE) {
        decimal(2.0, exponent)
    } else if mantissa >= 2.0 * (1.0 - LOG_GRID_TOLERANCE) {
        decimal(1.0, exponent)
    } else {
        decimal(5.0, exponent - 1)
    };
    clamp_positive(previous)
}

fn log_grid_next(grid_value: f64) -> f64 {
    let (mantissa, exponent) = decompose(grid_value);
    if mantissa >= 5.0 * (1.0 - LOG_GRID_TOLERANCE) {
        decimal(1.0, exponent + 1)
    } else if mantissa >= 2.0 * (1.0 - LOG_GRID_TOLERANCE) {
        decimal(5.0, exponent)
    } else {
        decimal(2.0, exponent)
    }
}

impl Scale for Log10Scale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Log10
    }

    /// Non-positive (and NaN) values map to the start of the range.
    fn forward(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        if !(value > 0.0) {
            return range.0;
        }
        affine_forward(
            (log_transform(domain.0), log_transform(domain.1)),
            range,
            value.log10(),
        )
    }

    fn reverse(&self, domain: (f64, f64), range: (f64, f64), value: f64) -> f64 {
        let transformed = affine_reverse(
            (log_transform(domain.0), log_transform(domain.1)),
            range,
            value,
        );
        log_untransform(transformed)
    }

    fn transform(&self, value: f64) -> f64 {
        log_transform(value)
    }

    fn untransform(&self, value: f64) -> f64 {
        log_untransform(value)
    }

    fn nice_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        let (min, max) = validate_domain(domain)?;
        let mut low = log_grid_floor(clamp_positive(min));
        let mut high = log_grid_ceil(clamp_positive(max));
        if low >= high {
            low = log_grid_previous(low);
            high = log_grid_next(high);
        }
        Ok((low, high))
    }

    fn padded_domain(&self, domain: (f64, f64)) -> ChartResult<(f64, f64)> {
        let (min, max) = validate_domain(domain)?;
        if !(min > 0.0) {
            return Ok((LOG_DOMAIN_FLOOR, clamp_positive(max)));
        }

        let low = min.log10();
        let high = max.log10();
        let padding = if low == high {
            if low == 0.0 {
                ZERO_SPAN_PADDING
            } else {
                low.abs() * DOMAIN_PADDING_RATIO
            }
        } else {
            (high - low) * DOMAIN_PADDING_RATIO
        };
        Ok((
            log_untransform(low - padding),
            log_untransform(high + padding),
        ))
    }

    fn ticks(&self, domain: (f64, f64), size_guidance: usize) -> Vec<f64> {
        log_ticks(
            clamp_positive(domain.0),
            clamp_positive(domain.1),
            size_guidance,
        )
    }

    fn is_safe_number(&self, value: f64) -> bool {
        value.is_finite() && value > 0.0
    }
}

//! Tick generation and outward domain rounding.
//!
//! Linear steps follow the usual 1/2/5 x 10^k ladder; log ticks enumerate
//! mantissas 1..9 inside each decade.

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Relative tolerance used when snapping near-integer quotients.
const SNAP_EPSILON: f64 = 1e-9;

/// Maximum refinement passes for `nice_linear`.
const NICE_MAX_ITERATIONS: usize = 10;

pub(crate) const MIN_DECIMAL_EXPONENT: i32 = -307;
pub(crate) const MAX_DECIMAL_EXPONENT: i32 = 307;

fn snap(value: f64) -> Option<f64> {
    let rounded = value.round();
    ((value - rounded).abs() <= SNAP_EPSILON * rounded.abs().max(1.0)).then_some(rounded)
}

pub(crate) fn floor_snapped(value: f64) -> f64 {
    snap(value).unwrap_or_else(|| value.floor())
}

pub(crate) fn ceil_snapped(value: f64) -> f64 {
    snap(value).unwrap_or_else(|| value.ceil())
}

fn step_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// Signed step encoding: positive values are the step itself, negative
/// values `-k` stand for a step of `1 / k` (keeps fractional steps exact).
pub(crate) fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = step_factor(error);
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Extends `[start, stop]` outward to multiples of a round step.
///
/// Near-integer quotients are snapped before rounding so that an already
/// round domain comes back unchanged.
pub(crate) fn nice_linear(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let (mut start, mut stop) = (start, stop);
    let mut previous_step: Option<f64> = None;

    for _ in 0..NICE_MAX_ITERATIONS {
        let step = tick_increment(start, stop, count);
        if previous_step == Some(step) {
            break;
        }
        if step > 0.0 {
            start = floor_snapped(start / step) * step;
            stop = ceil_snapped(stop / step) * step;
        } else if step < 0.0 {
            start = ceil_snapped(start * step) / step;
            stop = floor_snapped(stop * step) / step;
        } else {
            break;
        }
        previous_step = Some(step);
    }

    (start, stop)
}

struct TickRange {
    first: f64,
    last: f64,
    increment: f64,
}

fn tick_range(start: f64, stop: f64, count: f64) -> TickRange {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let factor = step_factor(step / 10f64.powf(power));

    let (mut first, mut last, increment);
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        first = (start * inc).round();
        last = (stop * inc).round();
        if first / inc < start {
            first += 1.0;
        }
        if last / inc > stop {
            last -= 1.0;
        }
        increment = -inc;
    } else {
        let inc = 10f64.powf(power) * factor;
        first = (start / inc).round();
        last = (stop / inc).round();
        if first * inc < start {
            first += 1.0;
        }
        if last * inc > stop {
            last -= 1.0;
        }
        increment = inc;
    }

    if last < first && (0.5..2.0).contains(&count) {
        return tick_range(start, stop, count * 2.0);
    }
    TickRange {
        first,
        last,
        increment,
    }
}

/// Round values inside `[start, stop]`, roughly `count` of them.
pub(crate) fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (low, high) = if stop < start {
        (stop, start)
    } else {
        (start, stop)
    };

    let range = tick_range(low, high, count as f64);
    if !(range.last >= range.first) || !range.increment.is_finite() {
        return Vec::new();
    }

    let n = (range.last - range.first) as usize + 1;
    let mut ticks: Vec<f64> = (0..n)
        .map(|i| {
            let index = range.first + i as f64;
            if range.increment < 0.0 {
                index / -range.increment
            } else {
                index * range.increment
            }
        })
        .collect();
    if stop < start {
        ticks.reverse();
    }
    ticks
}

/// `mantissa * 10^exponent`, dividing for negative exponents so that
/// results match their decimal literals (`3 / 100 == 0.03`).
pub(crate) fn decimal(mantissa: f64, exponent: i32) -> f64 {
    let exponent = exponent.clamp(MIN_DECIMAL_EXPONENT, MAX_DECIMAL_EXPONENT);
    if exponent < 0 {
        mantissa / 10f64.powi(-exponent)
    } else {
        mantissa * 10f64.powi(exponent)
    }
}

/// Decade-aware ticks for a strictly positive domain.
pub(crate) fn log_ticks(low: f64, high: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(low > 0.0) || !(high > 0.0) || !low.is_finite() || !high.is_finite() {
        return Vec::new();
    }
    let (low, high) = if high < low { (high, low) } else { (low, high) };
    if low == high {
        return vec![low];
    }

    let first_decade = low.log10().floor() as i32;
    let last_decade = high.log10().ceil() as i32;

    if ((last_decade - first_decade) as usize) < count {
        let mut ticks = Vec::new();
        for exponent in first_decade..=last_decade {
            for mantissa in 1..10 {
                let tick = decimal(f64::from(mantissa), exponent);
                if tick < low {
                    continue;
                }
                if tick > high {
                    return ticks;
                }
                ticks.push(tick);
            }
        }
        return ticks;
    }

    let span = (last_decade - first_decade) as usize;
    linear_ticks(
        f64::from(first_decade),
        f64::from(last_decade),
        span.min(count),
    )
    .into_iter()
    .filter_map(|exponent| {
        let tick = decimal(1.0, exponent.round() as i32);
        (tick >= low && tick <= high).then_some(tick)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_absorbs_float_noise() {
        assert_eq!(floor_snapped(2.999_999_999_999_999_6), 3.0);
        assert_eq!(ceil_snapped(3.000_000_000_000_000_4), 3.0);
        assert_eq!(floor_snapped(2.5), 2.0);
        assert_eq!(ceil_snapped(2.5), 3.0);
    }

    #[test]
    fn fractional_increment_is_encoded_as_negative_inverse() {
        assert_eq!(tick_increment(0.0, 1.0, 10), -10.0);
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
    }

    #[test]
    fn decimal_matches_literals() {
        assert_eq!(decimal(3.0, -2), 0.03);
        assert_eq!(decimal(7.0, 3), 7000.0);
    }
}

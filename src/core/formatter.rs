//! Axis and tooltip label formatting.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::core::scale::ScaleType;

/// Label formatting at the four levels of detail the chart uses.
pub trait Formatter: Send + Sync {
    /// Axis tick label.
    fn format_tick(&self, value: f64) -> String;

    /// Compact label for tight spaces.
    fn format_short(&self, value: f64) -> String;

    /// Tooltip label.
    fn format_readable(&self, value: f64) -> String;

    /// Full-precision label.
    fn format_long(&self, value: f64) -> String;
}

/// Plain numbers; switches to exponent notation outside `[1e-4, 1e4)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormatter;

/// Grouped numbers with at most four fraction digits at every level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntlNumberFormatter;

/// Grouped numbers with SI suffixes (`10k`, `1M`, `50µ`) for large and tiny values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiNumberFormatter;

/// Durations in milliseconds, rendered with the largest fitting unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeTimeFormatter;

/// Epoch milliseconds rendered as UTC wall time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallTimeFormatter;

static NUMBER: NumberFormatter = NumberFormatter;
static WALL_TIME: WallTimeFormatter = WallTimeFormatter;

/// Default formatter for an axis scale.
#[must_use]
pub fn formatter_for_scale(scale_type: ScaleType) -> &'static dyn Formatter {
    match scale_type {
        ScaleType::Linear | ScaleType::Log10 => &NUMBER,
        ScaleType::Time => &WALL_TIME,
    }
}

const EXPONENT_UPPER_BOUND: f64 = 1e4;
const EXPONENT_LOWER_BOUND: f64 = 1e-4;
const LONG_EXPONENT_LOWER_BOUND: f64 = 1e-6;
const LONG_EXPONENT_UPPER_BOUND: f64 = 1e21;
const SI_LOWER_BOUND: f64 = 1e-3;
const SIGNIFICANT_DIGITS: i32 = 4;
const SI_SIGNIFICANT_DIGITS: i32 = 3;
const LONG_FRACTION_DIGITS: usize = 6;
const INTL_FRACTION_DIGITS: usize = 4;
const SI_FRACTION_DIGITS: usize = 3;

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

fn format_non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_owned())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned())
    } else {
        None
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn normalize_zero(text: String) -> String {
    if text == "-0" { "0".to_owned() } else { text }
}

/// `1e+6`, `5e-5`, `1.23e+4`: trailing zeros dropped, explicit exponent sign.
fn format_exponential(value: f64, fraction_digits: usize) -> String {
    let raw = format!("{value:.fraction_digits$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{sign}{}", trim_fraction(mantissa), exponent.abs())
}

fn format_significant(value: f64, digits: i32) -> String {
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    normalize_zero(trim_fraction(&text).to_owned())
}

fn format_fixed_grouped(value: f64, fraction_digits: usize) -> String {
    let text = format!("{value:.fraction_digits$}");
    normalize_zero(group_thousands(trim_fraction(&text)))
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

fn needs_exponent(value: f64) -> bool {
    let magnitude = value.abs();
    magnitude >= EXPONENT_UPPER_BOUND || magnitude < EXPONENT_LOWER_BOUND
}

impl NumberFormatter {
    fn format_compact(value: f64, group: bool) -> String {
        if let Some(text) = format_non_finite(value) {
            return text;
        }
        if value == 0.0 {
            return "0".to_owned();
        }
        if needs_exponent(value) {
            return format_exponential(value, 2);
        }
        let text = format_significant(value, SIGNIFICANT_DIGITS);
        if group { group_thousands(&text) } else { text }
    }
}

impl Formatter for NumberFormatter {
    fn format_tick(&self, value: f64) -> String {
        Self::format_compact(value, false)
    }

    fn format_short(&self, value: f64) -> String {
        Self::format_compact(value, false)
    }

    fn format_readable(&self, value: f64) -> String {
        Self::format_compact(value, true)
    }

    fn format_long(&self, value: f64) -> String {
        if let Some(text) = format_non_finite(value) {
            return text;
        }
        if value == 0.0 {
            return "0".to_owned();
        }
        let magnitude = value.abs();
        if magnitude < LONG_EXPONENT_LOWER_BOUND || magnitude >= LONG_EXPONENT_UPPER_BOUND {
            return format_exponential(value, LONG_FRACTION_DIGITS);
        }
        format_fixed_grouped(value, LONG_FRACTION_DIGITS)
    }
}

impl IntlNumberFormatter {
    fn format_intl(value: f64) -> String {
        format_non_finite(value)
            .unwrap_or_else(|| format_fixed_grouped(value, INTL_FRACTION_DIGITS))
    }
}

impl Formatter for IntlNumberFormatter {
    fn format_tick(&self, value: f64) -> String {
        Self::format_intl(value)
    }

    fn format_short(&self, value: f64) -> String {
        Self::format_intl(value)
    }

    fn format_readable(&self, value: f64) -> String {
        Self::format_intl(value)
    }

    fn format_long(&self, value: f64) -> String {
        Self::format_intl(value)
    }
}

impl SiNumberFormatter {
    fn format_si(value: f64) -> String {
        if let Some(text) = format_non_finite(value) {
            return text;
        }
        let magnitude = value.abs();
        if value == 0.0 || (magnitude < EXPONENT_UPPER_BOUND && magnitude >= SI_LOWER_BOUND) {
            return format_fixed_grouped(value, SI_FRACTION_DIGITS);
        }

        let exponent = ((magnitude.log10() / 3.0).floor() as i32).clamp(-8, 8);
        let scaled = value / 10f64.powi(exponent * 3);
        let prefix = SI_PREFIXES[(exponent + 8) as usize];
        format!("{}{prefix}", format_significant(scaled, SI_SIGNIFICANT_DIGITS))
    }
}

impl Formatter for SiNumberFormatter {
    fn format_tick(&self, value: f64) -> String {
        Self::format_si(value)
    }

    fn format_short(&self, value: f64) -> String {
        Self::format_si(value)
    }

    fn format_readable(&self, value: f64) -> String {
        Self::format_si(value)
    }

    fn format_long(&self, value: f64) -> String {
        Self::format_si(value)
    }
}

const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60.0 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: f64 = 60.0 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: f64 = 24.0 * MILLIS_PER_HOUR;
const MILLIS_PER_YEAR: f64 = 365.0 * MILLIS_PER_DAY;

const RELATIVE_UNITS: [(f64, &str); 5] = [
    (MILLIS_PER_YEAR, "yr"),
    (MILLIS_PER_DAY, "day"),
    (MILLIS_PER_HOUR, "hr"),
    (MILLIS_PER_MINUTE, "min"),
    (MILLIS_PER_SECOND, "sec"),
];

impl RelativeTimeFormatter {
    fn format_duration(value: f64) -> String {
        if let Some(text) = format_non_finite(value) {
            return text;
        }
        if value == 0.0 {
            return "0".to_owned();
        }
        let sign = if value < 0.0 { "-" } else { "" };
        let magnitude = value.abs();
        let (unit_millis, unit) = RELATIVE_UNITS
            .iter()
            .copied()
            .find(|(unit_millis, _)| magnitude >= *unit_millis)
            .unwrap_or((1.0, "ms"));
        let amount = format!("{:.3}", magnitude / unit_millis);
        format!("{sign}{} {unit}", trim_fraction(&amount))
    }
}

impl Formatter for RelativeTimeFormatter {
    fn format_tick(&self, value: f64) -> String {
        Self::format_duration(value)
    }

    fn format_short(&self, value: f64) -> String {
        Self::format_duration(value)
    }

    fn format_readable(&self, value: f64) -> String {
        Self::format_duration(value)
    }

    fn format_long(&self, value: f64) -> String {
        Self::format_duration(value)
    }
}

const INVALID_DATE: &str = "Invalid Date";

impl WallTimeFormatter {
    fn to_datetime(value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(value.round() as i64)
    }

    fn format_with(value: f64, pattern: &str) -> String {
        match Self::to_datetime(value) {
            Some(time) => time.format(pattern).to_string(),
            None => INVALID_DATE.to_owned(),
        }
    }

    /// Picks the coarsest pattern that still distinguishes the instant:
    /// milliseconds, seconds, minutes, hours, days, months, then years.
    fn tick_pattern(time: &DateTime<Utc>) -> &'static str {
        if time.timestamp_subsec_millis() != 0 {
            ".%3f"
        } else if time.second() != 0 {
            ":%S"
        } else if time.minute() != 0 {
            "%I:%M"
        } else if time.hour() != 0 {
            "%I %p"
        } else if time.day() != 1 {
            if time.weekday() == Weekday::Sun {
                "%b %d"
            } else {
                "%a %d"
            }
        } else if time.month() != 1 {
            "%B"
        } else {
            "%Y"
        }
    }
}

impl Formatter for WallTimeFormatter {
    fn format_tick(&self, value: f64) -> String {
        match Self::to_datetime(value) {
            Some(time) => time.format(Self::tick_pattern(&time)).to_string(),
            None => INVALID_DATE.to_owned(),
        }
    }

    fn format_short(&self, value: f64) -> String {
        Self::format_with(value, "%b %-d, %Y, %-I:%M:%S %p")
    }

    fn format_readable(&self, value: f64) -> String {
        Self::format_with(value, "%b %-d, %Y, %-I:%M:%S %p UTC")
    }

    fn format_long(&self, value: f64) -> String {
        Self::format_with(value, "%B %-d, %Y, %-I:%M:%S%.3f %p UTC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping_keeps_sign_and_fraction() {
        assert_eq!(group_thousands("-1234567.25"), "-1,234,567.25");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
    }

    #[test]
    fn exponential_drops_trailing_zeros() {
        assert_eq!(format_exponential(1_000_000.0, 2), "1e+6");
        assert_eq!(format_exponential(0.000_05, 2), "5e-5");
        assert_eq!(format_exponential(-12_345.0, 2), "-1.23e+4");
    }

    #[test]
    fn significant_digits_trim_zeros() {
        assert_eq!(format_significant(3.01, 4), "3.01");
        assert_eq!(format_significant(-100.4, 4), "-100.4");
        assert_eq!(format_significant(9999.0, 4), "9999");
    }
}

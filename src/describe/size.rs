//! Byte size formatting and parsing
//!
//! Sizes coming from the backend are byte counts where `-1` stands for
//! "unlimited". That sentinel never reaches the formatter: every entry point
//! here maps negative values to `None`.

use crate::api::config::Size;
use crate::utils::error::{Result, StorageError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Backend sentinel for an unlimited or unknown size
pub const UNLIMITED: i64 = -1;

const IEC_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
const SI_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)(?:\.([0-9]+))?\s*(?:([kmgtp])(i)?(b)?|(b))?\s*$")
        .expect("size pattern is valid")
});

/// Fraction digits kept when parsing; finer digits are below one byte.
const MAX_FRACTION_DIGITS: usize = 18;

/// Quantity and unit pair, as shown in size inputs
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSize {
    pub size: Option<f64>,
    pub unit: Option<String>,
}

fn unit_index(bytes: u64, base: u64) -> usize {
    let mut index = 0;
    let mut limit = base;
    while index < IEC_UNITS.len() - 1 && bytes >= limit {
        index += 1;
        limit = limit.saturating_mul(base);
    }
    index
}

/// Drop trailing zeros from a fixed-point rendering: "1.50" -> "1.5", "2.00" -> "2".
fn trim_decimals(value: String) -> String {
    if value.contains('.') {
        value.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        value
    }
}

/// Human representation with IEC units, e.g. `1 KiB` or `1.5 GiB`
///
/// Returns `None` for the unlimited sentinel (or any negative value).
pub fn format_size(bytes: i64) -> Option<String> {
    let bytes = u64::try_from(bytes).ok()?;
    let index = unit_index(bytes, 1024);
    let value = bytes as f64 / 1024f64.powi(index as i32);
    Some(format!(
        "{} {}",
        trim_decimals(format!("{:.2}", value)),
        IEC_UNITS[index]
    ))
}

/// Representation that parses back to exactly the same number of bytes
///
/// The biggest unit with at most two decimals is preferred. SI units are
/// tried when the IEC one is not exact.
pub fn exact_size(bytes: u64) -> String {
    let start = unit_index(bytes, 1000);
    for index in (1..=start).rev() {
        for (base, units) in [(1024u128, IEC_UNITS), (1000u128, SI_UNITS)] {
            let unit = base.pow(index as u32);
            if (bytes as u128) < unit || (bytes as u128 * 100) % unit != 0 {
                continue;
            }
            let hundredths = bytes as u128 * 100 / unit;
            let value = format!("{}.{:02}", hundredths / 100, hundredths % 100);
            return format!("{} {}", trim_decimals(value), units[index]);
        }
    }
    format!("{} B", bytes)
}

/// Split a size into quantity and unit. The sentinel yields an empty pair.
pub fn split_size(bytes: i64, exact: bool) -> SplitSize {
    let rendered = match u64::try_from(bytes) {
        Ok(b) if exact => Some(exact_size(b)),
        Ok(_) => format_size(bytes),
        Err(_) => None,
    };

    match rendered {
        Some(text) => {
            let mut parts = text.split(' ');
            let size = parts.next().and_then(|q| q.parse::<f64>().ok());
            let unit = parts.next().map(str::to_string);
            SplitSize { size, unit }
        }
        None => SplitSize {
            size: None,
            unit: None,
        },
    }
}

/// Parse a human size (`1 KiB`, `1.5gb`, `2048`) into bytes
///
/// Units are case insensitive. `KiB`/`K` are binary, `KB` is decimal.
/// Decimals left after the conversion are truncated.
pub fn parse_size(input: &str) -> Result<u64> {
    let invalid = || StorageError::InvalidSize(input.to_string());
    let caps = SIZE_RE.captures(input).ok_or_else(invalid)?;

    let whole: u128 = caps[1].parse().map_err(|_| invalid())?;
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];

    let multiplier: u128 = match caps.get(3) {
        Some(prefix) => {
            let index = match prefix.as_str().to_ascii_lowercase().as_str() {
                "k" => 1,
                "m" => 2,
                "g" => 3,
                "t" => 4,
                _ => 5,
            };
            let decimal = caps.get(4).is_none() && caps.get(5).is_some();
            let base: u128 = if decimal { 1000 } else { 1024 };
            base.pow(index)
        }
        None => 1,
    };

    let mut bytes = whole.checked_mul(multiplier).ok_or_else(invalid)?;
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().map_err(|_| invalid())?;
        bytes += digits * multiplier / 10u128.pow(fraction.len() as u32);
    }

    u64::try_from(bytes).map_err(|_| invalid())
}

/// Text for a size range: `1 KiB - 2 KiB`, `at least 1 KiB` or a single size.
pub fn size_description(size: &Size) -> String {
    let min = format_size(size.min).unwrap_or_default();
    let max = size.max.and_then(format_size);

    match max {
        Some(max) if max != min => format!("{} - {}", min, max),
        Some(_) => min,
        None => format!("at least {}", min),
    }
}

/// Check user provided size limits, returning a message to display.
pub fn validate_size_range(min: &str, max: &str) -> Option<String> {
    if min.trim().is_empty() {
        return None;
    }

    let parsed_min = parse_size(min);
    let parsed_max = if max.trim().is_empty() {
        None
    } else {
        Some(parse_size(max))
    };

    match (parsed_min, parsed_max) {
        (Ok(_), None) => None,
        (Ok(min), Some(Ok(max))) if min <= max => None,
        (Ok(_), Some(Ok(_))) => Some("The minimum cannot be greater than the maximum".to_string()),
        (Ok(_), Some(Err(_))) => Some(
            "The maximum must be a number optionally followed by a unit like GiB or GB"
                .to_string(),
        ),
        (Err(_), None) | (Err(_), Some(Ok(_))) => Some(
            "The minimum must be a number optionally followed by a unit like GiB or GB"
                .to_string(),
        ),
        (Err(_), Some(Err(_))) => Some(
            "Size limits must be numbers optionally followed by a unit like GiB or GB".to_string(),
        ),
    }
}

/// GiB to bytes
pub fn gib(value: u64) -> u64 {
    value * 1024 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_size(0).as_deref(), Some("0 B"));
        assert_eq!(format_size(1023).as_deref(), Some("1023 B"));
        assert_eq!(format_size(1024).as_deref(), Some("1 KiB"));
        assert_eq!(format_size(1536).as_deref(), Some("1.5 KiB"));
        assert_eq!(format_size(gib(20) as i64).as_deref(), Some("20 GiB"));
    }

    #[test]
    fn sentinel_is_never_formatted() {
        assert_eq!(format_size(UNLIMITED), None);
        assert_eq!(
            split_size(UNLIMITED, false),
            SplitSize {
                size: None,
                unit: None
            }
        );
    }

    #[test]
    fn parses_binary_and_decimal_units() {
        assert_eq!(parse_size("1 KiB").unwrap(), 1024);
        assert_eq!(parse_size("1kib").unwrap(), 1024);
        assert_eq!(parse_size("1 KB").unwrap(), 1000);
        assert_eq!(parse_size("1.5 GiB").unwrap(), 1610612736);
        assert_eq!(parse_size("2048").unwrap(), 2048);
        assert_eq!(parse_size("10 B").unwrap(), 10);
        assert_eq!(parse_size("2G").unwrap(), gib(2));
        assert!(parse_size("").is_err());
        assert!(parse_size("ten GiB").is_err());
    }

    #[test]
    fn exact_size_round_trips() {
        for bytes in [0u64, 1, 1000, 1024, 1536, 1_000_000, 5_000_000_000, gib(3) + 1] {
            assert_eq!(parse_size(&exact_size(bytes)).unwrap(), bytes, "{}", bytes);
        }
        assert_eq!(exact_size(1000), "1 KB");
        assert_eq!(exact_size(gib(3) + 1), format!("{} B", gib(3) + 1));
    }

    #[test]
    fn splits_quantity_and_unit() {
        let split = split_size(1536, false);
        assert_eq!(split.size, Some(1.5));
        assert_eq!(split.unit.as_deref(), Some("KiB"));
    }

    #[test]
    fn describes_ranges() {
        let range = Size {
            default: false,
            min: 1024,
            max: Some(2048),
        };
        assert_eq!(size_description(&range), "1 KiB - 2 KiB");

        let open = Size {
            default: false,
            min: 1024,
            max: Some(UNLIMITED),
        };
        assert_eq!(size_description(&open), "at least 1 KiB");

        let fixed = Size {
            default: false,
            min: 1024,
            max: Some(1024),
        };
        assert_eq!(size_description(&fixed), "1 KiB");
    }

    #[test]
    fn validates_ranges() {
        assert_eq!(validate_size_range("", ""), None);
        assert_eq!(validate_size_range("1 GiB", ""), None);
        assert_eq!(validate_size_range("1 GiB", "2 GiB"), None);
        assert_eq!(
            validate_size_range("2 GiB", "1 GiB").as_deref(),
            Some("The minimum cannot be greater than the maximum")
        );
        assert!(validate_size_range("x", "1 GiB")
            .unwrap()
            .starts_with("The minimum"));
        assert!(validate_size_range("1 GiB", "x")
            .unwrap()
            .starts_with("The maximum"));
    }
}

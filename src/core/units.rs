//! Parsing and formatting of human-readable sizes and durations.

use std::sync::OnceLock;
use std::time::Duration;

use bytesize::ByteSize;
use regex::Regex;

use crate::core::errors::{Result, SizeCheckError};

/// Parse an operator-supplied size limit such as `"50GB"` or `"1.5 TiB"`.
///
/// All spaces are removed before parsing, so `"50 GB"` and `"5 0GB"` are
/// accepted. `K`/`KB` through `P`/`PB` are 1024-based, like their explicit
/// `KiB`..`PiB` forms.
pub fn parse_limit(raw: &str) -> Result<ByteSize> {
    let cleaned: String = raw.chars().filter(|c| *c != ' ').collect();
    if cleaned.is_empty() {
        return Err(SizeCheckError::InvalidLimit {
            input: raw.to_string(),
            details: "empty size string".to_string(),
        });
    }

    let split = cleaned
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(cleaned.len());
    let (number, unit) = cleaned.split_at(split);
    let normalized = match binary_unit(unit) {
        Some(binary) => format!("{number}{binary}"),
        None => cleaned.clone(),
    };

    normalized
        .parse::<ByteSize>()
        .map_err(|details| SizeCheckError::InvalidLimit {
            input: raw.to_string(),
            details,
        })
}

fn binary_unit(unit: &str) -> Option<&'static str> {
    match unit.to_ascii_uppercase().as_str() {
        "K" | "KB" => Some("KiB"),
        "M" | "MB" => Some("MiB"),
        "G" | "GB" => Some("GiB"),
        "T" | "TB" => Some("TiB"),
        "P" | "PB" => Some("PiB"),
        _ => None,
    }
}

/// Render a byte count with 1024-based `KB`..`PB` suffixes and two decimals
/// (`"5.00MB"`, `"512.00B"`), the same unit family [`parse_limit`] accepts.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    let mut unit = "B";
    let mut scale = 1u64;
    for (power, name) in (1u32..).zip(UNITS) {
        let next = 1024u64.pow(power);
        if bytes < next {
            break;
        }
        unit = name;
        scale = next;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64 / scale as f64;
    format!("{value:.2}{unit}")
}

fn duration_component() -> &'static Regex {
    static COMPONENT: OnceLock<Regex> = OnceLock::new();
    COMPONENT.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)")
            .expect("duration component pattern is valid")
    })
}

fn unit_nanos(unit: &str) -> f64 {
    match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        _ => 3600e9,
    }
}

/// Parse a Go-style duration string: `"30s"`, `"1m"`, `"1h30m"`, `"1.5h"`, `"250ms"`.
///
/// A bare `"0"` is accepted. Signs, bare numbers, and unknown units are rejected.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let input = raw.trim();
    let invalid = |details: &str| SizeCheckError::InvalidDuration {
        input: raw.to_string(),
        details: details.to_string(),
    };

    if input.is_empty() {
        return Err(invalid("empty duration string"));
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut cursor = 0;
    let mut total_nanos = 0.0_f64;
    for caps in duration_component().captures_iter(input) {
        let Some(whole) = caps.get(0) else { break };
        if whole.start() != cursor {
            return Err(invalid("unexpected characters"));
        }
        cursor = whole.end();
        let value: f64 = caps[1].parse().map_err(|_| invalid("bad number"))?;
        total_nanos += value * unit_nanos(&caps[2]);
    }
    if cursor != input.len() {
        return Err(invalid("missing or unknown unit"));
    }

    #[allow(clippy::cast_precision_loss)]
    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid("duration out of range"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Compact human formatting used in log lines (`45s`, `2m 5s`, `1h 30m`, `2d 3h`).
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 && duration.subsec_millis() > 0 {
        format!("{}ms", duration.subsec_millis())
    } else if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

use std::{num::NonZeroUsize, thread, time::Duration};

use gremlin_load::Reclaim;

use crate::error::ApiError;

const NANOS_PER_SEC: u128 = 1_000_000_000;
const KIB: usize = 1024;

/// Go-style duration with the sign kept apart from the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SignedDuration {
    pub negative: bool,
    pub magnitude: Duration,
}

impl SignedDuration {
    /// Negative values collapse to zero, which load validation rejects.
    pub fn clamped(self) -> Duration {
        if self.negative {
            Duration::ZERO
        } else {
            self.magnitude
        }
    }
}

/// Required query parameter, parsed with `parse`.
pub(crate) fn required<T>(
    value: Option<&str>,
    name: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ApiError> {
    match value.filter(|v| !v.is_empty()) {
        Some(raw) => parse(raw).ok_or_else(|| invalid_format(name)),
        None => Err(ApiError::InvalidRequest(format!(
            "{name} parameter is required"
        ))),
    }
}

pub(crate) fn invalid_format(name: &str) -> ApiError {
    ApiError::InvalidRequest(format!("invalid {name} format"))
}

/// Parses durations such as `300ms`, `1.5h` or `2h45m`.
///
/// Units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted without a unit.
pub(crate) fn parse_duration(input: &str) -> Option<SignedDuration> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if rest == "0" {
        return Some(SignedDuration {
            negative,
            magnitude: Duration::ZERO,
        });
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (frac, after) = match after.strip_prefix('.') {
            Some(after) => split_digits(after),
            None => ("", after),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_len);
        let scale = unit_nanos(unit)?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        total = total.checked_add(whole.checked_mul(scale)?)?;
        total = total.checked_add(fraction_nanos(frac, scale))?;
        rest = next;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Some(SignedDuration {
        negative,
        magnitude: Duration::new(secs, nanos),
    })
}

/// Non-negative Go-style duration, for configuration values.
pub fn parse_go_duration(input: &str) -> Result<Duration, String> {
    match parse_duration(input) {
        Some(d) if !d.negative || d.magnitude.is_zero() => Ok(d.magnitude),
        Some(_) => Err(format!("negative duration: '{input}'")),
        None => Err(format!("invalid duration: '{input}'")),
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let n = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(n)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    })
}

fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    // Digits past 18 are below nanosecond precision for every unit.
    let digits = &digits[..digits.len().min(18)];
    if digits.is_empty() {
        return 0;
    }
    let value: u128 = digits.parse().unwrap_or(0);
    value * scale / 10u128.pow(digits.len() as u32)
}

/// Parses `512kb`, `1.5gb`, `100 MB` into bytes (binary multiples).
///
/// Negative and non-finite sizes become `0`, which load validation rejects.
pub(crate) fn parse_size(input: &str) -> Option<usize> {
    let lower = input.trim().to_ascii_lowercase();
    let (mantissa, multiplier) = if let Some(m) = lower.strip_suffix("kb") {
        (m, KIB)
    } else if let Some(m) = lower.strip_suffix("mb") {
        (m, KIB * KIB)
    } else if let Some(m) = lower.strip_suffix("gb") {
        (m, KIB * KIB * KIB)
    } else {
        return None;
    };

    let value: f64 = mantissa.trim().parse().ok()?;
    let bytes = value * multiplier as f64;
    Some(if bytes.is_finite() && bytes > 0.0 {
        bytes as usize
    } else {
        0
    })
}

/// Task count, or `cpus` for the number of available cores.
pub(crate) fn parse_tasks(input: &str) -> Option<usize> {
    if input == "cpus" {
        return Some(
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        );
    }
    parse_count(input)
}

/// Signed integer; negatives become `0`.
pub(crate) fn parse_count(input: &str) -> Option<usize> {
    input
        .parse::<i64>()
        .ok()
        .map(|n| usize::try_from(n).unwrap_or(0))
}

/// `gc_after`: absent means immediate reclamation, `-1` or any negative delay means never.
pub(crate) fn parse_reclaim(input: Option<&str>) -> Result<Reclaim, ApiError> {
    let Some(raw) = input.filter(|v| !v.is_empty()) else {
        return Ok(Reclaim::Immediate);
    };
    if raw == "-1" {
        return Ok(Reclaim::Never);
    }
    let delay = parse_duration(raw).ok_or_else(|| invalid_format("gc_after"))?;
    Ok(if delay.negative && !delay.magnitude.is_zero() {
        Reclaim::Never
    } else {
        Reclaim::after(delay.magnitude)
    })
}

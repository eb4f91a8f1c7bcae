//! Text forms of `Time` and `Duration`.
//!
//! Times use RFC 3339 in UTC with the shortest exact fractional seconds.
//! Durations use the `72h3m0.5s` notation: hours, minutes and seconds above one
//! second, a single `ms`, `µs` or `ns` unit below it.

use core::fmt::Write;
use core::time::Duration;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::BoxError;

/// Format a time as RFC 3339 in UTC.
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use oc_conv::text::format_time;
///
/// assert_eq!(format_time(SystemTime::UNIX_EPOCH), "1970-01-01T00:00:00Z");
/// let t = SystemTime::UNIX_EPOCH + Duration::from_millis(1_500);
/// assert_eq!(format_time(t), "1970-01-01T00:00:01.500Z");
/// ```
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 time with any offset.
pub fn parse_time(text: &str) -> Result<SystemTime, BoxError> {
    Ok(DateTime::parse_from_rfc3339(text)?.into())
}

/// Format a duration.
///
/// ```
/// use std::time::Duration;
/// use oc_conv::text::format_duration;
///
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// assert_eq!(format_duration(Duration::from_millis(1_500)), "1.5s");
/// assert_eq!(format_duration(Duration::from_secs(3_723)), "1h2m3s");
/// assert_eq!(format_duration(Duration::from_micros(2)), "2µs");
/// ```
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    let mut out = String::new();
    if nanos == 0 {
        out.push_str("0s");
    } else if nanos < 1_000 {
        let _ = write!(out, "{nanos}ns");
    } else if nanos < 1_000_000 {
        write_fraction(&mut out, nanos, 1_000);
        out.push_str("µs");
    } else if nanos < 1_000_000_000 {
        write_fraction(&mut out, nanos, 1_000_000);
        out.push_str("ms");
    } else {
        let secs = d.as_secs();
        let (hours, minutes, seconds) = (secs / 3_600, secs / 60 % 60, secs % 60);
        if hours > 0 {
            let _ = write!(out, "{hours}h");
        }
        if hours > 0 || minutes > 0 {
            let _ = write!(out, "{minutes}m");
        }
        write_fraction(&mut out, u128::from(seconds) * 1_000_000_000 + u128::from(d.subsec_nanos()), 1_000_000_000);
        out.push('s');
    }
    out
}

// `value / unit` with the fraction trimmed of trailing zeros.
fn write_fraction(out: &mut String, value: u128, unit: u128) {
    let whole = value / unit;
    let mut frac = value % unit;
    let _ = write!(out, "{whole}");
    if frac == 0 {
        return;
    }
    let mut width = unit.ilog10() as usize;
    while frac % 10 == 0 {
        frac /= 10;
        width -= 1;
    }
    let _ = write!(out, ".{frac:0width$}");
}

/// Parse a duration such as `1h15m`, `2.5s` or `300ms`.
///
/// Units: `h`, `m`, `s`, `ms`, `us`/`µs`, `ns`. A bare `0` is accepted. Negative
/// durations are rejected.
///
/// ```
/// use std::time::Duration;
/// use oc_conv::text::parse_duration;
///
/// assert_eq!(parse_duration("1h2m3.5s").unwrap(), Duration::from_millis(3_723_500));
/// assert_eq!(parse_duration("1.5µs").unwrap(), Duration::from_nanos(1_500));
/// assert!(parse_duration("-1s").is_err());
/// assert!(parse_duration("5").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<Duration, BoxError> {
    let rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() || rest.starts_with('-') {
        return Err(format!("invalid duration `{text}`").into());
    }

    let mut total: u128 = 0;
    let mut rest = rest;
    while !rest.is_empty() {
        let int_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, tail) = rest.split_at(int_end);
        let (frac_part, tail) = match tail.strip_prefix('.') {
            Some(t) => {
                let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
                t.split_at(end)
            }
            None => ("", tail),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid duration `{text}`").into());
        }

        let unit_end = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(format!("missing unit in duration `{text}`").into()),
            _ => return Err(format!("unknown unit `{unit}` in duration `{text}`").into()),
        };

        let whole: u128 = if int_part.is_empty() { 0 } else { int_part.parse()? };
        let mut part = whole
            .checked_mul(scale)
            .ok_or_else(|| format!("duration `{text}` overflows"))?;
        let mut divisor = 1_u128;
        let mut frac_value = 0_u128;
        // Digits beyond nanosecond precision of the largest unit cannot matter.
        for digit in frac_part.bytes().take(24) {
            frac_value = frac_value * 10 + u128::from(digit - b'0');
            divisor *= 10;
        }
        part += frac_value * scale / divisor;

        total = total
            .checked_add(part)
            .ok_or_else(|| format!("duration `{text}` overflows"))?;
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| format!("duration `{text}` overflows"))?;
    let nanos = (total % 1_000_000_000) as u32;
    Ok(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::time::SystemTime;

    use super::{format_duration, format_time, parse_duration, parse_time};

    #[test]
    fn duration_text_round_trips() {
        for d in [
            Duration::ZERO,
            Duration::from_nanos(1),
            Duration::from_nanos(999_999_999),
            Duration::from_secs(59),
            Duration::from_secs(3_600),
            Duration::new(90_061, 5),
            Duration::from_millis(250),
        ] {
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d, "{d:?}");
        }
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
    }

    #[test]
    fn duration_rejects_garbage() {
        for bad in ["", "s", "1x", "1.s2", "-0s", ".s", "1h-2m"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1.s").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn time_offsets_normalize() {
        let a = parse_time("2024-05-01T12:00:00+02:00").unwrap();
        let b = parse_time("2024-05-01T10:00:00Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(format_time(a), "2024-05-01T10:00:00Z");
        assert!(parse_time("yesterday").is_err());
        let before_epoch = parse_time("1969-12-31T23:59:59Z").unwrap();
        assert!(before_epoch < SystemTime::UNIX_EPOCH);
        assert_eq!(format_time(before_epoch), "1969-12-31T23:59:59Z");
    }
}

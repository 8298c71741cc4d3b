//! Byte sizes and Go-style durations as they appear in config files.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// A byte count written as an integer or a size string.
///
/// Units are binary regardless of spelling: `"5MB"` and `"5MiB"` are both
/// 5 242 880 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeInBytes(pub u64);

impl SizeInBytes {
    /// Number of bytes.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Returns true for the zero size, which means "inherit" on buckets.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a size string such as `"50MiB"`, `"5MB"`, `"512k"` or `"1024"`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        if number.is_empty() {
            return Err(format!("invalid size: {input:?}"));
        }
        let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" | "kb" | "kib" => KIB,
            "m" | "mb" | "mib" => MIB,
            "g" | "gb" | "gib" => GIB,
            other => return Err(format!("invalid size unit: {other:?}")),
        };
        if let Ok(whole) = number.parse::<u64>() {
            return whole
                .checked_mul(multiplier)
                .map(Self)
                .ok_or_else(|| format!("size out of range: {input:?}"));
        }
        let fractional: f64 = number
            .parse()
            .map_err(|_| format!("invalid size: {input:?}"))?;
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss,
            reason = "fractional sizes are rounded down to whole bytes"
        )]
        let bytes = (fractional * multiplier as f64) as u64;
        Ok(Self(bytes))
    }
}

impl fmt::Display for SizeInBytes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes == 0 {
            return formatter.write_str("0");
        }
        for (unit, suffix) in [(GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")] {
            if bytes % unit == 0 {
                return write!(formatter, "{}{suffix}", bytes / unit);
            }
        }
        write!(formatter, "{bytes}")
    }
}

impl Serialize for SizeInBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 == 0 || self.0 % KIB != 0 {
            serializer.serialize_u64(self.0)
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for SizeInBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SizeVisitor;

        impl Visitor<'_> for SizeVisitor {
            type Value = SizeInBytes;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a byte count or a size string like \"50MiB\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(SizeInBytes(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .map(SizeInBytes)
                    .map_err(|_| E::custom("size must not be negative"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                SizeInBytes::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SizeVisitor)
    }
}

/// A duration written the Go way: `"1s"`, `"5m"`, `"1h30m"`, `"250ms"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoDuration(pub Duration);

impl GoDuration {
    /// Build from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Whole seconds, as sent to the control plane.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0.as_secs()
    }

    /// Parse a Go duration string.
    pub fn parse(input: &str) -> Result<Self, String> {
        let text = input.trim();
        if text == "0" {
            return Ok(Self::default());
        }
        if text.is_empty() {
            return Err("invalid duration: empty string".to_string());
        }
        let mut total_nanos: f64 = 0.0;
        let mut rest = text;
        while !rest.is_empty() {
            let number_len = rest
                .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
                .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
            let (number, tail) = rest.split_at(number_len);
            let value: f64 = number
                .parse()
                .map_err(|_| format!("invalid duration {input:?}"))?;
            let unit_len = tail
                .find(|ch: char| ch.is_ascii_digit() || ch == '.')
                .unwrap_or(tail.len());
            let (unit, next) = tail.split_at(unit_len);
            let scale = match unit {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60e9,
                "h" => 3600e9,
                _ => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
            };
            total_nanos += value * scale;
            rest = next;
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "durations are non-negative and well below u64::MAX nanoseconds"
        )]
        let nanos = total_nanos.round() as u64;
        Ok(Self(Duration::from_nanos(nanos)))
    }
}

impl fmt::Display for GoDuration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.0;
        if duration.is_zero() {
            return formatter.write_str("0s");
        }
        if duration < Duration::from_secs(1) {
            let nanos = duration.subsec_nanos();
            return if nanos % 1_000_000 == 0 {
                write!(formatter, "{}ms", nanos / 1_000_000)
            } else if nanos % 1_000 == 0 {
                write!(formatter, "{}µs", nanos / 1_000)
            } else {
                write!(formatter, "{nanos}ns")
            };
        }
        let secs = duration.as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if hours > 0 {
            write!(formatter, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(formatter, "{minutes}m")?;
        }
        let nanos = duration.subsec_nanos();
        if nanos == 0 {
            write!(formatter, "{seconds}s")
        } else {
            let fraction = format!("{nanos:09}");
            write!(formatter, "{seconds}.{}s", fraction.trim_end_matches('0'))
        }
    }
}

impl Serialize for GoDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GoDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn size_units_are_binary() {
        assert_eq!(SizeInBytes::parse("5MB"), Ok(SizeInBytes(5_242_880)));
        assert_eq!(SizeInBytes::parse("5MiB"), Ok(SizeInBytes(5_242_880)));
        assert_eq!(SizeInBytes::parse("50MiB"), Ok(SizeInBytes(52_428_800)));
        assert_eq!(SizeInBytes::parse("1kb"), Ok(SizeInBytes(1024)));
        assert_eq!(SizeInBytes::parse("1.5KiB"), Ok(SizeInBytes(1536)));
        assert_eq!(SizeInBytes::parse("123"), Ok(SizeInBytes(123)));
        assert!(SizeInBytes::parse("5TB").is_err());
        assert!(SizeInBytes::parse("MB").is_err());
    }

    #[test]
    fn size_renders_with_largest_even_unit() {
        assert_eq!(SizeInBytes(52_428_800).to_string(), "50MiB");
        assert_eq!(SizeInBytes(GIB).to_string(), "1GiB");
        assert_eq!(SizeInBytes(1536).to_string(), "1536");
        assert_eq!(SizeInBytes(1000).to_string(), "1000");
    }

    #[test]
    fn durations_parse_go_syntax() {
        assert_eq!(GoDuration::parse("1s"), Ok(GoDuration::from_secs(1)));
        assert_eq!(GoDuration::parse("5m"), Ok(GoDuration::from_secs(300)));
        assert_eq!(GoDuration::parse("1h30m"), Ok(GoDuration::from_secs(5400)));
        assert_eq!(GoDuration::parse("0"), Ok(GoDuration::default()));
        assert_eq!(
            GoDuration::parse("250ms"),
            Ok(GoDuration(Duration::from_millis(250)))
        );
        assert!(GoDuration::parse("5").is_err());
        assert!(GoDuration::parse("5d").is_err());
    }

    #[test]
    fn durations_render_like_go() {
        assert_eq!(GoDuration::from_secs(5).to_string(), "5s");
        assert_eq!(GoDuration::from_secs(60).to_string(), "1m0s");
        assert_eq!(GoDuration::from_secs(5400).to_string(), "1h30m0s");
        assert_eq!(GoDuration::default().to_string(), "0s");
    }

    proptest! {
        #[test]
        fn size_display_parses_back(bytes in 0u64..(1 << 40)) {
            let size = SizeInBytes(bytes);
            prop_assert_eq!(SizeInBytes::parse(&size.to_string()), Ok(size));
        }

        #[test]
        fn duration_display_parses_back(secs in 0u64..1_000_000) {
            let duration = GoDuration::from_secs(secs);
            prop_assert_eq!(GoDuration::parse(&duration.to_string()), Ok(duration));
        }
    }
}

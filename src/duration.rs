use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A configured duration such as `"90s"`, `"30m"`, `"1.5h"` or `"2d"`.
///
/// The last character picks the unit; anything other than `s`, `m`, `h` or `d`
/// counts as seconds. A number that cannot be read is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshDuration {
    value: String,
    seconds: u64,
}

impl RefreshDuration {
    pub fn parse(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            seconds: parse_seconds(value),
        }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Source text this duration was read from.
    pub fn value(&self) -> &str {
        &self.value
    }
}

fn parse_seconds(value: &str) -> u64 {
    let compact: String = value.chars().filter(|c| *c != ' ').collect();
    let Some(unit) = compact.chars().last() else {
        return 0;
    };
    let number: String = compact
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    let num = number.parse::<f64>().unwrap_or(0.0);
    let scaled = match unit {
        'd' => num * 86_400.0,
        'h' => num * 3_600.0,
        'm' => num * 60.0,
        _ => num,
    };
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

impl fmt::Display for RefreshDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for RefreshDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for RefreshDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units() {
        assert_eq!(RefreshDuration::parse("45").seconds(), 45);
        assert_eq!(RefreshDuration::parse("45s").seconds(), 45);
        assert_eq!(RefreshDuration::parse("30m").seconds(), 1_800);
        assert_eq!(RefreshDuration::parse("1h").seconds(), 3_600);
        assert_eq!(RefreshDuration::parse("2d").seconds(), 172_800);
    }

    #[test]
    fn spaces_and_fractions() {
        assert_eq!(RefreshDuration::parse(" 1 . 5 h ").seconds(), 5_400);
        assert_eq!(RefreshDuration::parse("2.9s").seconds(), 2);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(RefreshDuration::parse("").seconds(), 0);
        assert_eq!(RefreshDuration::parse("soon").seconds(), 0);
        assert_eq!(RefreshDuration::parse("-5m").seconds(), 0);
    }

    #[test]
    fn keeps_source_text() {
        let d = RefreshDuration::parse("1.5h");
        assert_eq!(d.to_string(), "1.5h");
        assert_eq!(d.value(), "1.5h");
        assert_eq!(d.seconds(), 5_400);
    }
}

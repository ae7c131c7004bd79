//! Stylised numbers: a literal `"3"` or an inclusive range `"[1:5]"`.

use rand::Rng;
use std::fmt;

/// A possibly randomised non-negative count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSpec {
    Fixed(u32),
    Range { min: u32, max: u32 },
}

impl AmountSpec {
    /// Strict parse; `None` for anything that is not `X` or `[X:Y]` with `X <= Y`.
    ///
    /// Negative values clamp to zero.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if let Some(inner) = spec.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let (min, max) = inner.split_once(':')?;
            let min = parse_count(min)?;
            let max = parse_count(max)?;
            if min > max {
                return None;
            }
            return Some(if min == max {
                Self::Fixed(min)
            } else {
                Self::Range { min, max }
            });
        }
        parse_count(spec).map(Self::Fixed)
    }

    /// Lenient parse used for item amounts: unparsable input is a fixed zero.
    pub fn parse_lenient(spec: &str) -> Self {
        Self::parse(spec).unwrap_or(Self::Fixed(0))
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            Self::Fixed(n) => n,
            Self::Range { min, max } => rng.random_range(min..=max),
        }
    }
}

impl Default for AmountSpec {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

impl fmt::Display for AmountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Range { min, max } => write!(f, "[{min}:{max}]"),
        }
    }
}

fn parse_count(s: &str) -> Option<u32> {
    let n: i64 = s.trim().parse().ok()?;
    Some(n.clamp(0, u32::MAX as i64) as u32)
}

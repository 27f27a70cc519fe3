//! Randomized per-target amounts and inter-transfer delays.
//!
//! Batch runs draw a fresh amount and delay for every target so transfers do
//! not form an obvious fixed-size, fixed-cadence pattern on chain. Both specs
//! accept either a fixed value (`"25"`) or a closed interval (`"10-20"`)
//! drawn uniformly, once per target.

use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

/// A malformed amount or interval expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecParseError {
    #[error("expected a number or MIN-MAX range, got {input:?}")]
    Malformed { input: String },

    #[error("range minimum {min} exceeds maximum {max}")]
    InvertedRange { min: String, max: String },

    #[error("value must be positive, got {value}")]
    NonPositive { value: String },
}

fn split_range(input: &str) -> Option<(&str, &str)> {
    let (lo, hi) = input.split_once('-')?;
    let (lo, hi) = (lo.trim(), hi.trim());
    if lo.is_empty() || hi.is_empty() {
        return None;
    }
    Some((lo, hi))
}

/// How much to withdraw per target: a fixed amount or a uniform range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSpec {
    Fixed(Decimal),
    Range { min: Decimal, max: Decimal },
}

impl AmountSpec {
    /// Draw the amount for one target.
    ///
    /// A fixed spec always yields its value; a range draws uniformly from
    /// `[min, max)`, except the degenerate `min == max` range which yields
    /// `min` exactly.
    pub fn draw(&self, rng: &mut impl Rng) -> Decimal {
        match self {
            Self::Fixed(value) => *value,
            Self::Range { min, max } if min == max => *min,
            Self::Range { min, max } => {
                let lo = min.to_f64().unwrap_or(0.0);
                let hi = max.to_f64().unwrap_or(lo);
                Decimal::from_f64(rng.gen_range(lo..hi)).unwrap_or(*min)
            }
        }
    }
}

impl FromStr for AmountSpec {
    type Err = SpecParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let parse = |raw: &str| -> Result<Decimal, SpecParseError> {
            let value = Decimal::from_str(raw).map_err(|_| SpecParseError::Malformed {
                input: input.to_string(),
            })?;
            if value <= Decimal::ZERO {
                return Err(SpecParseError::NonPositive {
                    value: raw.to_string(),
                });
            }
            Ok(value)
        };

        match split_range(input) {
            Some((lo, hi)) => {
                let (min, max) = (parse(lo)?, parse(hi)?);
                if min > max {
                    return Err(SpecParseError::InvertedRange {
                        min: lo.to_string(),
                        max: hi.to_string(),
                    });
                }
                Ok(Self::Range { min, max })
            }
            None => Ok(Self::Fixed(parse(input)?)),
        }
    }
}

/// How long to pause between targets, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalSpec {
    Fixed(f64),
    Range { min: f64, max: f64 },
}

impl IntervalSpec {
    /// Draw the delay to apply after one target.
    pub fn draw(&self, rng: &mut impl Rng) -> Duration {
        let seconds = match self {
            Self::Fixed(value) => *value,
            Self::Range { min, max } if min >= max => *min,
            Self::Range { min, max } => rng.gen_range(*min..*max),
        };
        Duration::from_secs_f64(seconds)
    }
}

impl FromStr for IntervalSpec {
    type Err = SpecParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let parse = |raw: &str| -> Result<f64, SpecParseError> {
            let value: f64 = raw.parse().map_err(|_| SpecParseError::Malformed {
                input: input.to_string(),
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(SpecParseError::NonPositive {
                    value: raw.to_string(),
                });
            }
            Ok(value)
        };

        match split_range(input) {
            Some((lo, hi)) => {
                let (min, max) = (parse(lo)?, parse(hi)?);
                if min > max {
                    return Err(SpecParseError::InvertedRange {
                        min: lo.to_string(),
                        max: hi.to_string(),
                    });
                }
                Ok(Self::Range { min, max })
            }
            None => Ok(Self::Fixed(parse(input)?)),
        }
    }
}

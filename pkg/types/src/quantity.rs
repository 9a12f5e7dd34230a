//! Unit-aware resource amounts.
//!
//! A [`Quantity`] is the amount half of a metric pair: CPU in cores
//! (`500m` = half a core), memory in bytes (`128Mi`), or any custom metric.
//! Values parse from and render to a canonical text form and order by
//! magnitude, so `1Gi` and `1073741824` compare equal.
//!
//! Internally a quantity is a signed milli-value (1 unit = 1000 milli).
//! Anything finer than milli precision is rejected at parse time rather
//! than silently rounded.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Parse failures for the canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityParseError {
    #[error("empty quantity")]
    Empty,
    #[error("quantity \"{0}\" has a malformed number")]
    Malformed(String),
    #[error("quantity \"{0}\" has an unknown suffix")]
    Suffix(String),
    #[error("quantity \"{0}\" is finer than milli precision")]
    TooPrecise(String),
    #[error("quantity \"{0}\" overflows")]
    Overflow(String),
}

/// How the quantity was spelled; controls rendering, never comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Format {
    /// Plain decimal, possibly milli-suffixed: `4`, `250m`.
    #[default]
    Decimal,
    /// Decimal SI suffixes: `1k`, `500M`.
    DecimalSi,
    /// Binary SI suffixes: `128Ki`, `1Gi`.
    BinarySi,
}

/// Largest-first so rendering picks the biggest suffix that divides evenly.
const BINARY_FACTORS: [(i128, &str); 6] = [
    (1 << 60, "Ei"),
    (1 << 50, "Pi"),
    (1 << 40, "Ti"),
    (1 << 30, "Gi"),
    (1 << 20, "Mi"),
    (1 << 10, "Ki"),
];

const DECIMAL_FACTORS: [(i128, &str); 6] = [
    (1_000_000_000_000_000_000, "E"),
    (1_000_000_000_000_000, "P"),
    (1_000_000_000_000, "T"),
    (1_000_000_000, "G"),
    (1_000_000, "M"),
    (1_000, "k"),
];

/// A unit-aware numeric amount with canonical text form and total ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantity {
    millis: i128,
    format: Format,
}

impl Quantity {
    /// Quantity of whole units (`from_units(2)` == `"2"`).
    pub fn from_units(units: i64) -> Self {
        Self {
            millis: units as i128 * 1000,
            format: Format::Decimal,
        }
    }

    /// Quantity of milli-units (`from_millis(500)` == `"500m"`).
    pub fn from_millis(millis: i64) -> Self {
        Self {
            millis: millis as i128,
            format: Format::Decimal,
        }
    }

    /// Parse the canonical text form. Same as the `FromStr` impl.
    pub fn parse(s: &str) -> Result<Self, QuantityParseError> {
        s.parse()
    }

    /// The magnitude in milli-units.
    pub fn millis(&self) -> i128 {
        self.millis
    }

    pub fn is_negative(&self) -> bool {
        self.millis < 0
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.millis.hash(state);
    }
}

impl FromStr for Quantity {
    type Err = QuantityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QuantityParseError::Empty);
        }
        let (sign, rest) = match s.as_bytes()[0] {
            b'-' => (-1i128, &s[1..]),
            b'+' => (1, &s[1..]),
            _ => (1, s),
        };

        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(num_end);

        // `millis_per_unit` is the milli-value of "1<suffix>".
        let (millis_per_unit, format) = match suffix {
            "" => (1000, Format::Decimal),
            "m" => (1, Format::Decimal),
            _ => {
                let factor = BINARY_FACTORS
                    .iter()
                    .map(|&(f, suf)| (f, suf, Format::BinarySi))
                    .chain(
                        DECIMAL_FACTORS
                            .iter()
                            .map(|&(f, suf)| (f, suf, Format::DecimalSi)),
                    )
                    .find(|&(_, suf, _)| suf == suffix);
                match factor {
                    Some((f, _, fmt)) => (f * 1000, fmt),
                    None => return Err(QuantityParseError::Suffix(s.to_string())),
                }
            }
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || frac_part.contains('.')
            || (number.contains('.') && frac_part.is_empty())
        {
            return Err(QuantityParseError::Malformed(s.to_string()));
        }

        // number = (int * 10^fd + frac) / 10^fd, fd = fraction digit count
        let int: i128 = int_part
            .parse()
            .map_err(|_| QuantityParseError::Overflow(s.to_string()))?;
        let frac: i128 = if frac_part.is_empty() {
            0
        } else {
            frac_part
                .parse()
                .map_err(|_| QuantityParseError::Overflow(s.to_string()))?
        };
        let frac_scale = 10i128
            .checked_pow(frac_part.len() as u32)
            .ok_or_else(|| QuantityParseError::Overflow(s.to_string()))?;

        let numerator = int
            .checked_mul(frac_scale)
            .and_then(|v| v.checked_add(frac))
            .and_then(|v| v.checked_mul(millis_per_unit))
            .ok_or_else(|| QuantityParseError::Overflow(s.to_string()))?;
        if numerator % frac_scale != 0 {
            return Err(QuantityParseError::TooPrecise(s.to_string()));
        }

        Ok(Self {
            millis: sign * (numerator / frac_scale),
            format,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis == 0 {
            return write!(f, "0");
        }
        if self.millis < 0 {
            write!(f, "-")?;
        }
        let abs = self.millis.unsigned_abs() as i128;

        if abs % 1000 == 0 {
            let units = abs / 1000;
            let factors: &[(i128, &str)] = match self.format {
                Format::BinarySi => &BINARY_FACTORS,
                Format::DecimalSi => &DECIMAL_FACTORS,
                Format::Decimal => &[],
            };
            for &(factor, suf) in factors {
                if units % factor == 0 {
                    return write!(f, "{}{}", units / factor, suf);
                }
            }
            return write!(f, "{units}");
        }
        write!(f, "{abs}m")
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a quantity string like \"500m\" or \"1Gi\", or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
                Ok(Quantity::from_units(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
                Ok(Quantity::from_units(v as i64))
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_milli() {
        assert_eq!(Quantity::parse("4").unwrap().millis(), 4000);
        assert_eq!(Quantity::parse("500m").unwrap().millis(), 500);
        assert_eq!(Quantity::parse("0.5").unwrap().millis(), 500);
        assert_eq!(Quantity::parse("-250m").unwrap().millis(), -250);
        assert_eq!(Quantity::parse("+2").unwrap().millis(), 2000);
    }

    #[test]
    fn parses_suffixes() {
        assert_eq!(Quantity::parse("1k").unwrap().millis(), 1_000_000);
        assert_eq!(Quantity::parse("1Ki").unwrap().millis(), 1024 * 1000);
        assert_eq!(
            Quantity::parse("1Gi").unwrap().millis(),
            1_073_741_824 * 1000
        );
        assert_eq!(
            Quantity::parse("1.5Gi").unwrap().millis(),
            1_610_612_736 * 1000
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Quantity::parse(""), Err(QuantityParseError::Empty));
        assert!(matches!(
            Quantity::parse("1.5x"),
            Err(QuantityParseError::Suffix(_))
        ));
        assert!(matches!(
            Quantity::parse("."),
            Err(QuantityParseError::Malformed(_))
        ));
        assert!(matches!(
            Quantity::parse("1."),
            Err(QuantityParseError::Malformed(_))
        ));
        assert!(matches!(
            Quantity::parse("m"),
            Err(QuantityParseError::Malformed(_))
        ));
        // 0.0001 units = 0.1 milli
        assert!(matches!(
            Quantity::parse("0.0001"),
            Err(QuantityParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn renders_canonically() {
        assert_eq!(Quantity::parse("500m").unwrap().to_string(), "500m");
        assert_eq!(Quantity::parse("0.5").unwrap().to_string(), "500m");
        assert_eq!(Quantity::parse("1000m").unwrap().to_string(), "1");
        assert_eq!(Quantity::parse("1Gi").unwrap().to_string(), "1Gi");
        assert_eq!(Quantity::parse("1024Ki").unwrap().to_string(), "1Mi");
        assert_eq!(Quantity::parse("500M").unwrap().to_string(), "500M");
        assert_eq!(Quantity::parse("-1.5Gi").unwrap().to_string(), "-1536Mi");
        assert_eq!(Quantity::from_millis(0).to_string(), "0");
    }

    #[test]
    fn orders_by_magnitude() {
        let half = Quantity::parse("500m").unwrap();
        let one = Quantity::parse("1").unwrap();
        let gi = Quantity::parse("1Gi").unwrap();
        assert!(half < one);
        assert!(one < gi);
        assert_eq!(Quantity::parse("1Gi").unwrap(), Quantity::parse("1073741824").unwrap());
    }

    #[test]
    fn serde_round_trip() {
        for text in ["500m", "1Gi", "128Mi", "4", "-2k"] {
            let q = Quantity::parse(text).unwrap();
            let json = serde_json::to_string(&q).unwrap();
            assert_eq!(json, format!("\"{text}\""));
            let back: Quantity = serde_json::from_str(&json).unwrap();
            assert_eq!(q, back);
        }
        // bare integers are accepted on input
        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q, Quantity::from_units(3));
    }
}

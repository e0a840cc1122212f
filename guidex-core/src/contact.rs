//! Emergency contact numbers
//!
//! Numbers are stored inline so the core stays allocation-free. Accepted
//! format: an optional leading `+` followed by 3 to 15 ASCII digits (the
//! E.164 maximum). Spaces, dashes and parentheses are stripped on parse.

use core::fmt;

use heapless::String;

use crate::errors::{DetectorError, DetectorResult};

/// Longest accepted number including the leading `+`
pub const MAX_PHONE_LEN: usize = 16;

const MIN_DIGITS: usize = 3;
const MAX_DIGITS: usize = 15;

/// Validated phone number
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber {
    digits: String<MAX_PHONE_LEN>,
}

impl PhoneNumber {
    /// Parse and normalise a number
    pub fn parse(raw: &str) -> DetectorResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DetectorError::InvalidContact { reason: "empty number" });
        }

        let mut digits: String<MAX_PHONE_LEN> = String::new();
        let mut count = 0usize;

        for (i, c) in raw.chars().enumerate() {
            match c {
                '+' if i == 0 => {
                    let _ = digits.push('+');
                }
                '0'..='9' => {
                    count += 1;
                    if count > MAX_DIGITS {
                        return Err(DetectorError::InvalidContact { reason: "too many digits" });
                    }
                    // Capacity covers '+' plus MAX_DIGITS
                    let _ = digits.push(c);
                }
                ' ' | '-' | '(' | ')' => {}
                _ => {
                    return Err(DetectorError::InvalidContact { reason: "unexpected character" });
                }
            }
        }

        if count < MIN_DIGITS {
            return Err(DetectorError::InvalidContact { reason: "too few digits" });
        }

        Ok(Self { digits })
    }

    /// Normalised form, e.g. `+919822115810`
    pub fn as_str(&self) -> &str {
        self.digits.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl core::str::FromStr for PhoneNumber {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PhoneNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PhoneVisitor;

        impl<'de> serde::de::Visitor<'de> for PhoneVisitor {
            type Value = PhoneNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a phone number string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                PhoneNumber::parse(v).map_err(|e| match e {
                    DetectorError::InvalidContact { reason } => E::custom(reason),
                    _ => E::custom("invalid phone number"),
                })
            }
        }

        deserializer.deserialize_str(PhoneVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_number_kept_verbatim() {
        let number = PhoneNumber::parse("+919822115810").unwrap();
        assert_eq!(number.as_str(), "+919822115810");
    }

    #[test]
    fn separators_are_stripped() {
        let number = PhoneNumber::parse(" +1 (555) 010-0199 ").unwrap();
        assert_eq!(number.as_str(), "+15550100199");
    }

    #[test]
    fn malformed_numbers_rejected() {
        assert!(PhoneNumber::parse("").is_err());
        assert!(PhoneNumber::parse("12").is_err());
        assert!(PhoneNumber::parse("91+98").is_err());
        assert!(PhoneNumber::parse("call me").is_err());
        assert!(PhoneNumber::parse("+1234567890123456").is_err());
    }

    #[test]
    fn short_service_numbers_accepted() {
        assert_eq!(PhoneNumber::parse("112").unwrap().as_str(), "112");
    }
}

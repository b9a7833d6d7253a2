//! Unsigned 64-bit integers carried as decimal strings.
//!
//! The log API emits u64 fields (`commit.index`, `confirm.mmr_size`, ...) as
//! strings because they do not fit a JavaScript number. Parsing goes through
//! the string form so no value is ever routed through an `f64`.

use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use crate::validation::ValidationError;

/// Parses a canonical decimal string (no sign, no leading zeros) into a u64.
pub fn parse_u64(value: &str) -> Result<u64, ValidationError> {
    let re = Regex::new(r"^(0|[1-9][0-9]*)$").expect("invalid regex");
    if !re.is_match(value) {
        return Err(ValidationError::PatternMismatch {
            field: "decimal",
            value: value.to_string(),
        });
    }
    value.parse::<u64>().map_err(|_| ValidationError::OutOfBounds {
        field: "decimal",
        value: value.to_string(),
    })
}

struct U64Visitor;

impl<'de> Visitor<'de> for U64Visitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned 64-bit integer or its decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative value {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_u64(v).map_err(E::custom)
    }
}

/// `#[serde(with = "merklelog_canonical::decimal::u64_string")]`
pub mod u64_string {
    use super::*;

    /// Serializes as a decimal string.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accepts a decimal string or a JSON integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(U64Visitor)
    }
}

/// Like [`u64_string`], but the empty string and `null` map to `None`.
pub mod optional_u64_string {
    use super::*;

    struct OptionalVisitor;

    impl<'de> Visitor<'de> for OptionalVisitor {
        type Value = Option<u64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an optional unsigned 64-bit integer")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            U64Visitor.visit_u64(v).map(Some)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            U64Visitor.visit_i64(v).map(Some)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                return Ok(None);
            }
            U64Visitor.visit_str(v).map(Some)
        }
    }

    /// Serializes `None` as the empty string.
    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    /// Accepts a decimal string, an integer, `""` or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        deserializer.deserialize_any(OptionalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Carrier {
        #[serde(with = "u64_string")]
        index: u64,
        #[serde(default, with = "optional_u64_string")]
        timestamp: Option<u64>,
    }

    #[test]
    fn max_u64_survives_the_string_form() {
        let c: Carrier =
            serde_json::from_str(r#"{"index":"18446744073709551615","timestamp":""}"#).unwrap();
        assert_eq!(c.index, u64::MAX);
        assert_eq!(c.timestamp, None);
        assert_eq!(
            serde_json::to_string(&c).unwrap(),
            r#"{"index":"18446744073709551615","timestamp":""}"#
        );
    }

    #[test]
    fn numbers_are_accepted() {
        let c: Carrier = serde_json::from_str(r#"{"index":499,"timestamp":1715113947353}"#).unwrap();
        assert_eq!(c.index, 499);
        assert_eq!(c.timestamp, Some(1715113947353));
    }

    #[test]
    fn non_canonical_strings_are_rejected() {
        assert!(parse_u64("007").is_err());
        assert!(parse_u64("-1").is_err());
        assert!(parse_u64("1.5").is_err());
        assert!(parse_u64("18446744073709551616").is_err());
        assert_eq!(parse_u64("0").unwrap(), 0);
    }
}

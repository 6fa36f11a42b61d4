use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical poll option identifier. Backends have been observed emitting
/// option ids both as JSON numbers and as numeric strings for the same poll;
/// normalization happens here at deserialization so equality checks
/// downstream compare a single representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(u64);

impl OptionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OptionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for OptionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| format!("Invalid option id: {}", s))
    }
}

impl Serialize for OptionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for OptionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptionIdVisitor;

        impl Visitor<'_> for OptionIdVisitor {
            type Value = OptionId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer or a numeric string")
            }

            fn visit_u64<E>(self, value: u64) -> Result<OptionId, E> {
                Ok(OptionId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<OptionId, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(OptionId)
                    .map_err(|_| E::custom(format!("negative option id: {}", value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<OptionId, E>
            where
                E: de::Error,
            {
                value
                    .trim()
                    .parse::<u64>()
                    .map(OptionId)
                    .map_err(|_| E::custom(format!("invalid option id: {}", value)))
            }
        }

        deserializer.deserialize_any(OptionIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_number() {
        let id: OptionId = serde_json::from_str("42").expect("number form");
        assert_eq!(id, OptionId::new(42));
    }

    #[test]
    fn deserializes_from_numeric_string() {
        let id: OptionId = serde_json::from_str("\"42\"").expect("string form");
        assert_eq!(id, OptionId::new(42));
    }

    #[test]
    fn string_and_number_forms_compare_equal() {
        let a: OptionId = serde_json::from_str("7").expect("number form");
        let b: OptionId = serde_json::from_str("\"7\"").expect("string form");
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_numeric_string() {
        let result: Result<OptionId, _> = serde_json::from_str("\"abc\"");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&OptionId::new(9)).expect("serialize");
        assert_eq!(json, "9");
    }
}

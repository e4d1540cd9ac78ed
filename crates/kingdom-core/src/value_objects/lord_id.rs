//! LordId - the game's stable external identifier for a player

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// External player identifier as printed in the in-game export
///
/// Exactly one `Player` exists per `LordId`. The value is assigned by the game
/// and survives renames and alliance moves, which is what makes it usable as
/// the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LordId(i64);

impl LordId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parse a lord id from a spreadsheet cell or path segment
    ///
    /// Accepts surrounding whitespace and a trailing `.0` (numeric cells
    /// exported from spreadsheets come back as floats).
    pub fn parse(s: &str) -> Result<Self, LordIdParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LordIdParseError::Empty);
        }
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        let value = digits
            .parse::<i64>()
            .map_err(|_| LordIdParseError::InvalidFormat(trimmed.to_string()))?;
        if value <= 0 {
            return Err(LordIdParseError::InvalidFormat(trimmed.to_string()));
        }
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LordIdParseError {
    #[error("lord id is empty")]
    Empty,

    #[error("invalid lord id: {0}")]
    InvalidFormat(String),
}

impl fmt::Display for LordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LordId {
    type Err = LordIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LordId::parse(s)
    }
}

impl From<LordId> for i64 {
    fn from(id: LordId) -> Self {
        id.0
    }
}

impl Serialize for LordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for LordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct LordIdVisitor;

        impl Visitor<'_> for LordIdVisitor {
            type Value = LordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a positive lord id as string or integer")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<LordId, E> {
                if value <= 0 {
                    return Err(de::Error::custom("lord id must be positive"));
                }
                Ok(LordId(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<LordId, E> {
                let value = i64::try_from(value).map_err(|_| de::Error::custom("lord id out of range"))?;
                self.visit_i64(value)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<LordId, E> {
                LordId::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(LordIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_float_cells() {
        assert_eq!(LordId::parse("12345678").unwrap(), LordId::new(12_345_678));
        assert_eq!(LordId::parse(" 12345678.0 ").unwrap(), LordId::new(12_345_678));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(LordId::parse("   "), Err(LordIdParseError::Empty));
        assert!(LordId::parse("abc").is_err());
        assert!(LordId::parse("-5").is_err());
        assert!(LordId::parse("0").is_err());
        assert!(LordId::parse("12.5").is_err());
    }

    #[test]
    fn test_json_roundtrip_accepts_numbers() {
        let id: LordId = serde_json::from_str("777").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"777\"");
    }
}

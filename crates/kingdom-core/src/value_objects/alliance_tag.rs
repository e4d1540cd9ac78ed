//! Alliance tag normalization

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, trimmed alliance tag
///
/// Surrounding whitespace is not part of the tag: `" ABC"` and `"ABC"` are
/// equal. Case is kept and compared exactly.
///
/// "No alliance" is represented as `Option::<AllianceTag>::None`; an empty
/// spreadsheet cell and a missing column both normalize to `None`, so a
/// transition between them is never reported as an alliance change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllianceTag(String);

impl AllianceTag {
    /// Normalize a raw value; blank input yields `None`
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AllianceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AllianceTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

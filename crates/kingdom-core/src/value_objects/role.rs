//! Caller roles carried in access tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated caller
///
/// Ordered by privilege: `Viewer < Editor < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Viewer,
    Editor,
    Admin,
}

impl UserRole {
    /// Whether the role may submit spreadsheet uploads
    #[inline]
    pub fn can_upload(self) -> bool {
        self >= Self::Editor
    }

    /// Whether the role may run repair sweeps and manual corrections
    #[inline]
    pub fn can_administer(self) -> bool {
        self == Self::Admin
    }

    /// Whether the role satisfies a required minimum
    #[inline]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

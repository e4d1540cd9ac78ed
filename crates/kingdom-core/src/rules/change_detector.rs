//! Name / alliance change detection

use crate::value_objects::AllianceTag;

/// Differences between the registry's known values and a new observation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedChanges {
    /// `(old, new)` if the name differs
    pub name: Option<(String, String)>,
    /// `(old, new)` if the alliance differs; `None` sides mean "no alliance"
    pub alliance: Option<(Option<AllianceTag>, Option<AllianceTag>)>,
}

impl ObservedChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.alliance.is_none()
    }
}

/// Compare the registry's last-known values against a fresh observation
///
/// Comparison is exact string equality once empty strings are treated as
/// absent. Joining or leaving an alliance (absent <-> present) is a change;
/// absent on both sides is not.
pub fn detect_changes(
    known_name: &str,
    known_alliance: Option<&AllianceTag>,
    observed_name: &str,
    observed_alliance: Option<&AllianceTag>,
) -> ObservedChanges {
    let name = if non_empty(known_name) == non_empty(observed_name) {
        None
    } else {
        Some((known_name.to_string(), observed_name.to_string()))
    };

    let alliance = if known_alliance == observed_alliance {
        None
    } else {
        Some((known_alliance.cloned(), observed_alliance.cloned()))
    };

    ObservedChanges { name, alliance }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

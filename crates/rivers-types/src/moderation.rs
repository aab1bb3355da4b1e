//! Moderation taxonomy and verdicts

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Policy categories the gateway acts on.
///
/// Labels follow the moderation backend's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModerationCategory {
    #[serde(rename = "sexual")]
    Sexual,
    #[serde(rename = "sexual/minors")]
    SexualMinors,
    #[serde(rename = "hate")]
    Hate,
    #[serde(rename = "harassment")]
    Harassment,
    #[serde(rename = "violence")]
    Violence,
    #[serde(rename = "self-harm")]
    SelfHarm,
}

impl ModerationCategory {
    pub const ALL: [ModerationCategory; 6] = [
        ModerationCategory::Sexual,
        ModerationCategory::SexualMinors,
        ModerationCategory::Hate,
        ModerationCategory::Harassment,
        ModerationCategory::Violence,
        ModerationCategory::SelfHarm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModerationCategory::Sexual => "sexual",
            ModerationCategory::SexualMinors => "sexual/minors",
            ModerationCategory::Hate => "hate",
            ModerationCategory::Harassment => "harassment",
            ModerationCategory::Violence => "violence",
            ModerationCategory::SelfHarm => "self-harm",
        }
    }

    /// Map a backend label onto the taxonomy. Labels outside it yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl std::fmt::Display for ModerationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of a single text payload. Computed per message, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeSet<ModerationCategory>,
}

impl ModerationVerdict {
    pub fn unflagged() -> Self {
        Self::default()
    }

    pub fn flagged(categories: impl IntoIterator<Item = ModerationCategory>) -> Self {
        Self {
            flagged: true,
            categories: categories.into_iter().collect(),
        }
    }

    /// True when any of `categories` was reported.
    pub fn has_any(&self, categories: &[ModerationCategory]) -> bool {
        categories.iter().any(|c| self.categories.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_lookup() {
        for category in ModerationCategory::ALL {
            assert_eq!(ModerationCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(ModerationCategory::from_label("violence/graphic"), None);
    }

    #[test]
    fn serde_uses_wire_labels() {
        let verdict = ModerationVerdict::flagged([ModerationCategory::SexualMinors]);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["categories"][0], "sexual/minors");
    }

    #[test]
    fn has_any_checks_membership() {
        let verdict =
            ModerationVerdict::flagged([ModerationCategory::Hate, ModerationCategory::Violence]);
        assert!(verdict.has_any(&[ModerationCategory::Violence, ModerationCategory::SelfHarm]));
        assert!(!verdict.has_any(&[ModerationCategory::Sexual]));
        assert!(!ModerationVerdict::unflagged().flagged);
    }
}

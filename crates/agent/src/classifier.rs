use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    Data,
    Support,
    MultiOpen,
    MultiCoord,
    MultiUpdate,
}

impl Intent {
    pub const ALL: [Intent; 5] =
        [Self::Data, Self::Support, Self::MultiOpen, Self::MultiCoord, Self::MultiUpdate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Support => "SUPPORT",
            Self::MultiOpen => "MULTI_OPEN",
            Self::MultiCoord => "MULTI_COORD",
            Self::MultiUpdate => "MULTI_UPDATE",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|intent| intent.as_str().eq_ignore_ascii_case(label))
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::MultiOpen | Self::MultiCoord | Self::MultiUpdate)
    }

    /// The label reported in the trace; the three multi-intents share one.
    pub fn trace_label(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Support => "SUPPORT",
            _ => "MULTI",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword rule: every group must match, and a group matches when the
/// lower-cased text contains any of its phrases.
#[derive(Clone, Copy, Debug)]
pub struct ClassificationRule {
    pub intent: Intent,
    pub all_of: &'static [&'static [&'static str]],
}

impl ClassificationRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.all_of.iter().all(|any_of| any_of.iter().any(|phrase| lowered.contains(phrase)))
    }
}

/// Evaluated top to bottom; the first matching rule wins.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        intent: Intent::MultiOpen,
        all_of: &[&["active customers"], &["open ticket", "open tickets"]],
    },
    ClassificationRule {
        intent: Intent::MultiUpdate,
        all_of: &[&["update my email"], &["ticket history"]],
    },
    ClassificationRule { intent: Intent::MultiCoord, all_of: &[&["upgrade", "upgrading my account"]] },
    ClassificationRule {
        intent: Intent::Support,
        all_of: &[&["charged twice", "refund", "cancel", "billing"]],
    },
    ClassificationRule {
        intent: Intent::Data,
        all_of: &[&["get customer information", "get customer info", "customer id"]],
    },
];

pub const DEFAULT_INTENT: Intent = Intent::Data;

pub fn classify(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.intent)
        .unwrap_or(DEFAULT_INTENT)
}

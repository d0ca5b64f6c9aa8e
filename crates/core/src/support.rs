//! Deterministic reply drafting for the support agent.
//!
//! The drafter never looks anything up; callers that want ticket history as
//! context attach it themselves.

use serde::{Deserialize, Serialize};

pub const SUGGESTION_TEXT: &str = "I understand your issue. \
For billing/refund, we can initiate a refund and confirm the payment record. \
If shipping, we open a tracking case; for general issues, we provide step-by-step guidance.";

pub const FALLBACK_REPLY: &str =
    "Thanks for contacting support. We'll investigate and follow up shortly.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportTopic {
    Billing,
    Shipping,
    General,
}

impl SupportTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for SupportTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportDraft {
    pub suggestion: String,
    pub topic: SupportTopic,
}

impl SupportDraft {
    /// Reply text for `simple_support_reply`; an empty suggestion falls back
    /// to the generic acknowledgement.
    pub fn reply_text(&self) -> &str {
        if self.suggestion.is_empty() {
            FALLBACK_REPLY
        } else {
            &self.suggestion
        }
    }
}

pub fn guess_topic(text: &str) -> SupportTopic {
    let normalized = text.to_ascii_lowercase();
    if ["refund", "charge", "billing"].iter().any(|keyword| normalized.contains(keyword)) {
        return SupportTopic::Billing;
    }
    if ["delay", "delivery", "shipping"].iter().any(|keyword| normalized.contains(keyword)) {
        return SupportTopic::Shipping;
    }
    SupportTopic::General
}

pub fn draft(text: &str) -> SupportDraft {
    SupportDraft { suggestion: SUGGESTION_TEXT.to_string(), topic: guess_topic(text) }
}

#[cfg(test)]
mod tests {
    use super::{draft, guess_topic, SupportDraft, SupportTopic, FALLBACK_REPLY};

    #[test]
    fn billing_keywords_win_over_shipping_keywords() {
        assert_eq!(guess_topic("Refund my delayed delivery"), SupportTopic::Billing);
        assert_eq!(guess_topic("My delivery is late"), SupportTopic::Shipping);
        assert_eq!(guess_topic("How do I reset my password?"), SupportTopic::General);
        assert_eq!(guess_topic(""), SupportTopic::General);
    }

    #[test]
    fn draft_is_stable_for_identical_input() {
        let first = draft("I've been charged twice");
        let second = draft("I've been charged twice");

        assert_eq!(first, second);
        assert!(first.reply_text().starts_with("I understand your issue."));
        assert_eq!(first.topic.as_str(), "billing");
    }

    #[test]
    fn empty_suggestion_uses_fallback_reply() {
        let empty = SupportDraft { suggestion: String::new(), topic: SupportTopic::General };
        assert_eq!(empty.reply_text(), FALLBACK_REPLY);
    }
}

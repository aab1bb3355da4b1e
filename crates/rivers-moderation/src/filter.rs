//! Classification and canned-reply routing

use crate::backend::ModerationBackend;
use rivers_types::{ModerationCategory, ModerationVerdict};
use std::sync::Arc;
use tracing::warn;

/// Fixed redirect sent instead of a model reply for a flagged turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedReply {
    /// Sexual content.
    Playful,
    /// Hate or harassment.
    Positivity,
    /// Violence or self-harm.
    Supportive,
}

impl CannedReply {
    pub fn message(&self) -> &'static str {
        match self {
            CannedReply::Playful => {
                "Whoa there, tiger! 😏 Let's keep things fun and PG-13, okay? What else is on your mind?"
            }
            CannedReply::Positivity => {
                "Hey now, let's keep the vibes positive! 💕 I'm all about good energy. What fun stuff can we chat about instead?"
            }
            CannedReply::Supportive => {
                "Hey, that sounds heavy. 💙 I care about you! If you're going through something, please reach out to someone who can really help. I'm here for fun chats, but for the serious stuff, please talk to a professional. You matter! 💕"
            }
        }
    }
}

/// Category groups in precedence order.
const ROUTES: [(&[ModerationCategory], CannedReply); 3] = [
    (
        &[ModerationCategory::Sexual, ModerationCategory::SexualMinors],
        CannedReply::Playful,
    ),
    (
        &[ModerationCategory::Hate, ModerationCategory::Harassment],
        CannedReply::Positivity,
    ),
    (
        &[ModerationCategory::Violence, ModerationCategory::SelfHarm],
        CannedReply::Supportive,
    ),
];

/// Redirect for a verdict, or `None` to let the turn proceed.
pub fn route_on_flag(verdict: &ModerationVerdict) -> Option<CannedReply> {
    if !verdict.flagged {
        return None;
    }

    ROUTES
        .iter()
        .find(|(group, _)| verdict.has_any(group))
        .map(|(_, reply)| *reply)
}

/// Pre-check applied to the latest user turn.
#[derive(Clone)]
pub struct ModerationFilter {
    backend: Arc<dyn ModerationBackend>,
}

impl ModerationFilter {
    pub fn new(backend: Arc<dyn ModerationBackend>) -> Self {
        Self { backend }
    }

    /// Classify `text`.
    ///
    /// A backend failure yields an unflagged verdict: an unreachable
    /// moderation service forfeits protection for this turn but never
    /// blocks the conversation.
    pub async fn classify(&self, text: &str) -> ModerationVerdict {
        match self.backend.moderate(text).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(kind = %err.kind, error = %err, "moderation unavailable, turn passes unchecked");
                ModerationVerdict::unflagged()
            }
        }
    }
}

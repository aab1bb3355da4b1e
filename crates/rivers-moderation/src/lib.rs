//! Moderation filter for inbound chat turns.
//!
//! [`ModerationFilter::classify`] asks a [`ModerationBackend`] about a single
//! message and degrades to an unflagged verdict when the backend is
//! unavailable. [`route_on_flag`] turns a flagged verdict into one of the
//! fixed [`CannedReply`] redirects.

#![deny(unsafe_code)]

mod backend;
mod filter;
mod openai;

pub use backend::ModerationBackend;
pub use filter::{route_on_flag, CannedReply, ModerationFilter};
pub use openai::{OpenAiModeration, DEFAULT_MODERATION_BASE_URL};

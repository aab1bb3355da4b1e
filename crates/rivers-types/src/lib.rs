//! Shared data model for the Rivers chat gateway.
//!
//! These types cross crate boundaries: conversation turns and replies flow
//! between the HTTP layer and the pipeline, moderation verdicts flow between
//! the filter and the pipeline, and [`BackendError`] is the single failure
//! shape of every outbound provider call.

#![deny(unsafe_code)]

mod backend;
mod conversation;
mod moderation;

pub use backend::*;
pub use conversation::*;
pub use moderation::*;

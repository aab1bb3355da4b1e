//! API request handlers

mod chat;
mod checkout;
mod health;
mod session;

pub use chat::*;
pub use checkout::*;
pub use health::*;
pub use session::*;

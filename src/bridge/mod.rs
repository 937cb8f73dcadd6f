//! Bridge module
//!
//! The workflow between the catalog, the library and the chat channel:
//! reconciliation passes, offer fan-out, confirmation handling and chat commands.

mod commands;
mod manager;

pub use commands::{BotCommand, GETMOVIE_USAGE};
pub use manager::{Bridge, ConfirmationOutcome, PassReport, PING_REPLY};

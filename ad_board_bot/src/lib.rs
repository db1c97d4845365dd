//! Source code for the Ad Board tracker bot: watches one chat's topics for
//! advertisement posts and feeds them to the board's backend.

/// Static configuration loaded at startup.
mod config;

/// Various types used throughout.
mod types;

/// The opt-out set.
mod optout;

/// Admission filtering and invite extraction.
mod normalizer;

/// Client for the ingestion backend.
mod backend;

/// Functions that handle events from Telegram.
mod handlers;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;

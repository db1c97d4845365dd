//! Backend for the Ad Board: accepts ad records from the tracker bot,
//! dedups and stores them, and serves the board to the dashboard.

/// Static configuration loaded at startup.
mod config;

/// The database.
mod database;

/// The API error taxonomy.
mod error;

/// HTTP routes.
mod routes;

/// Entry function that starts the server.
mod entry;
pub use entry::*;

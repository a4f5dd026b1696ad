//! Core module - server configuration, state and lifecycle
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared service singletons
//! - [`Server`] - HTTP server
//! - [`tasks`] - background task registry

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::{Config, setup_environment};
pub use server::Server;
pub use state::ServerState;

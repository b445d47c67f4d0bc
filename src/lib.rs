//! Attendify - attendance and student management console
//!
//! Library interface for the Attendify console: the session store, the
//! access gate, the session-aware API client and one typed operation per
//! backend action.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use api::ApiClient;
pub use auth::{AccessGate, SessionStore};
pub use config::Config;
pub use error::{Error, Result};

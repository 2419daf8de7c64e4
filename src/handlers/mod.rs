//! Command Handlers module
//!
//! Handlers orchestrate a business operation across the directory store, the
//! credential hasher and the notifiers.

mod commands;
mod signup_handler;

pub use commands::*;
pub use signup_handler::{NotificationStatus, SignupHandler, SignupOutcome, SignupSettings};

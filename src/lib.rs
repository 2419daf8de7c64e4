//! SynapseLab Checkout Library
//!
//! Re-exports modules for integration testing and for the binary.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod notify;
pub mod store;

pub use config::{Config, NotifyMode};
pub use error::{AppError, AppResult, ErrorResponse};
pub use domain::{OperationContext, SignupError};
pub use handlers::{SignupCommand, SignupHandler, SignupSettings};

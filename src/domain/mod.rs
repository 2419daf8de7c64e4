//! Domain module
//!
//! Signup domain types, errors and the pure helpers the checkout flow relies on.

pub mod context;
pub mod error;
pub mod models;
pub mod password;
pub mod phone;

pub use context::OperationContext;
pub use error::SignupError;
pub use models::{CreatedSignup, NewAdministrator, NewOrganization, Role, SubscriptionStatus};
pub use password::{BcryptHasher, HashError, PasswordHasher};
pub use phone::normalize_phone;

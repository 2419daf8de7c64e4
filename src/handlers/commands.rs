//! Command definitions
//!
//! Commands represent intentions to change the system state.

use crate::domain::{NewAdministrator, NewOrganization, SignupError, SubscriptionStatus};
use crate::notify::WelcomeMessage;

/// Minimum number of characters in a signup password
pub const MIN_PASSWORD_CHARS: usize = 6;

pub const PASSWORD_TOO_SHORT: &str = "A senha deve ter pelo menos 6 caracteres.";

/// bcrypt ignores everything past this many bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const PASSWORD_TOO_LONG: &str = "A senha deve ter no máximo 72 bytes.";

// =========================================================================
// SignupCommand
// =========================================================================

/// Command to register an organization and its administrator
#[derive(Clone)]
pub struct SignupCommand {
    pub name: String,
    pub email: String,
    pub tax_id: String,
    pub phone: String,
    pub company: String,
    pub password: String,
    pub plan: String,
    pub payment_method: String,
}

impl SignupCommand {
    /// Check the password policy
    pub fn validate(&self) -> Result<(), SignupError> {
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SignupError::validation("senha", PASSWORD_TOO_SHORT));
        }
        if self.password.len() > MAX_PASSWORD_BYTES {
            return Err(SignupError::validation("senha", PASSWORD_TOO_LONG));
        }
        Ok(())
    }

    pub fn organization(&self) -> NewOrganization {
        NewOrganization {
            name: self.company.clone(),
            plan: self.plan.clone(),
            payment_method: self.payment_method.clone(),
            status: SubscriptionStatus::Active,
        }
    }

    pub fn administrator(&self, password_hash: String) -> NewAdministrator {
        NewAdministrator {
            username: self.name.clone(),
            email: self.email.clone(),
            password_hash,
            tax_id: self.tax_id.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn welcome_message(&self) -> WelcomeMessage {
        WelcomeMessage {
            recipient_name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            organization: self.company.clone(),
        }
    }
}

impl std::fmt::Debug for SignupCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupCommand")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("company", &self.company)
            .field("plan", &self.plan)
            .field("payment_method", &self.payment_method)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(password: &str) -> SignupCommand {
        SignupCommand {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            tax_id: "123".to_string(),
            phone: "11999999999".to_string(),
            company: "Lab1".to_string(),
            password: password.to_string(),
            plan: "pro".to_string(),
            payment_method: "card".to_string(),
        }
    }

    #[test]
    fn test_password_policy() {
        assert!(command("secret1").validate().is_ok());
        assert!(command("123456").validate().is_ok());

        let err = command("abc").validate().unwrap_err();
        assert!(matches!(err, SignupError::ValidationFailed { field: "senha", .. }));
        assert_eq!(err.to_string(), PASSWORD_TOO_SHORT);
    }

    #[test]
    fn test_password_length_counts_characters() {
        // 6 characters, 12 bytes
        assert!(command("çãõéíú").validate().is_ok());
        assert!(command("çãõéí").validate().is_err());
    }

    #[test]
    fn test_password_over_bcrypt_limit_is_rejected() {
        assert!(command(&"a".repeat(72)).validate().is_ok());

        let err = command(&"a".repeat(73)).validate().unwrap_err();
        assert!(matches!(err, SignupError::ValidationFailed { field: "senha", .. }));
        assert_eq!(err.to_string(), PASSWORD_TOO_LONG);

        // 37 characters, 74 bytes
        assert!(command(&"ç".repeat(37)).validate().is_err());
    }

    #[test]
    fn test_records_from_command() {
        let cmd = command("secret1");

        let org = cmd.organization();
        assert_eq!(org.name, "Lab1");
        assert_eq!(org.status, SubscriptionStatus::Active);

        let admin = cmd.administrator("hash".to_string());
        assert_eq!(admin.username, "Ana");
        assert_eq!(admin.password_hash, "hash");
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", command("secret1"));
        assert!(!rendered.contains("secret1"));
        assert!(rendered.contains("[REDACTED]"));
    }
}

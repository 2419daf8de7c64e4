//! Operation Context
//!
//! Contains metadata about the current request for tracing.

use uuid::Uuid;

/// Context for an operation, used for log correlation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Correlation ID for request tracing (mirrors `x-request-id`)
    pub correlation_id: Option<Uuid>,

    /// Client user agent, when sent
    pub user_agent: Option<String>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            correlation_id: None,
            user_agent: None,
        }
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

use thiserror::Error;

/// Core error type for the courier framework
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Unsupported component lifetime: {lifetime}")]
    UnsupportedLifetime { lifetime: String },

    #[error("Invalid service scope: {scope}")]
    InvalidServiceScope { scope: String },

    #[error("Operation '{operation}' requires the root container")]
    InvalidScopeOperation { operation: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Invalid service descriptor: {message}")]
    InvalidServiceDescriptor { message: String },
}

impl CoreError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new service not found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Create a new invalid scope operation error
    pub fn invalid_scope_operation(operation: impl Into<String>) -> Self {
        Self::InvalidScopeOperation {
            operation: operation.into(),
        }
    }

    /// Create a new lock error
    pub fn lock(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the error is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }

    /// Check if the error indicates a misuse of the scope hierarchy
    pub fn is_scope_violation(&self) -> bool {
        matches!(self, Self::InvalidScopeOperation { .. })
    }
}

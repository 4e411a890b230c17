/// Service scope enumeration, the engine-level lifetime tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceScope {
    /// Single instance shared across the application
    Singleton,
    /// New instance created for each resolution
    Transient,
    /// Instance scoped to a particular context (e.g., one unit of work)
    Scoped,
}

impl ServiceScope {
    /// Check if the scope is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, ServiceScope::Singleton)
    }

    /// Check if the scope is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceScope::Transient)
    }

    /// Check if the scope is scoped
    pub fn is_scoped(&self) -> bool {
        matches!(self, ServiceScope::Scoped)
    }

    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceScope::Singleton => "singleton",
            ServiceScope::Transient => "transient",
            ServiceScope::Scoped => "scoped",
        }
    }
}

impl std::fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceScope {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(ServiceScope::Singleton),
            "transient" => Ok(ServiceScope::Transient),
            "scoped" => Ok(ServiceScope::Scoped),
            _ => Err(crate::errors::CoreError::InvalidServiceScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// Identifier of a resolution scope created by the engine.
///
/// A child container holds exactly one of these; the root holds none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(uuid::Uuid);

impl ScopeId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

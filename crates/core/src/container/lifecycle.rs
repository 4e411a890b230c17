use serde::{Deserialize, Serialize};

use crate::container::scope::ServiceScope;
use crate::errors::CoreError;

/// Framework-level lifetime policy for a registered component.
///
/// Each policy translates 1:1 into the engine's [`ServiceScope`] tag; no
/// other mapping is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentLifetime {
    /// A fresh instance for every resolution call
    PerCall,
    /// One instance per unit of work (child container)
    PerUnitOfWork,
    /// One instance shared across the application
    Singleton,
}

impl ComponentLifetime {
    /// Translate the policy into the engine's lifetime tag
    pub fn service_scope(self) -> ServiceScope {
        match self {
            ComponentLifetime::PerCall => ServiceScope::Transient,
            ComponentLifetime::PerUnitOfWork => ServiceScope::Scoped,
            ComponentLifetime::Singleton => ServiceScope::Singleton,
        }
    }

    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentLifetime::PerCall => "per-call",
            ComponentLifetime::PerUnitOfWork => "per-unit-of-work",
            ComponentLifetime::Singleton => "singleton",
        }
    }
}

impl From<ComponentLifetime> for ServiceScope {
    fn from(lifetime: ComponentLifetime) -> Self {
        lifetime.service_scope()
    }
}

impl std::fmt::Display for ComponentLifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComponentLifetime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-call" => Ok(ComponentLifetime::PerCall),
            "per-unit-of-work" => Ok(ComponentLifetime::PerUnitOfWork),
            "singleton" => Ok(ComponentLifetime::Singleton),
            _ => Err(CoreError::UnsupportedLifetime {
                lifetime: s.to_string(),
            }),
        }
    }
}

pub mod container;
pub mod errors;
pub mod foundation;

// Re-export key types for convenience
pub use container::{
    Component, ComponentLifetime, ComponentRegistry, ContainerRole, ContractSet, Ownership,
    ResolverEngine, ScopeId, ServiceContainer, ServiceId, ServiceScope, ServiceStatistics,
};
pub use errors::CoreError;
pub use foundation::{Disposable, FrameworkComponent};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework information
pub const FRAMEWORK_NAME: &str = "courier";

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}

/// Get framework name
pub fn name() -> &'static str {
    FRAMEWORK_NAME
}

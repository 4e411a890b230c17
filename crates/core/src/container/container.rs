use std::sync::Arc;

use crate::container::contracts::Component;
use crate::container::descriptor::ServiceId;
use crate::container::engine::{ResolverEngine, ServiceStatistics};
use crate::container::lifecycle::ComponentLifetime;
use crate::container::registry::ComponentRegistry;
use crate::container::scope::ScopeId;
use crate::errors::CoreError;

/// Whether a container may tear down a resource it references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The container created the resource and disposes it
    Owns,
    /// The resource was handed in; disposal leaves it untouched
    Borrows,
}

/// Position of a container within the scope hierarchy.
///
/// Only a root carries the registration facade; only a child carries a scope
/// handle. Any container spawned from a child is itself a child; there is no
/// nesting depth and no parent back-reference.
#[derive(Debug)]
pub enum ContainerRole {
    /// The top-level container, the only one permitted to mutate bindings
    Root {
        registry: ComponentRegistry,
        registry_ownership: Ownership,
    },
    /// A per-unit-of-work container bound to one engine scope
    Child { scope: ScopeId },
}

/// Lifecycle-aware object resolution container.
///
/// The root container is configured once at startup and owns the underlying
/// engine; per unit of work it spawns child containers, each bound to its own
/// resolution scope. Children resolve but never configure, and disposing a
/// child releases only that scope, never the shared engine.
///
/// Disposal runs on drop, so a child held for the duration of a unit of work
/// releases its scoped instances on every exit path.
pub struct ServiceContainer {
    engine: Arc<ResolverEngine>,
    engine_ownership: Ownership,
    role: ContainerRole,
    disposed: bool,
}

impl ServiceContainer {
    /// Create a root container owning a fresh engine
    pub fn new() -> Self {
        let engine = Arc::new(ResolverEngine::new());
        let registry = ComponentRegistry::new(Arc::clone(&engine));
        Self {
            engine,
            engine_ownership: Ownership::Owns,
            role: ContainerRole::Root {
                registry,
                registry_ownership: Ownership::Owns,
            },
            disposed: false,
        }
    }

    /// Create a root container over an externally owned engine.
    ///
    /// Disposing this container leaves the engine and its bindings intact.
    pub fn with_engine(engine: Arc<ResolverEngine>) -> Self {
        let registry = ComponentRegistry::new(Arc::clone(&engine));
        Self {
            engine,
            engine_ownership: Ownership::Borrows,
            role: ContainerRole::Root {
                registry,
                registry_ownership: Ownership::Borrows,
            },
            disposed: false,
        }
    }

    /// Register a component under its full contract set.
    ///
    /// Root-only: a child container fails with
    /// [`CoreError::InvalidScopeOperation`].
    pub fn configure<T>(&mut self, lifetime: ComponentLifetime) -> Result<(), CoreError>
    where
        T: Component + Default,
    {
        self.registry("configure")?.configure::<T>(lifetime)
    }

    /// Register a component built by `factory` under its full contract set.
    ///
    /// Root-only, with the same policy as [`ServiceContainer::configure`].
    pub fn configure_with<T, F>(
        &mut self,
        lifetime: ComponentLifetime,
        factory: F,
    ) -> Result<(), CoreError>
    where
        T: Component,
        F: Fn() -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.registry("configure_with")?
            .configure_with::<T, F>(lifetime, factory)
    }

    /// Replace whatever is bound for contract `C` with a fixed instance.
    ///
    /// Root-only; the one registration allowed to overwrite a prior binding.
    pub fn register_singleton<C>(&mut self, instance: Arc<C>) -> Result<(), CoreError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.registry("register_singleton")?
            .register_singleton(instance)
    }

    /// Spawn a child container serving one unit of work.
    ///
    /// Always permitted, including from another child; the result borrows the
    /// engine and holds a freshly created scope.
    pub fn build_child_container(&self) -> Result<ServiceContainer, CoreError> {
        let scope = self.engine.create_scope()?;
        tracing::debug!(scope = %scope, "child container created");
        Ok(ServiceContainer {
            engine: Arc::clone(&self.engine),
            engine_ownership: Ownership::Borrows,
            role: ContainerRole::Child { scope },
            disposed: false,
        })
    }

    /// Resolve one instance for `T`.
    ///
    /// Resolution goes through this container's scope when it has one, else
    /// through the root engine. `Ok(None)` when nothing is bound; a miss is
    /// not an error.
    pub fn build<T>(&self) -> Result<Option<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let Some(resolved) = self
            .engine
            .get_instance(&ServiceId::of::<T>(), self.scope())?
        else {
            return Ok(None);
        };
        let instance = resolved
            .downcast::<Arc<T>>()
            .map_err(|_| CoreError::service_not_found(std::any::type_name::<T>()))?;
        Ok(Some(*instance))
    }

    /// Resolve every binding satisfying `T`, in binding order.
    ///
    /// Empty when nothing is bound.
    pub fn build_all<T>(&self) -> Result<Vec<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let resolved = self
            .engine
            .get_instances(&ServiceId::of::<T>(), self.scope())?;
        let mut instances = Vec::with_capacity(resolved.len());
        for handle in resolved {
            let instance = handle
                .downcast::<Arc<T>>()
                .map_err(|_| CoreError::service_not_found(std::any::type_name::<T>()))?;
            instances.push(*instance);
        }
        Ok(instances)
    }

    /// Check if some binding's contract equals `T`
    pub fn has_component<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.engine.has_binding(&ServiceId::of::<T>())
    }

    /// Release an instance obtained from this container.
    ///
    /// A no-op: instance teardown is lifetime-driven, handled by the engine
    /// and scope disposal rather than by explicit release calls.
    pub fn release<T: ?Sized>(&self, _instance: &Arc<T>) {}

    /// Check if this container is a child scope
    pub fn is_child(&self) -> bool {
        matches!(self.role, ContainerRole::Child { .. })
    }

    /// Check if this container has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Get the underlying engine
    pub fn engine(&self) -> &Arc<ResolverEngine> {
        &self.engine
    }

    /// Snapshot registration and cache state for diagnostics
    pub fn statistics(&self) -> ServiceStatistics {
        self.engine.statistics()
    }

    /// Tear down this container according to its role and ownership.
    ///
    /// A child releases only its own scope. A root tears down the engine's
    /// instances and the registration store, each only when owned. Safe to
    /// call any number of times; also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        match &self.role {
            ContainerRole::Child { scope } => {
                if let Err(error) = self.engine.dispose_scope(scope) {
                    tracing::warn!(scope = %scope, %error, "failed to release child scope");
                }
            }
            ContainerRole::Root {
                registry,
                registry_ownership,
            } => {
                if self.engine_ownership == Ownership::Owns {
                    if let Err(error) = self.engine.dispose() {
                        tracing::warn!(%error, "failed to tear down engine instances");
                    }
                }
                if *registry_ownership == Ownership::Owns {
                    if let Err(error) = registry.clear() {
                        tracing::warn!(%error, "failed to clear registration bindings");
                    }
                }
            }
        }
    }

    fn registry(&self, operation: &str) -> Result<&ComponentRegistry, CoreError> {
        match &self.role {
            ContainerRole::Root { registry, .. } => Ok(registry),
            ContainerRole::Child { .. } => Err(CoreError::invalid_scope_operation(operation)),
        }
    }

    fn scope(&self) -> Option<&ScopeId> {
        match &self.role {
            ContainerRole::Root { .. } => None,
            ContainerRole::Child { scope } => Some(scope),
        }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ServiceContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("role", &self.role)
            .field("engine_ownership", &self.engine_ownership)
            .field("bindings", &self.engine.binding_count())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::contracts::ContractSet;

    trait Handler: Send + Sync {
        fn handle(&self) -> &'static str;
    }

    #[derive(Default)]
    struct AuditHandler;

    impl Handler for AuditHandler {
        fn handle(&self) -> &'static str {
            "audited"
        }
    }

    impl Component for AuditHandler {
        fn contracts(set: &mut ContractSet<Self>) {
            set.provide::<dyn Handler>(|handler| handler);
        }
    }

    #[test]
    fn test_root_configures_and_resolves() {
        let mut container = ServiceContainer::new();
        container
            .configure::<AuditHandler>(ComponentLifetime::PerCall)
            .unwrap();

        assert!(!container.is_child());
        assert!(container.has_component::<dyn Handler>());
        assert!(container.has_component::<AuditHandler>());

        let handler = container.build::<dyn Handler>().unwrap().unwrap();
        assert_eq!(handler.handle(), "audited");
    }

    #[test]
    fn test_resolution_miss_returns_none() {
        let container = ServiceContainer::new();

        assert!(container.build::<dyn Handler>().unwrap().is_none());
        assert!(container.build_all::<dyn Handler>().unwrap().is_empty());
        assert!(!container.has_component::<dyn Handler>());
    }

    #[test]
    fn test_child_cannot_configure() {
        let container = ServiceContainer::new();
        let mut child = container.build_child_container().unwrap();

        assert!(child.is_child());
        let error = child
            .configure::<AuditHandler>(ComponentLifetime::PerCall)
            .unwrap_err();
        assert!(error.is_scope_violation());

        let instance: Arc<dyn Handler> = Arc::new(AuditHandler);
        let error = child.register_singleton(instance).unwrap_err();
        assert!(error.is_scope_violation());
    }

    #[test]
    fn test_child_of_child_is_still_a_child() {
        let container = ServiceContainer::new();
        let child = container.build_child_container().unwrap();
        let grandchild = child.build_child_container().unwrap();

        assert!(grandchild.is_child());
    }

    #[test]
    fn test_release_is_a_no_op() {
        let mut container = ServiceContainer::new();
        container
            .configure::<AuditHandler>(ComponentLifetime::Singleton)
            .unwrap();

        let first = container.build::<dyn Handler>().unwrap().unwrap();
        container.release(&first);

        let second = container.build::<dyn Handler>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut container = ServiceContainer::new();
        container
            .configure::<AuditHandler>(ComponentLifetime::Singleton)
            .unwrap();

        container.dispose();
        assert!(container.is_disposed());
        container.dispose();
        assert!(container.is_disposed());
    }

    #[test]
    fn test_owned_root_disposal_clears_bindings() {
        let mut container = ServiceContainer::new();
        container
            .configure::<AuditHandler>(ComponentLifetime::Singleton)
            .unwrap();
        let engine = Arc::clone(container.engine());

        container.dispose();

        assert_eq!(engine.binding_count(), 0);
        assert_eq!(engine.statistics().cached_instances, 0);
    }

    #[test]
    fn test_borrowed_root_disposal_leaves_engine_intact() {
        let engine = Arc::new(ResolverEngine::new());
        {
            let mut borrowed = ServiceContainer::with_engine(Arc::clone(&engine));
            borrowed
                .configure::<AuditHandler>(ComponentLifetime::Singleton)
                .unwrap();
            let _ = borrowed.build::<dyn Handler>().unwrap().unwrap();
            borrowed.dispose();
        }

        assert_eq!(engine.binding_count(), 2);
        assert_eq!(engine.statistics().cached_instances, 1);
    }
}

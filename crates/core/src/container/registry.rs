use std::any::TypeId;
use std::sync::Arc;

use crate::container::contracts::{contracts_for, Component, ContractEntry};
use crate::container::descriptor::{
    ResolvedInstance, ServiceDescriptor, ServiceId, ServiceSource, SharedInstance,
};
use crate::container::engine::ResolverEngine;
use crate::container::lifecycle::ComponentLifetime;
use crate::container::scope::ServiceScope;
use crate::errors::CoreError;

/// Registration facade writing bindings into the engine.
///
/// Held by the root container only. Registration is idempotent per concrete
/// component type: configuring an already-known component is a logged no-op,
/// never an error, so repeated startup paths stay safe. Replacing a binding
/// is reserved to [`ComponentRegistry::register_singleton`].
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    engine: Arc<ResolverEngine>,
}

impl ComponentRegistry {
    pub(crate) fn new(engine: Arc<ResolverEngine>) -> Self {
        Self { engine }
    }

    /// Register `T` under its full contract set, instantiated via `Default`
    pub fn configure<T>(&self, lifetime: ComponentLifetime) -> Result<(), CoreError>
    where
        T: Component + Default,
    {
        self.register::<T, _>(lifetime, ServiceSource::ComponentType, || Ok(T::default()))
    }

    /// Register `T` under its full contract set, instantiated via `factory`
    pub fn configure_with<T, F>(
        &self,
        lifetime: ComponentLifetime,
        factory: F,
    ) -> Result<(), CoreError>
    where
        T: Component,
        F: Fn() -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.register::<T, F>(lifetime, ServiceSource::Factory, factory)
    }

    fn register<T, F>(
        &self,
        lifetime: ComponentLifetime,
        source: ServiceSource,
        factory: F,
    ) -> Result<(), CoreError>
    where
        T: Component,
        F: Fn() -> Result<T, CoreError> + Send + Sync + 'static,
    {
        let implementation_id = TypeId::of::<T>();
        if self.engine.has_implementation(implementation_id) {
            tracing::info!(
                component = std::any::type_name::<T>(),
                "component already registered, skipping"
            );
            return Ok(());
        }

        let scope = lifetime.service_scope();
        let factory = Arc::new(factory);
        for ContractEntry { id, caster } in contracts_for::<T>().into_entries() {
            let factory = Arc::clone(&factory);
            self.engine.add_binding(ServiceDescriptor {
                contract: id,
                implementation_id,
                implementation_name: std::any::type_name::<T>(),
                lifetime: scope,
                source,
                factory: Box::new(move || Ok(Arc::new((*factory)()?) as SharedInstance)),
                caster,
            })?;
        }

        tracing::debug!(
            component = std::any::type_name::<T>(),
            lifetime = %lifetime,
            "component registered"
        );
        Ok(())
    }

    /// Replace whatever is bound for contract `C` with a fixed instance.
    ///
    /// This is the one operation allowed to remove an existing binding; the
    /// supplied `Arc` is what every subsequent resolution hands out.
    pub fn register_singleton<C>(&self, instance: Arc<C>) -> Result<(), CoreError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let contract = ServiceId::of::<C>();
        self.engine.remove_binding(&contract)?;

        let held = Arc::clone(&instance);
        self.engine.add_binding(ServiceDescriptor {
            contract,
            implementation_id: TypeId::of::<Arc<C>>(),
            implementation_name: std::any::type_name::<C>(),
            lifetime: ServiceScope::Singleton,
            source: ServiceSource::Instance,
            factory: Box::new(move || Ok(Arc::new(Arc::clone(&held)) as SharedInstance)),
            caster: Box::new(|shared: &SharedInstance| {
                let instance = shared.clone().downcast::<Arc<C>>().ok()?;
                Some(Box::new(Arc::clone(&*instance)) as ResolvedInstance)
            }),
        })?;

        tracing::debug!(
            contract = std::any::type_name::<C>(),
            "singleton instance registered"
        );
        Ok(())
    }

    /// Check if some binding's contract equals `C`
    pub fn contains<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.engine.has_binding(&ServiceId::of::<C>())
    }

    /// Drop every binding from the backing registration store
    pub(crate) fn clear(&self) -> Result<(), CoreError> {
        self.engine.clear_bindings()
    }
}

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::container::binding::ServiceBindings;
use crate::container::descriptor::{
    ResolvedInstance, ServiceDescriptor, ServiceId, SharedInstance,
};
use crate::container::scope::{ScopeId, ServiceScope};
use crate::errors::CoreError;

/// Cached instance storage, split by lifetime
enum ServiceInstance {
    /// Singleton instance, shared process-wide
    Singleton(SharedInstance),
    /// Scoped instances, one per live scope
    Scoped(HashMap<ScopeId, SharedInstance>),
}

/// The low-level resolution engine behind the container.
///
/// Holds the binding table, the instance cache and the set of live scopes.
/// Instances are cached per implementation type, so a component registered
/// under several contracts materializes once per lifetime boundary. The
/// engine knows nothing about the scope hierarchy above it; ownership and
/// root/child rules live in the container layer.
pub struct ResolverEngine {
    bindings: RwLock<ServiceBindings>,
    instances: RwLock<HashMap<TypeId, ServiceInstance>>,
    scopes: RwLock<HashSet<ScopeId>>,
}

impl ResolverEngine {
    /// Create a new engine with an empty binding table
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(ServiceBindings::new()),
            instances: RwLock::new(HashMap::new()),
            scopes: RwLock::new(HashSet::new()),
        }
    }

    /// Add a binding to the registration store
    pub fn add_binding(&self, descriptor: ServiceDescriptor) -> Result<(), CoreError> {
        self.write_bindings()?.add_descriptor(descriptor);
        Ok(())
    }

    /// Remove every binding for `contract`.
    ///
    /// Cached instances whose implementation is no longer referenced by any
    /// remaining binding are dropped with the bindings, so a previously
    /// materialized singleton cannot outlive its registration.
    pub fn remove_binding(&self, contract: &ServiceId) -> Result<(), CoreError> {
        let orphaned: Vec<TypeId> = {
            let mut bindings = self.write_bindings()?;
            let removed = bindings.remove_contract(contract);
            if removed.is_empty() {
                return Ok(());
            }
            removed
                .iter()
                .map(|descriptor| descriptor.implementation_id)
                .filter(|implementation_id| {
                    !bindings.contains_implementation(*implementation_id)
                })
                .collect()
        };

        let mut instances = self.write_instances()?;
        for implementation_id in orphaned {
            instances.remove(&implementation_id);
        }
        Ok(())
    }

    /// Check if some binding's contract equals `contract`
    pub fn has_binding(&self, contract: &ServiceId) -> bool {
        self.bindings
            .read()
            .map(|bindings| bindings.contains(contract))
            .unwrap_or(false)
    }

    /// Check if some binding is implemented by `implementation_id`
    pub fn has_implementation(&self, implementation_id: TypeId) -> bool {
        self.bindings
            .read()
            .map(|bindings| bindings.contains_implementation(implementation_id))
            .unwrap_or(false)
    }

    /// Resolve one instance for `contract`, through `scope` when given.
    ///
    /// `Ok(None)` when no binding satisfies the contract: a miss, not an
    /// error.
    pub fn get_instance(
        &self,
        contract: &ServiceId,
        scope: Option<&ScopeId>,
    ) -> Result<Option<ResolvedInstance>, CoreError> {
        let bindings = self.read_bindings()?;
        let Some(descriptor) = bindings.get_descriptor(contract) else {
            return Ok(None);
        };
        self.resolve_descriptor(descriptor, scope).map(Some)
    }

    /// Resolve every binding for `contract`, in binding order
    pub fn get_instances(
        &self,
        contract: &ServiceId,
        scope: Option<&ScopeId>,
    ) -> Result<Vec<ResolvedInstance>, CoreError> {
        let bindings = self.read_bindings()?;
        let mut resolved = Vec::new();
        for descriptor in bindings.descriptors_for(contract) {
            resolved.push(self.resolve_descriptor(descriptor, scope)?);
        }
        Ok(resolved)
    }

    /// Open a new resolution scope
    pub fn create_scope(&self) -> Result<ScopeId, CoreError> {
        let scope_id = ScopeId::new();
        self.write_scopes()?.insert(scope_id.clone());
        Ok(scope_id)
    }

    /// Close a scope, dropping every instance cached within it
    pub fn dispose_scope(&self, scope_id: &ScopeId) -> Result<(), CoreError> {
        let was_live = self.write_scopes()?.remove(scope_id);
        if !was_live {
            return Ok(());
        }

        let mut instances = self.write_instances()?;
        for instance in instances.values_mut() {
            if let ServiceInstance::Scoped(per_scope) = instance {
                per_scope.remove(scope_id);
            }
        }
        Ok(())
    }

    /// Tear down every cached instance and live scope.
    ///
    /// Bindings survive; the registration store is cleared separately via
    /// [`ResolverEngine::clear_bindings`].
    pub fn dispose(&self) -> Result<(), CoreError> {
        self.write_instances()?.clear();
        self.write_scopes()?.clear();
        Ok(())
    }

    /// Drop every binding from the registration store
    pub fn clear_bindings(&self) -> Result<(), CoreError> {
        self.write_bindings()?.clear();
        Ok(())
    }

    /// Get the number of registered bindings
    pub fn binding_count(&self) -> usize {
        self.bindings
            .read()
            .map(|bindings| bindings.count())
            .unwrap_or(0)
    }

    /// Snapshot registration and cache state for diagnostics
    pub fn statistics(&self) -> ServiceStatistics {
        let mut stats = ServiceStatistics::default();

        if let Ok(bindings) = self.bindings.read() {
            stats.total_bindings = bindings.count();
            for descriptor in bindings.descriptors() {
                match descriptor.lifetime {
                    ServiceScope::Singleton => stats.singleton_bindings += 1,
                    ServiceScope::Scoped => stats.scoped_bindings += 1,
                    ServiceScope::Transient => stats.transient_bindings += 1,
                }
            }
        }

        if let Ok(instances) = self.instances.read() {
            stats.cached_instances = instances
                .values()
                .map(|instance| match instance {
                    ServiceInstance::Singleton(_) => 1,
                    ServiceInstance::Scoped(per_scope) => per_scope.len(),
                })
                .sum();
        }

        if let Ok(scopes) = self.scopes.read() {
            stats.active_scopes = scopes.len();
        }

        stats
    }

    fn resolve_descriptor(
        &self,
        descriptor: &ServiceDescriptor,
        scope: Option<&ScopeId>,
    ) -> Result<ResolvedInstance, CoreError> {
        let shared = self.materialize(descriptor, scope)?;
        (descriptor.caster)(&shared).ok_or_else(|| {
            CoreError::service_not_found(descriptor.contract.type_name())
        })
    }

    fn materialize(
        &self,
        descriptor: &ServiceDescriptor,
        scope: Option<&ScopeId>,
    ) -> Result<SharedInstance, CoreError> {
        match descriptor.lifetime {
            ServiceScope::Transient => (descriptor.factory)(),
            ServiceScope::Singleton => self.materialize_singleton(descriptor),
            ServiceScope::Scoped => match scope {
                Some(scope_id) => self.materialize_scoped(descriptor, scope_id),
                // Root resolution of a scoped binding: no scope to cache in.
                None => (descriptor.factory)(),
            },
        }
    }

    fn materialize_singleton(
        &self,
        descriptor: &ServiceDescriptor,
    ) -> Result<SharedInstance, CoreError> {
        {
            let instances = self.read_instances()?;
            if let Some(ServiceInstance::Singleton(existing)) =
                instances.get(&descriptor.implementation_id)
            {
                return Ok(existing.clone());
            }
        }

        let created = (descriptor.factory)()?;
        let mut instances = self.write_instances()?;
        match instances.entry(descriptor.implementation_id) {
            // Another caller won the race; keep its instance.
            Entry::Occupied(entry) => match entry.get() {
                ServiceInstance::Singleton(existing) => Ok(existing.clone()),
                ServiceInstance::Scoped(_) => Err(Self::lifetime_conflict(descriptor)),
            },
            Entry::Vacant(entry) => {
                entry.insert(ServiceInstance::Singleton(created.clone()));
                Ok(created)
            }
        }
    }

    fn materialize_scoped(
        &self,
        descriptor: &ServiceDescriptor,
        scope_id: &ScopeId,
    ) -> Result<SharedInstance, CoreError> {
        {
            let instances = self.read_instances()?;
            if let Some(ServiceInstance::Scoped(per_scope)) =
                instances.get(&descriptor.implementation_id)
            {
                if let Some(existing) = per_scope.get(scope_id) {
                    return Ok(existing.clone());
                }
            }
        }

        let created = (descriptor.factory)()?;
        let mut instances = self.write_instances()?;
        match instances.entry(descriptor.implementation_id) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                ServiceInstance::Scoped(per_scope) => {
                    let shared = per_scope.entry(scope_id.clone()).or_insert(created);
                    Ok(shared.clone())
                }
                ServiceInstance::Singleton(_) => Err(Self::lifetime_conflict(descriptor)),
            },
            Entry::Vacant(entry) => {
                let mut per_scope = HashMap::new();
                per_scope.insert(scope_id.clone(), created.clone());
                entry.insert(ServiceInstance::Scoped(per_scope));
                Ok(created)
            }
        }
    }

    fn lifetime_conflict(descriptor: &ServiceDescriptor) -> CoreError {
        CoreError::InvalidServiceDescriptor {
            message: format!(
                "component {} is cached under conflicting singleton and scoped lifetimes",
                descriptor.implementation_name
            ),
        }
    }

    fn read_bindings(&self) -> Result<RwLockReadGuard<'_, ServiceBindings>, CoreError> {
        self.bindings.read().map_err(|_| CoreError::lock("bindings"))
    }

    fn write_bindings(&self) -> Result<RwLockWriteGuard<'_, ServiceBindings>, CoreError> {
        self.bindings.write().map_err(|_| CoreError::lock("bindings"))
    }

    fn read_instances(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<TypeId, ServiceInstance>>, CoreError> {
        self.instances
            .read()
            .map_err(|_| CoreError::lock("service_instances"))
    }

    fn write_instances(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<TypeId, ServiceInstance>>, CoreError> {
        self.instances
            .write()
            .map_err(|_| CoreError::lock("service_instances"))
    }

    fn write_scopes(&self) -> Result<RwLockWriteGuard<'_, HashSet<ScopeId>>, CoreError> {
        self.scopes.write().map_err(|_| CoreError::lock("scopes"))
    }
}

impl Default for ResolverEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolverEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.statistics();
        f.debug_struct("ResolverEngine")
            .field("bindings", &stats.total_bindings)
            .field("cached_instances", &stats.cached_instances)
            .field("active_scopes", &stats.active_scopes)
            .finish()
    }
}

/// Snapshot of the engine's registration and cache state
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatistics {
    pub total_bindings: usize,
    pub singleton_bindings: usize,
    pub scoped_bindings: usize,
    pub transient_bindings: usize,
    pub cached_instances: usize,
    pub active_scopes: usize,
}

impl ServiceStatistics {
    /// Render the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

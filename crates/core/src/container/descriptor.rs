use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::container::scope::ServiceScope;
use crate::errors::CoreError;

/// Service identifier used as a contract lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceId {
    /// Create a new service ID for a type
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Type-erased handle to a component instance, as produced by its factory.
///
/// The erased type is the concrete component itself; contract-specific views
/// are produced from it by a [`ContractCaster`].
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Type-erased handle carrying an `Arc<T>` for one specific contract
pub type ResolvedInstance = Box<dyn Any + Send + Sync>;

/// Factory producing the shared concrete instance for a component
pub type ServiceFactory = Box<dyn Fn() -> Result<SharedInstance, CoreError> + Send + Sync>;

/// Converts a shared concrete instance into one contract's `Arc<T>` form.
///
/// Returns `None` when the instance is not of the implementation type the
/// caster was built for; the engine surfaces that as an error.
pub type ContractCaster = Box<dyn Fn(&SharedInstance) -> Option<ResolvedInstance> + Send + Sync>;

/// How a binding obtains its instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSource {
    /// Instantiated from the component type itself
    ComponentType,
    /// Instantiated through a caller-supplied factory
    Factory,
    /// A fixed, pre-built instance
    Instance,
}

/// Service descriptor containing all metadata for one contract binding
pub struct ServiceDescriptor {
    /// Contract this binding satisfies
    pub contract: ServiceId,
    /// Implementation type ID, shared by every binding of one component
    pub implementation_id: TypeId,
    /// Implementation type name, for diagnostics
    pub implementation_name: &'static str,
    /// Service lifetime tag
    pub lifetime: ServiceScope,
    /// How instances are obtained
    pub source: ServiceSource,
    /// Factory producing the shared concrete instance
    pub factory: ServiceFactory,
    /// Cast from the concrete instance to this contract's form
    pub caster: ContractCaster,
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("contract", &self.contract)
            .field("implementation_name", &self.implementation_name)
            .field("lifetime", &self.lifetime)
            .field("source", &self.source)
            .field("factory", &"<factory_fn>")
            .finish()
    }
}

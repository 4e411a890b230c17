use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::descriptor::{ContractCaster, ResolvedInstance, ServiceId, SharedInstance};
use crate::foundation::{Disposable, FrameworkComponent};

/// A component registrable with the container.
///
/// Implementers declare the abstract contracts they satisfy through
/// [`Component::contracts`]; the concrete type itself is always part of the
/// contract set, so a component with no declared contracts is still
/// resolvable by its own type.
pub trait Component: Send + Sync + Sized + 'static {
    /// Declare the contracts this component satisfies besides its own type
    fn contracts(set: &mut ContractSet<Self>) {
        let _ = set;
    }
}

/// One contract a component can be resolved through
pub struct ContractEntry {
    pub(crate) id: ServiceId,
    pub(crate) caster: ContractCaster,
}

impl std::fmt::Debug for ContractEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractEntry").field("id", &self.id).finish()
    }
}

/// The set of contracts one component satisfies.
///
/// Entries are deduplicated by [`ServiceId`]; iteration order is an
/// implementation detail and must not be relied upon.
pub struct ContractSet<T> {
    entries: Vec<ContractEntry>,
    _component: PhantomData<fn() -> T>,
}

impl<T: Component> ContractSet<T> {
    pub(crate) fn new() -> Self {
        let mut set = Self {
            entries: Vec::new(),
            _component: PhantomData,
        };
        set.push(
            ServiceId::of::<T>(),
            Box::new(|shared: &SharedInstance| {
                let concrete = shared.clone().downcast::<T>().ok()?;
                Some(Box::new(concrete) as ResolvedInstance)
            }),
        );
        set
    }

    /// Declare that the component satisfies contract `C`.
    ///
    /// The cast is supplied at the declaration site, where both types are
    /// concrete and the unsized coercion applies:
    ///
    /// ```ignore
    /// fn contracts(set: &mut ContractSet<Self>) {
    ///     set.provide::<dyn Sender>(|sender| sender);
    /// }
    /// ```
    ///
    /// Platform-reserved contracts are not meaningful resolution keys and
    /// are dropped from the set.
    pub fn provide<C>(&mut self, cast: fn(Arc<T>) -> Arc<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let id = ServiceId::of::<C>();
        if is_reserved_contract(&id) {
            tracing::trace!(
                contract = id.type_name(),
                "skipping platform-reserved contract"
            );
            return self;
        }
        self.push(
            id,
            Box::new(move |shared: &SharedInstance| {
                let concrete = shared.clone().downcast::<T>().ok()?;
                Some(Box::new(cast(concrete)) as ResolvedInstance)
            }),
        );
        self
    }

    fn push(&mut self, id: ServiceId, caster: ContractCaster) {
        if self.entries.iter().any(|entry| entry.id == id) {
            return;
        }
        self.entries.push(ContractEntry { id, caster });
    }

    /// Iterate the contract identifiers in the set
    pub fn ids(&self) -> impl Iterator<Item = &ServiceId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Get the number of contracts in the set
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn into_entries(self) -> Vec<ContractEntry> {
        self.entries
    }
}

/// Compute the full contract set for a component: its declared contracts,
/// minus platform-reserved interfaces, plus the concrete type itself
pub fn contracts_for<T: Component>() -> ContractSet<T> {
    let mut set = ContractSet::new();
    T::contracts(&mut set);
    set
}

fn is_reserved_contract(id: &ServiceId) -> bool {
    id.type_id == TypeId::of::<dyn FrameworkComponent>()
        || id.type_id == TypeId::of::<dyn Disposable>()
        || id.type_id == TypeId::of::<dyn Any>()
}

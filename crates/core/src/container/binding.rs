use std::any::TypeId;

use crate::container::descriptor::{ServiceDescriptor, ServiceId};

/// Ordered collection of service bindings, the mutable registration store
/// behind the engine.
///
/// Multiple bindings may share one contract; lookup returns the first match
/// and bulk resolution follows insertion order.
#[derive(Debug, Default)]
pub struct ServiceBindings {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceBindings {
    /// Create a new service bindings collection
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Add a service descriptor
    pub fn add_descriptor(&mut self, descriptor: ServiceDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Remove every binding registered for exactly `contract`, returning them
    pub fn remove_contract(&mut self, contract: &ServiceId) -> Vec<ServiceDescriptor> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.descriptors.len() {
            if self.descriptors[index].contract == *contract {
                removed.push(self.descriptors.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Get the first descriptor registered for `contract`
    pub fn get_descriptor(&self, contract: &ServiceId) -> Option<&ServiceDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.contract == *contract)
    }

    /// Iterate every descriptor registered for `contract`, in binding order
    pub fn descriptors_for<'a>(
        &'a self,
        contract: &'a ServiceId,
    ) -> impl Iterator<Item = &'a ServiceDescriptor> {
        self.descriptors
            .iter()
            .filter(move |descriptor| descriptor.contract == *contract)
    }

    /// Get all service descriptors
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Check if some binding's contract equals `contract`
    pub fn contains(&self, contract: &ServiceId) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.contract == *contract)
    }

    /// Check if some binding is implemented by `implementation_id`
    pub fn contains_implementation(&self, implementation_id: TypeId) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.implementation_id == implementation_id)
    }

    /// Get the number of registered bindings
    pub fn count(&self) -> usize {
        self.descriptors.len()
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }
}

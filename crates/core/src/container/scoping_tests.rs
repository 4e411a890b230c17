//! Scenario tests for the container across registration, scoping and disposal

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::container::{Component, ComponentLifetime, ContractSet, ServiceContainer};
    use crate::errors::CoreError;
    use crate::foundation::Disposable;

    static SENDER_INSTANCES: AtomicUsize = AtomicUsize::new(0);

    trait Sender: Send + Sync {
        fn send(&self, body: &str) -> usize;
    }

    struct EmailSender {
        sequence: usize,
    }

    impl Default for EmailSender {
        fn default() -> Self {
            Self {
                sequence: SENDER_INSTANCES.fetch_add(1, Ordering::SeqCst),
            }
        }
    }

    impl Sender for EmailSender {
        fn send(&self, body: &str) -> usize {
            body.len() + self.sequence
        }
    }

    impl Disposable for EmailSender {
        fn dispose(&self) {}
    }

    impl Component for EmailSender {
        fn contracts(set: &mut ContractSet<Self>) {
            set.provide::<dyn Sender>(|sender| sender)
                .provide::<dyn Disposable>(|sender| sender);
        }
    }

    trait UnitOfWork: Send + Sync {
        fn commit(&self) -> bool;
    }

    #[derive(Default)]
    struct OutboxUnitOfWork;

    impl UnitOfWork for OutboxUnitOfWork {
        fn commit(&self) -> bool {
            true
        }
    }

    impl Component for OutboxUnitOfWork {
        fn contracts(set: &mut ContractSet<Self>) {
            set.provide::<dyn UnitOfWork>(|unit| unit);
        }
    }

    #[test]
    fn test_email_sender_scenario() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::PerUnitOfWork)
            .unwrap();

        // Resolvable by contract and by concrete type, never by the platform
        // interface.
        assert!(root.has_component::<dyn Sender>());
        assert!(root.has_component::<EmailSender>());
        assert!(!root.has_component::<dyn Disposable>());

        let mut first = root.build_child_container().unwrap();
        let mut second = root.build_child_container().unwrap();

        let from_first = first.build::<dyn Sender>().unwrap().unwrap();
        let from_second = second.build::<dyn Sender>().unwrap().unwrap();

        // Scoped: shared within a child, distinct across children.
        let again = first.build::<dyn Sender>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&from_first, &again));
        assert!(!Arc::ptr_eq(&from_first, &from_second));

        first.dispose();
        second.dispose();

        assert!(root.has_component::<dyn Sender>());
        assert!(root.has_component::<EmailSender>());
    }

    #[test]
    fn test_scoped_instance_shared_across_contracts() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::PerUnitOfWork)
            .unwrap();

        let child = root.build_child_container().unwrap();
        let by_contract = child.build::<dyn Sender>().unwrap().unwrap();
        let by_type = child.build::<EmailSender>().unwrap().unwrap();

        // One materialization per scope, whatever contract is asked for.
        assert_eq!(by_contract.send(""), by_type.send(""));
    }

    #[test]
    fn test_singleton_shared_across_children() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::Singleton)
            .unwrap();

        let first = root.build_child_container().unwrap();
        let second = root.build_child_container().unwrap();

        let a = first.build::<dyn Sender>().unwrap().unwrap();
        let b = second.build::<dyn Sender>().unwrap().unwrap();
        let c = root.build::<dyn Sender>().unwrap().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_disposal_containment() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::Singleton)
            .unwrap();

        let before = root.build::<dyn Sender>().unwrap().unwrap();

        for _ in 0..4 {
            let mut child = root.build_child_container().unwrap();
            let _ = child.build::<dyn Sender>().unwrap().unwrap();
            child.dispose();
        }

        let after = root.build::<dyn Sender>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_drop_releases_child_scope() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::PerUnitOfWork)
            .unwrap();

        {
            let child = root.build_child_container().unwrap();
            let _ = child.build::<dyn Sender>().unwrap().unwrap();
            assert_eq!(root.statistics().cached_instances, 1);
        }

        // The child fell out of scope; its cached instance went with it.
        assert_eq!(root.statistics().cached_instances, 0);
        assert_eq!(root.statistics().active_scopes, 0);
    }

    #[test]
    fn test_idempotent_configuration_preserves_instances() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::Singleton)
            .unwrap();

        let before = root.build::<dyn Sender>().unwrap().unwrap();
        let bindings_before = root.statistics().total_bindings;

        root.configure::<EmailSender>(ComponentLifetime::PerCall)
            .unwrap();

        assert_eq!(root.statistics().total_bindings, bindings_before);
        let after = root.build::<dyn Sender>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_singleton_override_wins() {
        let mut root = ServiceContainer::new();

        let first: Arc<dyn UnitOfWork> = Arc::new(OutboxUnitOfWork);
        let second: Arc<dyn UnitOfWork> = Arc::new(OutboxUnitOfWork);

        root.register_singleton(Arc::clone(&first)).unwrap();
        let resolved = root.build::<dyn UnitOfWork>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));

        root.register_singleton(Arc::clone(&second)).unwrap();
        let resolved = root.build::<dyn UnitOfWork>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));

        assert_eq!(root.build_all::<dyn UnitOfWork>().unwrap().len(), 1);
    }

    #[test]
    fn test_component_and_instance_registrations_coexist() {
        // The registration ledger keys idempotency on the concrete type while
        // has_component queries by contract; a singleton instance registered
        // for the concrete contract does not block a later configure of the
        // same component, and the instance binding stays first.
        let mut root = ServiceContainer::new();

        let pinned = Arc::new(EmailSender::default());
        root.register_singleton(Arc::clone(&pinned)).unwrap();
        assert!(root.has_component::<EmailSender>());

        root.configure::<EmailSender>(ComponentLifetime::PerCall)
            .unwrap();

        let resolved = root.build::<EmailSender>().unwrap().unwrap();
        assert!(Arc::ptr_eq(&resolved, &pinned));
        assert_eq!(root.build_all::<EmailSender>().unwrap().len(), 2);
    }

    #[test]
    fn test_factory_registration_resolves_through_contract() {
        let mut root = ServiceContainer::new();
        root.configure_with::<EmailSender, _>(ComponentLifetime::PerCall, || {
            Ok(EmailSender { sequence: 0 })
        })
        .unwrap();

        let sender = root.build::<dyn Sender>().unwrap().unwrap();
        assert_eq!(sender.send("ping"), 4);
    }

    #[test]
    fn test_failing_factory_surfaces_error() {
        let mut root = ServiceContainer::new();
        root.configure_with::<EmailSender, _>(ComponentLifetime::PerCall, || {
            Err(CoreError::configuration("smtp relay unavailable"))
        })
        .unwrap();

        let result = root.build::<dyn Sender>();
        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }

    #[test]
    fn test_concurrent_children_resolve_independently() {
        let mut root = ServiceContainer::new();
        root.configure::<EmailSender>(ComponentLifetime::PerUnitOfWork)
            .unwrap();
        let root = Arc::new(root);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let root = Arc::clone(&root);
                std::thread::spawn(move || {
                    let mut child = root.build_child_container().unwrap();
                    let first = child.build::<dyn Sender>().unwrap().unwrap();
                    let second = child.build::<dyn Sender>().unwrap().unwrap();
                    assert!(Arc::ptr_eq(&first, &second));
                    child.dispose();
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(root.statistics().cached_instances, 0);
        assert!(root.has_component::<dyn Sender>());
    }
}

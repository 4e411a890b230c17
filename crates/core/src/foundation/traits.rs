use std::any::TypeId;
use std::fmt;

/// Core trait for framework components that can be registered and managed
pub trait FrameworkComponent: Send + Sync + 'static {
    /// Get the type name of this component
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Get the TypeId of this component
    fn type_id(&self) -> TypeId
    where
        Self: Sized,
    {
        TypeId::of::<Self>()
    }
}

/// Trait for components that release resources at the end of their lifetime.
///
/// This is a platform interface consumed by the framework itself: implementing
/// it never turns it into a resolution contract.
pub trait Disposable: Send + Sync {
    /// Release any resources held by the component
    fn dispose(&self);
}

impl fmt::Debug for dyn FrameworkComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkComponent")
            .field("type_name", &self.type_name())
            .finish()
    }
}

use crate::di::Container;
use std::sync::Arc;

/// Fluent construction of a [`Container`] outside of a bootstrap run,
/// e.g. for seeding infrastructure services before the configure phase.
///
/// # Example
/// ```
/// use ignite::di::ContainerBuilder;
///
/// struct Clock;
///
/// let container = ContainerBuilder::new().register(Clock).build();
/// assert!(container.contains::<Clock>());
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing container instead of an empty one
    pub fn from_container(container: Container) -> Self {
        Self { container }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Register a shared instance, possibly a trait object
    pub fn register_arc<T: ?Sized + 'static + Send + Sync>(mut self, instance: Arc<T>) -> Self {
        self.container.register_arc(instance);
        self
    }

    /// Bind a trait to a concrete implementation
    ///
    /// This enables resolving `Arc<dyn Trait>` to the registered implementation.
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

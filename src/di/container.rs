use crate::error::{IgniteError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Erased service slot. The inner value is always an `Arc<T>` for the key's `T`,
/// which is what lets unsized `T` (trait objects) share the same lookup path.
type Slot = Arc<dyn Any + Send + Sync>;

/// Function that turns the slot of an implementation into the slot of a trait object.
type CasterFn = Arc<dyn Fn(&Slot) -> Option<Slot> + Send + Sync>;

/// Thread-safe, type-keyed service registry.
///
/// Hooks of the configure phase register services through `&mut Container`;
/// once the application is built the container is frozen behind an `Arc`
/// and only read from.
#[derive(Clone, Default)]
pub struct Container {
    services: DashMap<TypeId, Slot>,
    trait_mappings: DashMap<TypeId, (TypeId, CasterFn)>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.register_arc(Arc::new(instance))
    }

    /// Register an already shared instance. Works for trait objects too:
    /// `container.register_arc::<dyn Clock>(Arc::new(SystemClock))`.
    pub fn register_arc<T: ?Sized + 'static + Send + Sync>(&mut self, instance: Arc<T>) -> &mut Self {
        let slot: Slot = Arc::new(instance);
        self.services.insert(TypeId::of::<T>(), slot);
        self
    }

    /// Map `Trait` onto a registered `Impl`, so `Arc<dyn Trait>` can be resolved.
    ///
    /// The implementation may be registered before or after the mapping.
    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let caster: CasterFn = Arc::new(move |slot: &Slot| {
            let concrete = slot.downcast_ref::<Arc<Impl>>()?.clone();
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as Slot)
        });

        self.trait_mappings
            .insert(TypeId::of::<Trait>(), (TypeId::of::<Impl>(), caster));
        self
    }

    /// Look a service up by type. Direct registrations win over trait mappings.
    pub fn try_resolve<T: ?Sized + 'static + Send + Sync>(&self) -> Option<Arc<T>> {
        let requested = TypeId::of::<T>();

        if let Some(slot) = self.services.get(&requested) {
            return slot.downcast_ref::<Arc<T>>().cloned();
        }

        let mapping = self.trait_mappings.get(&requested)?;
        let (impl_id, caster) = mapping.value();
        let impl_slot = self.services.get(impl_id)?;
        let cast = caster(impl_slot.value())?;
        cast.downcast_ref::<Arc<T>>().cloned()
    }

    pub fn resolve<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        self.try_resolve::<T>()
            .ok_or_else(|| IgniteError::DependencyNotFound {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id) || self.trait_mappings.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.services.len())
            .field("trait_mappings", &self.trait_mappings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestService {
        value: i32,
    }

    trait MyTrait: Send + Sync {
        fn get_value(&self) -> i32;
    }

    struct MyTraitImpl {
        value: i32,
    }

    impl MyTrait for MyTraitImpl {
        fn get_value(&self) -> i32 {
            self.value
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(TestService { value: 42 });
        let service = container.resolve::<TestService>().unwrap();
        assert_eq!(service.value, 42);
    }

    #[test]
    fn test_register_and_resolve_trait() {
        let mut container = Container::new();
        container.register(MyTraitImpl { value: 99 });
        container.register_trait::<dyn MyTrait, MyTraitImpl, _>(|i| i as Arc<dyn MyTrait>);
        let trait_instance = container.resolve::<dyn MyTrait>().unwrap();
        assert_eq!(trait_instance.get_value(), 99);
    }

    #[test]
    fn test_mapping_before_implementation() {
        let mut container = Container::new();
        container.register_trait::<dyn MyTrait, MyTraitImpl, _>(|i| i as Arc<dyn MyTrait>);
        assert!(container.try_resolve::<dyn MyTrait>().is_none());

        container.register(MyTraitImpl { value: 7 });
        assert_eq!(container.resolve::<dyn MyTrait>().unwrap().get_value(), 7);
    }

    #[test]
    fn test_register_arc_trait_object() {
        let mut container = Container::new();
        container.register_arc::<dyn MyTrait>(Arc::new(MyTraitImpl { value: 5 }));
        assert!(container.contains::<dyn MyTrait>());
        assert_eq!(container.resolve::<dyn MyTrait>().unwrap().get_value(), 5);
    }

    #[test]
    fn test_missing_dependency_reports_type_name() {
        let container = Container::new();
        let err = container.resolve::<TestService>().unwrap_err();
        assert!(err.to_string().contains("TestService"));
    }
}

//! Typed parameter resolution for bootstrap hooks.
//!
//! Every hook argument after the phase subject implements [`Resolve`]. The
//! orchestrator resolves the whole argument tuple from the container before
//! the hook runs, so a hook never observes a half-resolved argument list.

use crate::di::Container;
use std::sync::Arc;
use thiserror::Error;

/// A single declared hook parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub type_name: &'static str,
    pub optional: bool,
}

/// A required parameter that the container could not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no service registered for `{type_name}`")]
pub struct Unresolved {
    pub type_name: &'static str,
}

/// A value that can be produced from the container by type.
///
/// Implemented for `Arc<T>` (required), `Option<Arc<T>>` (optional) and
/// tuples of those, up to six elements.
pub trait Resolve: Sized + Send + 'static {
    fn dependencies() -> Vec<Dependency>;

    fn resolve(container: &Container) -> Result<Self, Unresolved>;
}

impl<T> Resolve for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency {
            type_name: std::any::type_name::<T>(),
            optional: false,
        }]
    }

    fn resolve(container: &Container) -> Result<Self, Unresolved> {
        container.try_resolve::<T>().ok_or(Unresolved {
            type_name: std::any::type_name::<T>(),
        })
    }
}

impl<T> Resolve for Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency {
            type_name: std::any::type_name::<T>(),
            optional: true,
        }]
    }

    fn resolve(container: &Container) -> Result<Self, Unresolved> {
        Ok(container.try_resolve::<T>())
    }
}

macro_rules! impl_resolve_tuple {
    ($($ty:ident),*) => {
        impl<$($ty,)*> Resolve for ($($ty,)*)
        where
            $($ty: Resolve,)*
        {
            fn dependencies() -> Vec<Dependency> {
                #[allow(unused_mut)]
                let mut deps = Vec::new();
                $(deps.extend($ty::dependencies());)*
                deps
            }

            #[allow(unused_variables)]
            fn resolve(container: &Container) -> Result<Self, Unresolved> {
                Ok(($($ty::resolve(container)?,)*))
            }
        }
    };
}

impl_resolve_tuple!();
impl_resolve_tuple!(T1);
impl_resolve_tuple!(T1, T2);
impl_resolve_tuple!(T1, T2, T3);
impl_resolve_tuple!(T1, T2, T3, T4);
impl_resolve_tuple!(T1, T2, T3, T4, T5);
impl_resolve_tuple!(T1, T2, T3, T4, T5, T6);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Settings;
    #[derive(Debug)]
    struct Clock;

    #[test]
    fn required_dependency_fails_when_missing() {
        let container = Container::new();
        let err = <Arc<Settings> as Resolve>::resolve(&container).unwrap_err();
        assert!(err.type_name.ends_with("Settings"));
        assert!(!<Arc<Settings> as Resolve>::dependencies()[0].optional);
    }

    #[test]
    fn optional_dependency_never_fails() {
        let mut container = Container::new();
        let missing = <Option<Arc<Settings>> as Resolve>::resolve(&container).unwrap();
        assert!(missing.is_none());

        container.register(Settings);
        let present = <Option<Arc<Settings>> as Resolve>::resolve(&container).unwrap();
        assert!(present.is_some());
        assert!(<Option<Arc<Settings>> as Resolve>::dependencies()[0].optional);
    }

    #[test]
    fn tuple_fails_on_first_missing_requirement() {
        let mut container = Container::new();
        container.register(Settings);

        type Args = (Arc<Settings>, Option<Arc<Clock>>, Arc<Clock>);
        let err = <Args as Resolve>::resolve(&container).unwrap_err();
        assert!(err.type_name.ends_with("Clock"));
        assert_eq!(<Args as Resolve>::dependencies().len(), 3);

        container.register(Clock);
        assert!(<Args as Resolve>::resolve(&container).is_ok());
        assert!(<() as Resolve>::dependencies().is_empty());
    }
}

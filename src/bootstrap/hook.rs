//! Hook values: the callable bodies a component contributes to a phase.
//!
//! A hook is any function whose first argument is the phase subject
//! (`&mut AppBuilder` or `&mut App`) and whose remaining arguments implement
//! [`Resolve`]. Returning `anyhow::Result<()>` makes it blocking; returning a
//! `'static + Send` future of that makes it non-blocking.
//!
//! ```rust,ignore
//! fn configure_builder(builder: &mut AppBuilder, keys: Arc<KeyRing>) -> anyhow::Result<()> {
//!     builder.container_mut().register(TokenSigner::new(&keys));
//!     Ok(())
//! }
//!
//! fn decorate_app_async(app: &mut App) -> BoxFuture<'static, anyhow::Result<()>> {
//!     let cache = app.container().try_resolve::<Cache>();
//!     async move { warm(cache).await }.boxed()
//! }
//! ```

use crate::di::{Container, Dependency, Resolve, Unresolved};
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Lifecycle phase a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Build time, before the application exists.
    Configure,
    /// After the application has been built.
    Decorate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookKind {
    Sync,
    Async,
}

/// One of the four hook positions on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum HookSlot {
    ConfigureSync,
    ConfigureAsync,
    DecorateSync,
    DecorateAsync,
}

impl HookSlot {
    pub const fn phase(self) -> Phase {
        match self {
            Self::ConfigureSync | Self::ConfigureAsync => Phase::Configure,
            Self::DecorateSync | Self::DecorateAsync => Phase::Decorate,
        }
    }

    pub const fn kind(self) -> HookKind {
        match self {
            Self::ConfigureSync | Self::DecorateSync => HookKind::Sync,
            Self::ConfigureAsync | Self::DecorateAsync => HookKind::Async,
        }
    }

    /// Method names accepted for this slot. Matching is exact and case-sensitive.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ConfigureSync => &["ConfiguresBuilder", "ConfigureBuilder"],
            Self::ConfigureAsync => &["ConfiguresBuilderAsync", "ConfigureBuilderAsync"],
            Self::DecorateSync => &["DecoratesApp", "DecorateApp"],
            Self::DecorateAsync => &["DecoratesAppAsync", "DecorateAppAsync"],
        }
    }

    pub fn from_alias(name: &str) -> Option<Self> {
        Self::iter().find(|slot| slot.aliases().contains(&name))
    }
}

/// The implicit first argument of every hook in a phase.
pub trait Subject: Send + 'static {
    const PHASE: Phase;

    /// Container the remaining hook arguments are resolved from.
    fn container(&self) -> &Container;
}

pub(crate) type SyncBody<S> =
    Box<dyn Fn(&mut S) -> Result<anyhow::Result<()>, Unresolved> + Send + Sync>;

pub(crate) type AsyncBody<S> =
    Box<dyn Fn(&mut S) -> Result<BoxFuture<'static, anyhow::Result<()>>, Unresolved> + Send + Sync>;

/// Typed hook body, recovered from [`Hook`] once the subject type is known.
pub(crate) enum Callable<S> {
    Sync(SyncBody<S>),
    Async(AsyncBody<S>),
}

/// A type-erased hook.
pub struct Hook {
    phase: Phase,
    kind: HookKind,
    subject: &'static str,
    dependencies: Vec<Dependency>,
    body: Box<dyn Any + Send + Sync>,
}

impl Hook {
    fn new<S: Subject>(kind: HookKind, dependencies: Vec<Dependency>, body: Callable<S>) -> Self {
        Self {
            phase: S::PHASE,
            kind,
            subject: std::any::type_name::<S>(),
            dependencies,
            body: Box::new(body),
        }
    }

    /// Phase implied by the hook's subject argument.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kind(&self) -> HookKind {
        self.kind
    }

    pub fn subject(&self) -> &'static str {
        self.subject
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub(crate) fn callable<S: Subject>(&self) -> Option<&Callable<S>> {
        self.body.downcast_ref::<Callable<S>>()
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("phase", &self.phase)
            .field("kind", &self.kind)
            .field("subject", &self.subject)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Marker for hooks returning `anyhow::Result<()>` directly.
pub struct Blocking;

/// Marker for hooks returning a future.
pub struct NonBlocking;

/// Conversion of a plain function into a [`Hook`].
///
/// The marker parameter `M` only disambiguates the blanket impls; callers
/// never name it.
pub trait IntoHook<M>: Sized {
    fn into_hook(self) -> Hook;
}

impl IntoHook<()> for Hook {
    fn into_hook(self) -> Hook {
        self
    }
}

macro_rules! impl_into_hook {
    ($($ty:ident),*) => {
        impl<F, S, $($ty,)*> IntoHook<(Blocking, S, $($ty,)*)> for F
        where
            F: Fn(&mut S, $($ty,)*) -> anyhow::Result<()> + Send + Sync + 'static,
            S: Subject,
            $($ty: Resolve,)*
        {
            #[allow(non_snake_case)]
            fn into_hook(self) -> Hook {
                let f = self;
                let body = move |subject: &mut S| -> Result<anyhow::Result<()>, Unresolved> {
                    let ($($ty,)*) = <($($ty,)*) as Resolve>::resolve(subject.container())?;
                    Ok(f(subject, $($ty,)*))
                };
                Hook::new::<S>(
                    HookKind::Sync,
                    <($($ty,)*) as Resolve>::dependencies(),
                    Callable::Sync(Box::new(body)),
                )
            }
        }

        impl<F, S, Fut, $($ty,)*> IntoHook<(NonBlocking, S, Fut, $($ty,)*)> for F
        where
            F: Fn(&mut S, $($ty,)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
            S: Subject,
            $($ty: Resolve,)*
        {
            #[allow(non_snake_case)]
            fn into_hook(self) -> Hook {
                let f = self;
                let body = move |subject: &mut S| -> Result<BoxFuture<'static, anyhow::Result<()>>, Unresolved> {
                    let ($($ty,)*) = <($($ty,)*) as Resolve>::resolve(subject.container())?;
                    let future: BoxFuture<'static, anyhow::Result<()>> = Box::pin(f(subject, $($ty,)*));
                    Ok(future)
                };
                Hook::new::<S>(
                    HookKind::Async,
                    <($($ty,)*) as Resolve>::dependencies(),
                    Callable::Async(Box::new(body)),
                )
            }
        }
    };
}

impl_into_hook!();
impl_into_hook!(T1);
impl_into_hook!(T1, T2);
impl_into_hook!(T1, T2, T3);
impl_into_hook!(T1, T2, T3, T4);
impl_into_hook!(T1, T2, T3, T4, T5);
impl_into_hook!(T1, T2, T3, T4, T5, T6);

use super::hook::{Hook, HookKind, HookSlot, IntoHook, Phase};

/// Priority given to components that do not declare one. Lower runs earlier.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// The marked type as declared by its author: a name, an optional priority
/// and named methods, not yet matched against hook slots.
///
/// `#[bootstrapper]` generates one of these per `impl` block. It can also be
/// built by hand for [`StaticDiscovery`](super::StaticDiscovery):
///
/// ```rust,ignore
/// ComponentDescriptor::new("app::boot::KeySetup")
///     .priority(10)
///     .method("ConfigureBuilder", configure_keys)
/// ```
pub struct ComponentDescriptor {
    name: String,
    priority: Option<i32>,
    methods: Vec<(String, Hook)>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            methods: Vec::new(),
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn method<M, H>(mut self, name: impl Into<String>, hook: H) -> Self
    where
        H: IntoHook<M>,
    {
        self.methods.push((name.into(), hook.into_hook()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last `::` segment of the name.
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn declared_priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn into_parts(self) -> (String, i32, Vec<(String, Hook)>) {
        (
            self.name,
            self.priority.unwrap_or(DEFAULT_PRIORITY),
            self.methods,
        )
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("methods", &self.methods.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Link-time registration of a marked type, emitted by `#[bootstrapper]`.
pub struct Registration {
    pub name: &'static str,
    pub describe: fn() -> ComponentDescriptor,
}

impl Registration {
    pub const fn new(name: &'static str, describe: fn() -> ComponentDescriptor) -> Self {
        Self { name, describe }
    }

    /// Every registration linked into the current binary, in no particular order.
    pub fn all() -> impl Iterator<Item = &'static Registration> {
        inventory::iter::<Registration>.into_iter()
    }
}

inventory::collect!(Registration);

/// Hooks of one phase. When both are present the async hook is the one that runs.
#[derive(Debug, Default)]
pub struct PhaseHooks {
    sync_hook: Option<Hook>,
    async_hook: Option<Hook>,
}

impl PhaseHooks {
    pub fn effective(&self) -> Option<&Hook> {
        self.async_hook.as_ref().or(self.sync_hook.as_ref())
    }

    pub fn get(&self, kind: HookKind) -> Option<&Hook> {
        match kind {
            HookKind::Sync => self.sync_hook.as_ref(),
            HookKind::Async => self.async_hook.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sync_hook.is_none() && self.async_hook.is_none()
    }

    fn get_mut(&mut self, kind: HookKind) -> &mut Option<Hook> {
        match kind {
            HookKind::Sync => &mut self.sync_hook,
            HookKind::Async => &mut self.async_hook,
        }
    }
}

/// A discovered initializer with its hooks matched to slots.
#[derive(Debug)]
pub struct BootstrapComponent {
    name: String,
    priority: i32,
    configure: PhaseHooks,
    decorate: PhaseHooks,
}

impl BootstrapComponent {
    pub(crate) fn new(name: String, priority: i32) -> Self {
        Self {
            name,
            priority,
            configure: PhaseHooks::default(),
            decorate: PhaseHooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn hooks(&self, phase: Phase) -> &PhaseHooks {
        match phase {
            Phase::Configure => &self.configure,
            Phase::Decorate => &self.decorate,
        }
    }

    pub fn has_hook(&self, slot: HookSlot) -> bool {
        self.hooks(slot.phase()).get(slot.kind()).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.configure.is_empty() && self.decorate.is_empty()
    }

    /// Place `hook` into `slot`. Returns the hook back if the slot is taken.
    pub(crate) fn fill(&mut self, slot: HookSlot, hook: Hook) -> Result<(), Hook> {
        let phase = match slot.phase() {
            Phase::Configure => &mut self.configure,
            Phase::Decorate => &mut self.decorate,
        };
        let target = phase.get_mut(slot.kind());
        if target.is_some() {
            return Err(hook);
        }
        *target = Some(hook);
        Ok(())
    }
}

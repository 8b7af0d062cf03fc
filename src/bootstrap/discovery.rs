//! Component discovery.
//!
//! A [`DiscoveryStrategy`] yields candidate descriptors; [`discover`] then
//! matches their method names against the hook alias table and keeps only
//! components with at least one valid hook.

use super::component::{BootstrapComponent, ComponentDescriptor, Registration, short_name};
use super::error::BootstrapFailure;
use super::hook::HookSlot;
use std::collections::HashSet;

/// Outcome of a strategy lookup.
#[derive(Debug)]
pub enum Candidate {
    Found(ComponentDescriptor),
    /// A configured name that could not be turned into a descriptor.
    Missing { name: String, reason: String },
}

/// Source of candidate components.
///
/// The returned order is the tie-break order for equal priorities, so
/// implementations must make it deterministic.
pub trait DiscoveryStrategy: Send {
    fn name(&self) -> &'static str;

    fn candidates(self: Box<Self>) -> Vec<Candidate>;
}

type NameFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Every `#[bootstrapper]` type linked into the binary, ordered by full name.
#[derive(Default)]
pub struct InventoryDiscovery {
    filter: Option<NameFilter>,
}

impl InventoryDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only registrations whose full name satisfies `filter`.
    pub fn only<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }
}

impl DiscoveryStrategy for InventoryDiscovery {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn candidates(self: Box<Self>) -> Vec<Candidate> {
        let mut registrations: Vec<&'static Registration> = Registration::all()
            .filter(|r| self.filter.as_ref().is_none_or(|keep| keep(r.name)))
            .collect();
        registrations.sort_by_key(|r| r.name);

        registrations
            .into_iter()
            .map(|r| Candidate::Found((r.describe)()))
            .collect()
    }
}

type Describe = Box<dyn Fn() -> ComponentDescriptor + Send + Sync>;

/// Name-addressable set of known components for [`ConfiguredDiscovery`].
#[derive(Default)]
pub struct Catalog {
    entries: Vec<(String, Describe)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound,
    Ambiguous(Vec<String>),
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_inventory() -> Self {
        let mut catalog = Self::new();
        for registration in Registration::all() {
            let describe = registration.describe;
            catalog.insert(registration.name, move || describe());
        }
        catalog
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, describe: F) -> &mut Self
    where
        F: Fn() -> ComponentDescriptor + Send + Sync + 'static,
    {
        self.entries.push((name.into(), Box::new(describe)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find by full name, or by short name when exactly one entry has it.
    pub fn lookup(&self, name: &str) -> Result<(&str, &Describe), LookupError> {
        if let Some((full, describe)) = self.entries.iter().find(|(full, _)| full == name) {
            return Ok((full.as_str(), describe));
        }

        let matches: Vec<&(String, Describe)> = self
            .entries
            .iter()
            .filter(|(full, _)| short_name(full) == name)
            .collect();

        match matches.len() {
            0 => Err(LookupError::NotFound),
            1 => {
                let (full, describe) = matches[0];
                Ok((full.as_str(), describe))
            }
            _ => {
                let mut names: Vec<String> = matches.iter().map(|(full, _)| full.clone()).collect();
                names.sort();
                Err(LookupError::Ambiguous(names))
            }
        }
    }
}

/// Components named in configuration, in list order.
pub struct ConfiguredDiscovery {
    names: Vec<String>,
    catalog: Catalog,
}

impl ConfiguredDiscovery {
    pub fn new(names: Vec<String>, catalog: Catalog) -> Self {
        Self { names, catalog }
    }
}

impl DiscoveryStrategy for ConfiguredDiscovery {
    fn name(&self) -> &'static str {
        "configured"
    }

    fn candidates(self: Box<Self>) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(self.names.len());

        for name in &self.names {
            match self.catalog.lookup(name) {
                Ok((full, describe)) => {
                    if !seen.insert(full.to_string()) {
                        tracing::warn!(component = %full, "Bootstrapper listed more than once, ignoring repeat");
                        continue;
                    }
                    candidates.push(Candidate::Found(describe()));
                }
                Err(LookupError::NotFound) => candidates.push(Candidate::Missing {
                    name: name.clone(),
                    reason: "bootstrapper type not found".to_string(),
                }),
                Err(LookupError::Ambiguous(matches)) => candidates.push(Candidate::Missing {
                    name: name.clone(),
                    reason: format!("ambiguous bootstrapper name, matches {}", matches.join(", ")),
                }),
            }
        }

        candidates
    }
}

/// Explicit registration table, kept in registration order.
#[derive(Debug, Default)]
pub struct StaticDiscovery {
    descriptors: Vec<ComponentDescriptor>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn register_with_priority(self, descriptor: ComponentDescriptor, priority: i32) -> Self {
        self.register(descriptor.priority(priority))
    }
}

impl DiscoveryStrategy for StaticDiscovery {
    fn name(&self) -> &'static str {
        "static"
    }

    fn candidates(self: Box<Self>) -> Vec<Candidate> {
        self.descriptors.into_iter().map(Candidate::Found).collect()
    }
}

/// Components that survived discovery, plus what was dropped and why.
#[derive(Debug, Default)]
pub struct Discovered {
    pub components: Vec<BootstrapComponent>,
    pub failures: Vec<BootstrapFailure>,
}

/// Turn the strategy's candidates into components with matched hook slots.
pub fn discover(strategy: Box<dyn DiscoveryStrategy>) -> Discovered {
    let strategy_name = strategy.name();
    let mut discovered = Discovered::default();

    for candidate in strategy.candidates() {
        let descriptor = match candidate {
            Candidate::Found(descriptor) => descriptor,
            Candidate::Missing { name, reason } => {
                tracing::warn!(component = %name, %reason, "Bootstrapper dropped");
                discovered.failures.push(BootstrapFailure::Discovery {
                    component: name,
                    reason,
                });
                continue;
            }
        };

        match match_hooks(descriptor) {
            Ok(component) => discovered.components.push(component),
            Err(failure) => {
                tracing::warn!(component = %failure.component(), error = %failure, "Bootstrapper dropped");
                discovered.failures.push(failure);
            }
        }
    }

    tracing::debug!(
        strategy = strategy_name,
        found = discovered.components.len(),
        dropped = discovered.failures.len(),
        "Discovery finished"
    );
    discovered
}

fn match_hooks(descriptor: ComponentDescriptor) -> Result<BootstrapComponent, BootstrapFailure> {
    let (name, priority, methods) = descriptor.into_parts();
    let mut component = BootstrapComponent::new(name, priority);
    let dropped = |component: &BootstrapComponent, reason: String| BootstrapFailure::Discovery {
        component: component.name().to_string(),
        reason,
    };

    for (method, hook) in methods {
        let Some(slot) = HookSlot::from_alias(&method) else {
            tracing::debug!(component = %component.name(), %method, "Not a hook alias, ignoring");
            continue;
        };

        if hook.kind() != slot.kind() {
            return Err(dropped(
                &component,
                format!("'{method}' expects a {} hook but found a {} one", slot.kind(), hook.kind()),
            ));
        }

        if hook.phase() != slot.phase() {
            return Err(dropped(
                &component,
                format!(
                    "'{method}' belongs to the {} phase but takes `{}`",
                    slot.phase(),
                    hook.subject()
                ),
            ));
        }

        if component.fill(slot, hook).is_err() {
            tracing::warn!(
                component = %component.name(),
                %method,
                %slot,
                "Hook slot already filled, ignoring duplicate"
            );
        }
    }

    if component.is_empty() {
        return Err(dropped(&component, "no recognized hook methods".to_string()));
    }

    Ok(component)
}

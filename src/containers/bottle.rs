use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::containers::tracking::{ContainerId, Dependent, Tracker};
use crate::error::{BottleError, Result};
use crate::interfaces::container::{Container, ContainerHandle, Service, ServiceName};
use crate::interfaces::provider::{Provider, Providers};

struct Instance {
    seq: u64,
    value: Service,
}

/// Lazy service container.
///
/// Services are built by their provider on first access and cached until
/// deleted. Names the bottle does not provide are delegated to its ancestor;
/// an ancestor's providers then see the descendant's merged view.
pub struct Bottle {
    id: ContainerId,
    me: Weak<Bottle>,
    providers: Providers,
    instances: DashMap<ServiceName, Instance>,
    dependents: DashMap<ServiceName, HashSet<Dependent>>,
    ancestor: Option<Arc<dyn ContainerHandle>>,
    tracker: Arc<Tracker>,
    builds: AtomicU64,
}

impl Bottle {
    pub fn new(providers: Providers) -> Arc<Self> {
        Self::build(providers, None, Arc::new(Tracker::new()))
    }

    /// A bottle that delegates the names it does not provide to `ancestor`.
    pub fn with_ancestor(providers: Providers, ancestor: Arc<dyn ContainerHandle>) -> Arc<Self> {
        let tracker = ancestor.tracker();
        Self::build(providers, Some(ancestor), tracker)
    }

    fn build(
        providers: Providers,
        ancestor: Option<Arc<dyn ContainerHandle>>,
        tracker: Arc<Tracker>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Bottle {
            id: ContainerId::next(),
            me: me.clone(),
            providers,
            instances: DashMap::new(),
            dependents: DashMap::new(),
            ancestor,
            tracker,
            builds: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn ancestor(&self) -> Option<&Arc<dyn ContainerHandle>> {
        self.ancestor.as_ref()
    }

    /// Whether this bottle itself provides `name`, ignoring the ancestor.
    pub fn provides(&self, name: &str) -> bool {
        self.providers.contains(name)
    }

    /// Resolves `name` through this bottle and downcasts it to `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        (self as &dyn Container).get(name)
    }

    /// Deep delete of `name`.
    pub fn remove(&self, name: &str) -> bool {
        self.delete(name, true)
    }

    /// Services recorded as built from `name`, if this bottle owns it.
    pub fn dependents(&self, name: &str) -> Vec<Dependent> {
        self.dependents
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn frame(&self, name: &ServiceName) -> Dependent {
        let handle: Weak<dyn Container> = self.me.clone();
        Dependent::new(name.clone(), self.id, handle)
    }

    fn cached(&self, name: &str) -> Option<Service> {
        self.instances.get(name).map(|instance| instance.value.clone())
    }

    fn instantiate(
        &self,
        name: &ServiceName,
        provider: &Provider,
        view: &dyn Container,
    ) -> Result<Service> {
        debug!(service = %name, container = %self.id, "instantiating service");
        let built = {
            let _building = self.tracker.track(self.frame(name));
            provider.instantiate(view)
        };
        let value = built.map_err(|err| {
            debug!(service = %name, container = %self.id, error = %err, "provider failed");
            BottleError::from_provider(name, err)
        })?;

        let seq = self.builds.fetch_add(1, Ordering::Relaxed);
        self.instances.insert(
            name.clone(),
            Instance {
                seq,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    fn evict_dependents(&self, name: &ServiceName) {
        let Some(_eviction) = self.tracker.evict(self.frame(name)) else {
            return;
        };
        for dependent in self.dependents(name) {
            trace!(service = %name, dependent = %dependent.name(), "cascading delete");
            dependent.evict();
        }
    }
}

impl Container for Bottle {
    fn resolve(&self, name: &str) -> Result<Service> {
        self.resolve_for(name, self)
    }

    fn has(&self, name: &str) -> bool {
        if self.providers.contains(name) {
            return true;
        }
        match &self.ancestor {
            Some(ancestor) => ancestor.has(name),
            None => false,
        }
    }

    fn delete(&self, name: &str, deep: bool) -> bool {
        let Some((key, _)) = self.providers.lookup(name) else {
            return match &self.ancestor {
                Some(ancestor) => ancestor.delete(name, deep),
                None => {
                    trace!(service = %name, container = %self.id, "nothing to delete");
                    true
                }
            };
        };

        let _chain = self.tracker.lock();
        if deep {
            self.evict_dependents(key);
        }
        let removed = self.instances.remove(name).is_some();
        if removed {
            debug!(service = %name, container = %self.id, deep, "evicted service");
        }
        removed
    }

    fn list_built(&self) -> Vec<ServiceName> {
        let mut built: Vec<(u64, ServiceName)> = self
            .instances
            .iter()
            .map(|entry| (entry.value().seq, entry.key().clone()))
            .collect();
        built.sort_unstable_by_key(|(seq, _)| *seq);

        let mut names: Vec<ServiceName> = built.into_iter().map(|(_, name)| name).collect();
        if let Some(ancestor) = &self.ancestor {
            names.extend(ancestor.list_built());
        }
        names
    }
}

impl ContainerHandle for Bottle {
    fn resolve_for(&self, name: &str, view: &dyn Container) -> Result<Service> {
        let Some((key, provider)) = self.providers.lookup(name) else {
            return match &self.ancestor {
                Some(ancestor) => ancestor.resolve_for(name, view),
                None => Err(BottleError::UnknownService(name.into())),
            };
        };

        let _chain = self.tracker.lock();
        let value = match self.cached(name) {
            Some(value) => {
                trace!(service = %key, container = %self.id, "cache hit");
                value
            }
            None => self.instantiate(key, provider, view)?,
        };

        if let Some(dependent) = self.tracker.current() {
            trace!(service = %key, dependent = %dependent.name(), "recording dependency");
            self.dependents
                .entry(key.clone())
                .or_default()
                .insert(dependent);
        }
        Ok(value)
    }

    fn tracker(&self) -> Arc<Tracker> {
        self.tracker.clone()
    }
}

impl fmt::Debug for Bottle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<&str> = self.providers.names().map(|name| &**name).collect();
        providers.sort_unstable();
        f.debug_struct("Bottle")
            .field("id", &self.id)
            .field("providers", &providers)
            .field("built", &self.list_built())
            .field("has_ancestor", &self.ancestor.is_some())
            .finish()
    }
}

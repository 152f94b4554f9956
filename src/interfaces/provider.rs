use std::any::{type_name, Any};
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::interfaces::container::{Container, Service, ServiceName};

type ProviderFn = dyn Fn(&dyn Container) -> anyhow::Result<Service> + Send + Sync;

/// Factory of a single service.
///
/// A provider is invoked with the merged view of the chain and may resolve any
/// other service from it; every service it reads is recorded as a dependency.
#[derive(Clone)]
pub struct Provider {
    func: Arc<ProviderFn>,
    output: &'static str,
}

impl Provider {
    /// Fallible provider.
    pub fn new<T, F>(func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |container: &dyn Container| -> anyhow::Result<Service> {
                Ok(Arc::new(func(container)?) as Service)
            }),
            output: type_name::<T>(),
        }
    }

    pub fn from_fn<T, F>(func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> T + Send + Sync + 'static,
    {
        Self::new(move |container| Ok(func(container)))
    }

    /// Provides a clone of `value` each time the service is (re)built.
    pub fn value<T>(value: T) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        Self::from_fn(move |_| value.clone())
    }

    /// Type name of the service this provider builds.
    pub fn output(&self) -> &'static str {
        self.output
    }

    pub(crate) fn instantiate(&self, container: &dyn Container) -> anyhow::Result<Service> {
        (self.func)(container)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("output", &format_args!("{}", self.output))
            .finish()
    }
}

/// The full set of providers of one container, fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct Providers {
    entries: HashMap<ServiceName, Provider>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `name`, replacing any previous one.
    pub fn with(mut self, name: impl Into<ServiceName>, provider: Provider) -> Self {
        self.insert(name, provider);
        self
    }

    pub fn insert(&mut self, name: impl Into<ServiceName>, provider: Provider) -> Option<Provider> {
        self.entries.insert(name.into(), provider)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &ServiceName> {
        self.entries.keys()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<(&ServiceName, &Provider)> {
        self.entries.get_key_value(name)
    }
}

impl<N: Into<ServiceName>> FromIterator<(N, Provider)> for Providers {
    fn from_iter<I: IntoIterator<Item = (N, Provider)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, p)| (name.into(), p)).collect(),
        }
    }
}

impl IntoIterator for Providers {
    type Item = (ServiceName, Provider);
    type IntoIter = hash_map::IntoIter<ServiceName, Provider>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_has_useful_debug_impl() {
        let provider = Provider::value(String::from("lager"));
        assert_eq!(provider.output(), "alloc::string::String");
        assert_eq!(
            "Provider { output: alloc::string::String }".to_string(),
            format!("{:?}", provider),
        );
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let providers = Providers::new()
            .with("beer", Provider::value(1u8))
            .with("beer", Provider::value(2u16));

        assert_eq!(providers.len(), 1);
        let (_, provider) = providers.lookup("beer").unwrap();
        assert_eq!(provider.output(), "u16");
    }

    #[test]
    fn collects_from_pairs() {
        let providers: Providers = vec![("water", Provider::value(())), ("hops", Provider::value(()))]
            .into_iter()
            .collect();

        assert!(providers.contains("water"));
        assert!(providers.contains("hops"));
        assert!(!providers.contains("malt"));
    }
}


use std::any::{type_name, Any};
use std::sync::Arc;

use crate::containers::tracking::Tracker;
use crate::error::{BottleError, Result};

/// Name a service is registered under.
pub type ServiceName = Arc<str>;

/// A built service, shared by every reader until it is evicted.
pub type Service = Arc<dyn Any + Send + Sync>;

/// The merged view of a container chain.
///
/// Providers receive this view when they are invoked and use it to reach any
/// service of the chain, including services owned by ancestors.
///
/// ```rust
/// use bottle::{Bottle, Container, Provider, Providers};
///
/// struct Water;
///
/// let bottle = Bottle::new(Providers::new().with("water", Provider::from_fn(|_| Water)));
/// assert!(bottle.has("water"));
/// assert!(bottle.list_built().is_empty());
///
/// let water = bottle.get::<Water>("water").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&water, &bottle.get::<Water>("water").unwrap()));
/// assert_eq!(bottle.list_built().len(), 1);
/// ```
pub trait Container: Send + Sync {
    /// Returns the service registered under `name`, building it on first access.
    fn resolve(&self, name: &str) -> Result<Service>;

    /// Whether some container of the chain provides `name`. Never builds anything.
    fn has(&self, name: &str) -> bool;

    /// Evicts the cached value of `name`.
    ///
    /// With `deep`, every value recorded as built from it is evicted as well.
    /// Deleting an unknown or unbuilt name is not an error.
    fn delete(&self, name: &str, deep: bool) -> bool;

    /// Names currently built in this container followed by the ancestor's.
    fn list_built(&self) -> Vec<ServiceName>;
}

impl<'a> dyn Container + 'a {
    /// Resolves `name` and downcasts it to `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.resolve(name)?
            .downcast::<T>()
            .map_err(|_| BottleError::TypeMismatch {
                name: name.into(),
                expected: type_name::<T>(),
            })
    }

    /// Deep delete, the default flavour of [`Container::delete`].
    pub fn remove(&self, name: &str) -> bool {
        self.delete(name, true)
    }
}

/// What a container needs from its ancestor.
pub trait ContainerHandle: Container {
    /// Resolves `name` on behalf of a descendant. Providers owned by this
    /// container are handed `view` rather than this container.
    fn resolve_for(&self, name: &str, view: &dyn Container) -> Result<Service>;

    /// The resolution stack shared by the chain.
    fn tracker(&self) -> Arc<Tracker>;
}

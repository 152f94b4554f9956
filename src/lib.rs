//! Lazy service container.
//!
//! A [`Bottle`] holds a fixed set of named [`Provider`]s. Each service is built
//! the first time it is resolved, cached, and shared until it is deleted.
//! Deleting a service also evicts everything that was built from it, so the
//! next read rebuilds a consistent graph.
//!
//! Bottles can be chained: a bottle delegates the names it does not provide to
//! its ancestor, and the ancestor's providers resolve their own dependencies
//! through the descendant's merged view.
//!
//! ```rust
//! use std::sync::Arc;
//! use bottle::{service_factory, Bottle, Container, Provider, Providers};
//!
//! struct Water;
//! struct Hops {
//!     water: Arc<Water>,
//! }
//! struct Beer {
//!     hops: Arc<Hops>,
//! }
//!
//! let cellar = Bottle::new(
//!     Providers::new()
//!         .with("water", Provider::from_fn(|_| Water))
//!         .with("hops", Provider::new(|c| Ok(Hops { water: c.get("water")? }))),
//! );
//! let brewery = Bottle::with_ancestor(
//!     Providers::new().with("beer", service_factory(|hops: Arc<Hops>| Beer { hops }, ["hops"])),
//!     cellar.clone(),
//! );
//!
//! let beer = brewery.get::<Beer>("beer").unwrap();
//! assert!(Arc::ptr_eq(&beer.hops.water, &cellar.get::<Water>("water").unwrap()));
//!
//! // Evicting hops evicts the beer brewed from it.
//! assert!(brewery.delete("hops", true));
//! assert_eq!(brewery.list_built().len(), 1);
//! ```

pub mod containers;
pub mod error;
pub mod function;
pub mod interfaces;

pub use containers::bottle::Bottle;
pub use containers::tracking::{ContainerId, Dependent, Tracker};
pub use error::{BottleError, Result};
pub use function::{service, service_factory, Function, Injectable, ServiceFactory};
pub use interfaces::container::{Container, ContainerHandle, Service, ServiceName};
pub use interfaces::provider::{Provider, Providers};

pub use bottle_derives::Injectable;

#[doc(hidden)]
pub use anyhow;

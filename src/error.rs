//! Errors raised by containers.

use thiserror::Error;

use crate::interfaces::container::ServiceName;

/// Errors surfaced by [`Container`](crate::Container) operations.
#[derive(Error, Debug)]
pub enum BottleError {
    /// No container in the chain provides the requested name.
    #[error("Unknown service \"{0}\"")]
    UnknownService(ServiceName),

    /// The service exists but holds a value of another type.
    #[error("service \"{name}\" is not a {expected}")]
    TypeMismatch {
        name: ServiceName,
        expected: &'static str,
    },

    /// The provider of `name` returned an error. Nothing was cached.
    #[error("provider for service \"{name}\" failed: {source}")]
    Provider {
        name: ServiceName,
        #[source]
        source: anyhow::Error,
    },
}

impl BottleError {
    /// Wraps a provider failure, passing container errors raised inside the
    /// provider through untouched.
    pub(crate) fn from_provider(name: &ServiceName, error: anyhow::Error) -> Self {
        match error.downcast::<BottleError>() {
            Ok(inner) => inner,
            Err(source) => BottleError::Provider {
                name: name.clone(),
                source,
            },
        }
    }

    /// Name of the service the error is about.
    pub fn service(&self) -> &str {
        match self {
            BottleError::UnknownService(name)
            | BottleError::TypeMismatch { name, .. }
            | BottleError::Provider { name, .. } => &**name,
        }
    }
}

pub type Result<T, E = BottleError> = std::result::Result<T, E>;

//! Error types for the layout engine

use thiserror::Error;

use super::config::ConfigError;
use super::extract::ContainerState;

/// Error type produced by the generic layout callback
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during layout computation
///
/// The graph must be discarded after any error: containers may have been
/// left half-processed.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Malformed sequence diagram
    #[error("invalid sequence diagram: {0}")]
    Structure(#[from] StructureError),

    /// Configuration rejected before any geometry was computed
    #[error("invalid layout config: {0}")]
    Config(#[from] ConfigError),

    /// The injected generic layout engine failed
    #[error("generic layout failed: {0}")]
    Generic(#[source] BoxError),
}

/// Malformed container membership or an unfinished pipeline
#[derive(Debug, Error, PartialEq)]
pub enum StructureError {
    #[error("sequence diagram '{container}' has no actors")]
    NoActors { container: String },

    /// An edge with exactly one endpoint inside the container
    #[error("edge '{edge}' crosses the boundary of sequence diagram '{container}'")]
    AmbiguousMembership { container: String, edge: String },

    #[error("sequence diagram '{nested}' cannot be an actor of '{container}'")]
    ContainerAsActor { container: String, nested: String },

    /// A message touching a nested diagram box or reaching into one
    #[error("message '{edge}' in sequence diagram '{container}' must connect its own actors or spans")]
    InvalidMessageEndpoint { container: String, edge: String },

    #[error("sequence diagram '{container}' stopped at state {state}")]
    Unresolved {
        container: String,
        state: ContainerState,
    },
}

impl StructureError {
    pub fn no_actors(container: impl Into<String>) -> Self {
        Self::NoActors {
            container: container.into(),
        }
    }

    pub fn ambiguous(container: impl Into<String>, edge: impl Into<String>) -> Self {
        Self::AmbiguousMembership {
            container: container.into(),
            edge: edge.into(),
        }
    }

    pub fn container_as_actor(container: impl Into<String>, nested: impl Into<String>) -> Self {
        Self::ContainerAsActor {
            container: container.into(),
            nested: nested.into(),
        }
    }

    pub fn invalid_endpoint(container: impl Into<String>, edge: impl Into<String>) -> Self {
        Self::InvalidMessageEndpoint {
            container: container.into(),
            edge: edge.into(),
        }
    }

    pub fn unresolved(container: impl Into<String>, state: ContainerState) -> Self {
        Self::Unresolved {
            container: container.into(),
            state,
        }
    }
}

//! Logical name → service handle registry

use super::ServiceHandle;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Name resolution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Nothing live is registered under the name
    #[error("No service registered as '{0}'")]
    NotFound(String),

    /// Directory did not answer within the deadline
    #[error("Resolving '{0}' timed out")]
    Timeout(String),

    /// Registered service speaks a different answer type
    #[error("Service '{0}' has an unexpected type")]
    TypeMismatch(String),
}

/// Shared directory of running services
#[derive(Clone, Default)]
pub struct ServiceDirectory {
    entries: Arc<RwLock<HashMap<&'static str, Box<dyn Any + Send + Sync>>>>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the service under `name`
    pub async fn register<T: Send + 'static>(&self, name: &'static str, handle: ServiceHandle<T>) {
        let replaced = self
            .entries
            .write()
            .await
            .insert(name, Box::new(handle))
            .is_some();
        if replaced {
            warn!("Service '{}' re-registered, previous handle replaced", name);
        } else {
            debug!("Service '{}' registered", name);
        }
    }

    /// Remove `name`; returns whether it was registered
    pub async fn deregister(&self, name: &str) -> bool {
        self.entries.write().await.remove(name).is_some()
    }

    /// Resolve `name` to a live handle within `timeout`
    pub async fn resolve<T: Send + 'static>(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<ServiceHandle<T>, ResolveError> {
        let entries = tokio::time::timeout(timeout, self.entries.read())
            .await
            .map_err(|_| ResolveError::Timeout(name.to_string()))?;

        let entry = entries
            .get(name)
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;

        let handle = entry
            .downcast_ref::<ServiceHandle<T>>()
            .ok_or_else(|| ResolveError::TypeMismatch(name.to_string()))?;

        if handle.is_closed() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        Ok(handle.clone())
    }
}

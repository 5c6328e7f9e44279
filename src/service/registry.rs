use crate::error::{constants, ProtocolError, Result};
use crate::protocol::PubSubProtocol;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Service properties used for discovery
pub type Properties = HashMap<String, String>;

/// Identifier handed out on registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(u64);

impl ServiceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Registration {
    name: String,
    properties: Properties,
    service: Arc<dyn PubSubProtocol>,
}

/// In-process registry of protocol services, discoverable by name and
/// properties. Clones share the same underlying registry.
#[derive(Clone)]
pub struct ServiceRegistry {
    services: Arc<RwLock<HashMap<ServiceId, Registration>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn register(
        &self,
        name: &str,
        properties: Properties,
        service: Arc<dyn PubSubProtocol>,
    ) -> Result<ServiceId> {
        let mut services = self
            .services
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;

        let id = ServiceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        services.insert(
            id,
            Registration {
                name: name.to_string(),
                properties,
                service,
            },
        );
        debug!(%id, name, "service registered");
        Ok(id)
    }

    pub fn unregister(&self, id: ServiceId) -> Result<()> {
        let mut services = self
            .services
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;

        let reg = services
            .remove(&id)
            .ok_or(ProtocolError::ServiceNotFound(id))?;
        debug!(%id, name = %reg.name, "service unregistered");
        Ok(())
    }

    /// Find the oldest service registered under `name` whose property `key`
    /// equals `value`.
    pub fn find(
        &self,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<Arc<dyn PubSubProtocol>>> {
        let services = self
            .services
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))?;

        Ok(services
            .iter()
            .filter(|(_, reg)| {
                reg.name == name && reg.properties.get(key).is_some_and(|v| v == value)
            })
            .min_by_key(|(id, _)| **id)
            .map(|(_, reg)| Arc::clone(&reg.service)))
    }

    pub fn properties(&self, id: ServiceId) -> Result<Option<Properties>> {
        let services = self
            .services
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))?;

        Ok(services.get(&id).map(|reg| reg.properties.clone()))
    }

    /// Number of registered services. Fails if a writer panicked while
    /// holding the registry lock.
    pub fn len(&self) -> Result<usize> {
        self.services
            .read()
            .map(|services| services.len())
            .map_err(|_| ProtocolError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

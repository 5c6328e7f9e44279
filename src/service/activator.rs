use crate::config::{ServiceConfig, PROTOCOL_TYPE_KEY};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::HeaderlessProtocol;
use crate::service::registry::{Properties, ServiceId, ServiceRegistry};
use std::sync::Arc;
use tracing::{info, instrument};

/// Owns the registration of the header-less protocol service.
///
/// `start` registers a fresh protocol under the configured protocol type and
/// `stop` removes it again. The activator is the only holder of the service
/// id, so nothing else can unregister it behind its back.
#[derive(Debug, Default)]
pub struct ProtocolActivator {
    config: ServiceConfig,
    service_id: Option<ServiceId>,
}

impl ProtocolActivator {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            service_id: None,
        }
    }

    #[instrument(skip_all, fields(protocol_type = %self.config.protocol_type))]
    pub fn start(&mut self, registry: &ServiceRegistry) -> Result<ServiceId> {
        if self.service_id.is_some() {
            return Err(ProtocolError::IllegalArgument(
                constants::ERR_ALREADY_STARTED.to_string(),
            ));
        }

        let properties = Properties::from([(
            PROTOCOL_TYPE_KEY.to_string(),
            self.config.protocol_type.clone(),
        )]);
        let id = registry.register(
            &self.config.service_name,
            properties,
            Arc::new(HeaderlessProtocol::new()),
        )?;

        self.service_id = Some(id);
        info!(%id, service = %self.config.service_name, "wire protocol started");
        Ok(id)
    }

    /// Unregister the service. Stopping an activator that is not running is
    /// a no-op.
    #[instrument(skip_all, fields(protocol_type = %self.config.protocol_type))]
    pub fn stop(&mut self, registry: &ServiceRegistry) -> Result<()> {
        if let Some(id) = self.service_id.take() {
            registry.unregister(id)?;
            info!(%id, "wire protocol stopped");
        }
        Ok(())
    }

    pub fn service_id(&self) -> Option<ServiceId> {
        self.service_id
    }

    pub fn is_started(&self) -> bool {
        self.service_id.is_some()
    }
}

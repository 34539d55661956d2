use std::sync::Arc;

use log::{debug, error};

use super::{
    bus::{ObjectRegistry, RegisterError},
    dispatch::Dispatcher,
    host::Host,
};
use crate::interface::OBJECT_PATH;

#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error("D-Bus connection is not available")]
    ConnectionUnavailable,
    #[error("Failed to register {OBJECT_PATH}")]
    RegistrationFailed(#[source] RegisterError),
}

/// Keeps the commit object bound to [`OBJECT_PATH`] on a shared connection
/// for as long as it is alive
#[derive(Debug)]
pub struct Service<B: ObjectRegistry> {
    bus: Option<B>,
}

impl<B: ObjectRegistry> Service<B> {
    /// Bind a dispatcher committing into `host` on `bus`.  No registration is
    /// left behind on failure.
    pub fn activate<H: Host>(bus: Option<B>, host: H) -> Result<Self, ActivateError> {
        let Some(bus) = bus else {
            error!("D-Bus is not initialized");
            return Err(ActivateError::ConnectionUnavailable);
        };

        if let Err(e) = bus.register_object_path(OBJECT_PATH, Arc::new(Dispatcher::new(host))) {
            error!("Failed to register {OBJECT_PATH}: {e}");
            return Err(ActivateError::RegistrationFailed(e));
        }

        Ok(Self { bus: Some(bus) })
    }

    #[inline]
    pub fn is_active(&self) -> bool { self.bus.is_some() }

    /// Release [`OBJECT_PATH`].  Does nothing if already deactivated.
    pub fn deactivate(&mut self) {
        let Some(bus) = self.bus.take() else { return };

        if !bus.unregister_object_path(OBJECT_PATH) {
            debug!("{OBJECT_PATH} was already unregistered");
        }
    }
}

impl<B: ObjectRegistry> Drop for Service<B> {
    fn drop(&mut self) { self.deactivate(); }
}

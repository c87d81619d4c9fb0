//! Routing ability movement requests to the host.

use std::sync::{Arc, Mutex, PoisonError};

use gameplay_core::{EntityId, MovementRequest};

/// Applies movement on behalf of abilities. Implemented by the embedding game.
pub trait MovementHost {
    fn apply(&mut self, entity: EntityId, ability: &str, request: MovementRequest);
}

/// Records every request in order; useful for tools and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingMovementHost {
    requests: Vec<(EntityId, String, MovementRequest)>,
}

impl RecordingMovementHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[(EntityId, String, MovementRequest)] {
        &self.requests
    }

    pub fn take(&mut self) -> Vec<(EntityId, String, MovementRequest)> {
        std::mem::take(&mut self.requests)
    }
}

impl MovementHost for RecordingMovementHost {
    fn apply(&mut self, entity: EntityId, ability: &str, request: MovementRequest) {
        self.requests.push((entity, ability.to_string(), request));
    }
}

/// Lets the caller keep a handle on a host it gave to the simulation.
impl<H: MovementHost> MovementHost for Arc<Mutex<H>> {
    fn apply(&mut self, entity: EntityId, ability: &str, request: MovementRequest) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(entity, ability, request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_host_records_through_handle() {
        let shared = Arc::new(Mutex::new(RecordingMovementHost::new()));
        let mut host = Arc::clone(&shared);
        host.apply(EntityId(3), "Dash", MovementRequest::Stop);

        let recorded = shared.lock().unwrap().take();
        assert_eq!(recorded, vec![(EntityId(3), "Dash".to_string(), MovementRequest::Stop)]);
    }
}

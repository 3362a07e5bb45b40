mod sse;
pub mod state_machine;
pub mod transitions;

use std::sync::Arc;

use crate::{dao::racha_store::RachaStore, gate::RequestGate};

pub use self::sse::SseHub;

/// Cheaply clonable handle passed to every handler.
pub type SharedState = Arc<AppState>;

const EVENTS_CAPACITY: usize = 32;

/// Process-wide state: the store handle, the gate and the live event hub.
///
/// Nothing here caches domain data; every read goes to the store.
pub struct AppState {
    store: Arc<dyn RachaStore>,
    gate: RequestGate,
    events: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn RachaStore>, gate: RequestGate) -> SharedState {
        Arc::new(Self {
            store,
            gate,
            events: SseHub::new(EVENTS_CAPACITY),
        })
    }

    /// Handle to the backing store.
    pub fn store(&self) -> Arc<dyn RachaStore> {
        Arc::clone(&self.store)
    }

    /// Request gate applied to the application routes.
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Hub used by the `/rachas/events` stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }
}

//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request profile.

use crate::config::Config;
use roadmap_core::{
    library::RoadmapLibrary,
    ports::{KeyValueStore, RoadmapGenerationService},
};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub config: Arc<Config>,
    /// `None` when no generation provider is configured.
    pub generator: Option<Arc<dyn RoadmapGenerationService>>,
}

impl AppState {
    /// The saved-roadmap collection the given profile works on.
    pub fn library(&self, profile: &Profile) -> RoadmapLibrary {
        match profile.0 {
            Some(user_id) => RoadmapLibrary::for_profile(self.store.clone(), &user_id.to_string()),
            None => RoadmapLibrary::new(self.store.clone()),
        }
    }
}

//=========================================================================================
// Profile (Specific to One Request)
//=========================================================================================

/// The user a request acts for, taken from the `x-user-id` header.
/// Requests without the header use the shared default profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Profile(pub Option<Uuid>);

use crate::session::SessionDeps;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Collaborators handed to every session
    pub deps: SessionDeps,
}

impl AppState {
    pub fn new(deps: SessionDeps) -> Self {
        Self { deps }
    }
}

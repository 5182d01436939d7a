pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::library::StoryLibrary;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub library: StoryLibrary,
}

impl AppState {
    pub fn new(library: StoryLibrary) -> Self {
        Self { library }
    }
}

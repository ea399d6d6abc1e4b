use std::sync::Arc;

use derive_new::new;

use crate::auth::Authenticator;
use crate::database::VideoRepository;

/// Shared state handed to every handler.
#[derive(Clone, new)]
pub struct App {
    pub repository: Arc<dyn VideoRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl App {
    pub fn repository(&self) -> &dyn VideoRepository {
        self.repository.as_ref()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

pub fn create_app(repository: impl VideoRepository, authenticator: Authenticator) -> App {
    App {
        repository: Arc::new(repository),
        authenticator: Arc::new(authenticator),
    }
}

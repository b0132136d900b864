use crate::client::ApiClient;
use crate::config::Config;
use crate::session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: ApiClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            client: ApiClient::new(&config),
            config: Arc::new(config),
            sessions: SessionStore::new(),
        }
    }
}

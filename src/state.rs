use crate::config::Config;
use crate::gateway::{Gateway, SessionContext};
use crate::refresh::{DashboardSnapshot, GenerationCounter};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Gateway,
    pub dashboard: Arc<Mutex<DashboardSnapshot>>,
    pub generations: Arc<GenerationCounter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let session = match &config.api_token {
            Some(token) => SessionContext::with_token(token.clone()),
            None => SessionContext::anonymous(),
        };
        Self {
            gateway: Gateway::new(config.backend_url.clone(), session),
            config: Arc::new(config),
            dashboard: Arc::new(Mutex::new(DashboardSnapshot::default())),
            generations: Arc::new(GenerationCounter::default()),
        }
    }
}

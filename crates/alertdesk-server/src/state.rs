use crate::config::ServerConfig;
use crate::tools::AlertToolbox;
use alertdesk_alert::{AlertLifecycle, AlertQueryEngine};
use alertdesk_storage::AlertStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AlertStore>,
    pub query: AlertQueryEngine,
    pub lifecycle: AlertLifecycle,
    pub tools: AlertToolbox,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wires the query engine, lifecycle and tool dispatcher around one
    /// shared store.
    pub fn new(store: Arc<dyn AlertStore>, config: ServerConfig) -> Self {
        let query = AlertQueryEngine::new(store.clone());
        let lifecycle = AlertLifecycle::new(store.clone());
        let tools = AlertToolbox::new(query.clone(), lifecycle.clone());
        Self {
            store,
            query,
            lifecycle,
            tools,
            start_time: Utc::now(),
            config: Arc::new(config),
        }
    }
}

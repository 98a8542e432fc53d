use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtValidator;
use crate::canned::{create_canned_response_backend, CannedResponseBackend};
use crate::config::Settings;
use crate::postgres::PostgresPool;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt_validator: Arc<JwtValidator>,
    pub store: Arc<dyn CannedResponseBackend>,
    pub postgres_pool: Option<Arc<PostgresPool>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, postgres_pool: Option<Arc<PostgresPool>>) -> Self {
        let jwt_validator = Arc::new(JwtValidator::new(&settings.jwt));
        let store = create_canned_response_backend(&settings.storage, postgres_pool.clone());

        Self {
            settings: Arc::new(settings),
            jwt_validator,
            store,
            postgres_pool,
            start_time: Instant::now(),
        }
    }
}

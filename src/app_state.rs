use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config;
use crate::modules::analytics::AnalyticsService;
use crate::modules::dashboard::DashboardService;
use crate::modules::scheduling::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub env: config::Config,
    pub sessions: SessionService,
    pub analytics: AnalyticsService,
    pub dashboards: DashboardService,
}

impl AppState {
    pub fn new(db: SqlitePool, env: config::Config) -> Self {
        Self::with_clock(db, env, Arc::new(SystemClock))
    }

    /// Wire every service to the same pool, clock and rules.
    pub fn with_clock(db: SqlitePool, env: config::Config, clock: Arc<dyn Clock>) -> Self {
        let rules = env.scheduling.clone();
        Self {
            sessions: SessionService::new(db.clone(), clock.clone(), rules.clone()),
            analytics: AnalyticsService::new(db.clone(), clock.clone(), rules.clone()),
            dashboards: DashboardService::new(db.clone(), clock, rules),
            db,
            env,
        }
    }

    pub async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.db).await {
            Ok(_) => true,
            Err(e) => {
                info!("Database health check failed: {}", e);
                false
            }
        }
    }
}

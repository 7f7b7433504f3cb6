use anyhow::Context;
use dotenv::dotenv;
use serde_json::json;
use tracing::{info, warn};

use drivingschool_backend::config;
use drivingschool_backend::db;
use drivingschool_backend::db::models::{DashboardRole, ReportKind};
use drivingschool_backend::telemetry::{init_telemetry, TelemetryConfig};
use drivingschool_backend::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init().context("Failed to load configuration")?;

    let telemetry = init_telemetry(Some(TelemetryConfig::for_app(&config.app)))
        .await
        .context("Failed to initialize telemetry")?;

    let pool = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;
    let state = AppState::new(pool, config.clone());

    if !state.health_check().await {
        warn!("Database did not answer the health check");
    }

    let statistics = state.sessions.session_statistics().await?;
    info!(
        app = %config.app.name,
        environment = config.app.environment.as_str(),
        total = statistics.total_sessions,
        scheduled = statistics.scheduled_sessions,
        completed = statistics.completed_sessions,
        "Session store loaded"
    );

    // Report slugs on the command line narrow the output; none means all.
    let requested = std::env::args()
        .skip(1)
        .map(|slug| {
            ReportKind::from_slug(&slug).with_context(|| format!("Unknown report: {}", slug))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let kinds = if requested.is_empty() {
        ReportKind::ALL.to_vec()
    } else {
        requested
    };

    let mut reports = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let output = state.analytics.run_report(kind).await?;
        reports.push(json!({ "title": kind.title(), "output": output }));
    }
    let dashboard = state
        .dashboards
        .get_dashboard_stats(DashboardRole::Admin)
        .await?;

    let summary = json!({
        "statistics": statistics,
        "reports": reports,
        "dashboard": dashboard,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to render summary")?
    );

    telemetry.shutdown().await?;
    Ok(())
}

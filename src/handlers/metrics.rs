use axum::{extract::State, Json};

use crate::{errors::ServiceError, reports::AdminMetrics, AppState};

/// `GET /api/admin/metrics`
pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<AdminMetrics>, ServiceError> {
    let metrics = state.services.metrics.dashboard().await?;
    Ok(Json(metrics))
}

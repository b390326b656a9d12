use std::sync::Arc;

use super::extract::ApiQuery;
use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use bonbast_market_data::{
    models::params::{previous_day, resolve_day},
    ArchiveSnapshot, DateRangeResult,
};

#[derive(serde::Deserialize)]
struct ArchiveQuery {
    /// `YYYY-MM-DD`, defaults to yesterday
    date: Option<String>,
}

#[derive(serde::Deserialize)]
struct ArchiveRangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn get_archive(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<ArchiveQuery>,
) -> ApiResult<Json<ArchiveSnapshot>> {
    let day = resolve_day(q.date.as_deref(), previous_day(state.today()))?;
    let snapshot = state.rates_service.archive(day).await?;
    Ok(Json(snapshot))
}

/// Both bounds default to yesterday; a reversed range is a 422.
async fn get_archive_range(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<ArchiveRangeQuery>,
) -> ApiResult<Json<DateRangeResult>> {
    let yesterday = previous_day(state.today());
    let start = resolve_day(q.start_date.as_deref(), yesterday)?;
    let end = resolve_day(q.end_date.as_deref(), yesterday)?;
    let range = state.rates_service.archive_range(start, end).await?;
    Ok(Json(range))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/archive", get(get_archive))
        .route("/archive/", get(get_archive))
        .route("/archive/range", get(get_archive_range))
}

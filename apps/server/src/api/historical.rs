use std::sync::Arc;

use super::extract::{ApiPath, ApiQuery};
use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use bonbast_market_data::{
    models::params::{normalize_currency, resolve_month},
    HistoricalSeries,
};

#[derive(serde::Deserialize)]
struct HistoricalQuery {
    /// `YYYY-MM`, defaults to the current month
    date: Option<String>,
}

/// One currency's daily quotes across a month.
async fn get_historical(
    ApiPath(currency): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<HistoricalQuery>,
) -> ApiResult<Json<HistoricalSeries>> {
    let month = resolve_month(q.date.as_deref(), state.today())?;
    let currency = normalize_currency(&currency)?;
    let series = state.rates_service.historical(&currency, month).await?;
    Ok(Json(series))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/historical/{currency}", get(get_historical))
}

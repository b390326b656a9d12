use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use bonbast_market_data::{Board, CurrencyTable};

async fn get_latest_currencies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CurrencyTable>> {
    let table = state.rates_service.latest(Board::Currencies).await?;
    Ok(Json(table))
}

async fn get_latest_coins(State(state): State<Arc<AppState>>) -> ApiResult<Json<CurrencyTable>> {
    let table = state.rates_service.latest(Board::Coins).await?;
    Ok(Json(table))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/latest", get(get_latest_currencies))
        .route("/latest/currencies", get(get_latest_currencies))
        .route("/latest/coins", get(get_latest_coins))
}

use crate::dashboard::{
    account_summary, balance_chart, destinations_chart, flight_history, stats_charts,
    traveller_charts,
};
use crate::errors::AppError;
use crate::models::{
    AccountSummary, BalanceResponse, ChartData, FlightView, StatsResponse, TravellerChartsResponse,
};
use crate::state::AppState;
use crate::storage::{load_account, load_daily_stats, load_transactions, load_trips};
use crate::ui::{render_index, ViewContent};
use crate::views::{View, ViewState};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub view: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let view_state = ViewState::from_query(query.view.as_deref())?;
    let (band, number) = (state.config.band, state.config.number);
    info!("rendering {} view for traveller {band}/{number}", view_state.active.name());

    let dir = state.data_dir();
    let account = load_account(dir, band, number).await?;
    let summary = account_summary(&account)?;
    let content = match view_state.active {
        View::Account => {
            let trips = load_trips(dir, band, number).await?;
            let transactions = load_transactions(dir, band, number).await?;
            ViewContent::Account {
                charts: traveller_charts(&trips, today())?,
                balance: balance_chart(&account, &transactions)?,
            }
        }
        View::Statistics => {
            let rows = load_daily_stats(dir).await?;
            ViewContent::Statistics(stats_charts(&rows)?)
        }
        View::History => {
            let trips = load_trips(dir, band, number).await?;
            ViewContent::History(flight_history(&trips)?)
        }
        View::Planning => {
            let trips = load_trips(dir, band, number).await?;
            ViewContent::Planning(destinations_chart(&trips))
        }
    };

    Ok(Html(render_index(&view_state, &summary, &content)))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let rows = load_daily_stats(state.data_dir()).await?;
    debug!("building stats from {} rows", rows.len());
    Ok(Json(stats_charts(&rows)?))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path((band, number)): Path<(u64, u64)>,
) -> Result<Json<AccountSummary>, AppError> {
    let account = load_account(state.data_dir(), band, number).await?;
    Ok(Json(account_summary(&account)?))
}

pub async fn get_charts(
    State(state): State<AppState>,
    Path((band, number)): Path<(u64, u64)>,
) -> Result<Json<TravellerChartsResponse>, AppError> {
    let trips = load_trips(state.data_dir(), band, number).await?;
    Ok(Json(traveller_charts(&trips, today())?))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path((band, number)): Path<(u64, u64)>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = load_account(state.data_dir(), band, number).await?;
    let transactions = load_transactions(state.data_dir(), band, number).await?;
    debug!("reconstructing balance from {} transactions", transactions.len());
    Ok(Json(balance_chart(&account, &transactions)?))
}

pub async fn get_destinations(
    State(state): State<AppState>,
    Path((band, number)): Path<(u64, u64)>,
) -> Result<Json<ChartData>, AppError> {
    let trips = load_trips(state.data_dir(), band, number).await?;
    Ok(Json(destinations_chart(&trips)))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path((band, number)): Path<(u64, u64)>,
) -> Result<Json<Vec<FlightView>>, AppError> {
    let trips = load_trips(state.data_dir(), band, number).await?;
    Ok(Json(flight_history(&trips)?))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

//! Route handlers

use crate::error::AppError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use forecast_agent_core::pipeline::format_forecast;
use forecast_agent_core::{normalize_input, PipelineInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PipelineRequest {
    pub input_data: Value,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    pub demand_forecast: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchParams {
    pub item_name: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub input_item: String,
    pub selected_item: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(serde_json::json!({ "message": "Demand Forecast Agent API" }))
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn run_pipeline(
    State(state): State<AppState>,
    payload: Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<PipelineResponse>, AppError> {
    let Json(request) = payload?;
    let input = PipelineInput::from_value(&request.input_data)?;

    let result = state.pipeline.run(&input).await?;
    Ok(Json(PipelineResponse {
        demand_forecast: result.demand_forecast,
    }))
}

pub async fn normalize(
    payload: Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, AppError> {
    let Json(request) = payload?;
    let input = PipelineInput::from_value(&request.input_data)?;
    Ok(Json(NormalizeResponse {
        items: normalize_input(&input),
    }))
}

pub async fn match_item(
    State(state): State<AppState>,
    params: Result<Query<MatchParams>, QueryRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let Query(params) = params?;
    let item = params.item_name.trim();
    if item.is_empty() {
        return Err(AppError::BadRequest("item_name must not be empty".to_string()));
    }

    let selection = state.pipeline.match_item(item).await;
    Ok(Json(MatchResponse {
        input_item: item.to_string(),
        selected_item: selection.into_matched(),
    }))
}

pub async fn forecast(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> Result<String, AppError> {
    let record = state.pipeline.forecast(&item).await?;
    Ok(format_forecast(&item, record.as_ref()))
}

//! Map generation endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    Json,
};
use pm25_common::{DateRange, Pm25Error, Pm25Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Body of `POST /generate-map/`, or the query of `GET /generate-map/`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct MapRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl MapRequest {
    pub fn date_range(&self) -> Pm25Result<DateRange> {
        let start = self
            .start_date
            .as_deref()
            .ok_or_else(|| Pm25Error::MissingParameter("start_date".to_string()))?;
        let end = self
            .end_date
            .as_deref()
            .ok_or_else(|| Pm25Error::MissingParameter("end_date".to_string()))?;
        Ok(DateRange::parse(start, end)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapResponse {
    pub message: String,
    pub image_url: String,
}

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Welcome to the PM25 Prediction API!" }))
}

/// POST /generate-map/
pub async fn generate_map_post(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<MapRequest>, JsonRejection>,
) -> Result<Json<MapResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| malformed("body", rejection.body_text()))?;
    generate(&state, request).await
}

/// GET /generate-map/?start_date=..&end_date=..
pub async fn generate_map_get(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<MapRequest>, QueryRejection>,
) -> Result<Json<MapResponse>, ApiError> {
    let Query(request) = query.map_err(|rejection| malformed("query", rejection.body_text()))?;
    generate(&state, request).await
}

/// Extractor rejections still answer with the `{"error", "kind"}` body.
fn malformed(param: &str, message: String) -> ApiError {
    ApiError(Pm25Error::InvalidParameter {
        param: param.to_string(),
        message,
    })
}

async fn generate(state: &AppState, request: MapRequest) -> Result<Json<MapResponse>, ApiError> {
    let range = request.date_range()?;
    info!(start = %range.start, end = %range.end, "Map requested");

    let result = state.pipeline.generate_map(range).await?;
    metrics::record_request("success");

    Ok(Json(MapResponse {
        message: "Map generated successfully".to_string(),
        image_url: result.image_url,
    }))
}

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::metas::MetaRecord;
use crate::server::error::ApiError;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
pub struct InitialResultSetRequest {
    pub terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsearchResultSetRequest {
    #[serde(default)]
    pub previous_results: Vec<String>,
    pub terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultMetasRequest {
    pub results: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateResultRequest {
    pub result: String,
}

#[tracing::instrument(skip_all)]
pub(crate) async fn initial_result_set(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<InitialResultSetRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let results = state.provider.get_initial_result_set(request.terms).await?;
    Ok(Json(results))
}

#[tracing::instrument(skip_all)]
pub(crate) async fn subsearch_result_set(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SubsearchResultSetRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let results = state
        .provider
        .get_subsearch_result_set(request.previous_results, request.terms)
        .await?;
    Ok(Json(results))
}

#[tracing::instrument(skip_all)]
pub(crate) async fn result_metas(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ResultMetasRequest>,
) -> Result<Json<Vec<MetaRecord>>, ApiError> {
    let records = state.provider.get_result_metas(request.results).await?;
    Ok(Json(records.iter().map(|record| record.as_ref().clone()).collect()))
}

pub(crate) async fn activate_result(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ActivateResultRequest>,
) -> Result<StatusCode, ApiError> {
    state.provider.activate_result(request.result)?;
    Ok(StatusCode::NO_CONTENT)
}

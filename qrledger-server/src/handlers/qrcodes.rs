use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qrledger_model::{
    CreateRecordResponse, ListQuery, NewQrRecord, QrRecord, QrRecordId,
    RecordPage, RegistryStats, VerifyOutcome, VerifyRequest,
    api::CREATED_MESSAGE,
};
use tracing::debug;

use crate::{AppResult, AppState};

/// `GET /api/qrcodes/`: a bare array, or `{count, results}` when paginated.
pub async fn list_qrcodes(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let registry = state.registry();
    let records = registry.list(query.limit, query.offset).await?;

    if query.is_paginated() {
        let count = registry.count().await?;
        return Ok(Json(RecordPage {
            count,
            results: records,
        })
        .into_response());
    }

    Ok(Json(records).into_response())
}

pub async fn create_qrcode(
    State(state): State<AppState>,
    payload: Result<Json<NewQrRecord>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreateRecordResponse>)> {
    let Json(input) = payload?;
    let record = state.registry().create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            message: CREATED_MESSAGE.to_string(),
            qr_code: record,
        }),
    ))
}

pub async fn get_qrcode(
    State(state): State<AppState>,
    id: Result<Path<QrRecordId>, PathRejection>,
) -> AppResult<Json<QrRecord>> {
    let Path(id) = id?;
    Ok(Json(state.registry().get(id).await?))
}

pub async fn delete_qrcode(
    State(state): State<AppState>,
    id: Result<Path<QrRecordId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.registry().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_qrcode(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<VerifyOutcome>> {
    let Json(request) = payload?;
    let outcome = state.registry().verify(&request.content).await?;
    debug!(found = outcome.found, "verify request handled");
    Ok(Json(outcome))
}

pub async fn qrcode_stats(
    State(state): State<AppState>,
) -> AppResult<Json<RegistryStats>> {
    Ok(Json(state.registry().stats().await?))
}

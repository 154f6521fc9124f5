use std::sync::Arc;

use auth::Identity;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use log::debug;
use serde_json::Value;
use tokio::task;

use crate::{
    AdmissionService, ApiErr, BatchResponse, HealthReport, LoginGrant, LoginRequest,
    PredictionResponse, Result, batch_students,
};

pub async fn login(
    State(service): State<Arc<AdmissionService>>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginGrant>> {
    let Json(request) = body.map_err(bad_body)?;
    service.login(&request).map(Json)
}

pub async fn predict(
    State(service): State<Arc<AdmissionService>>,
    Extension(identity): Extension<Identity>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(body) = body.map_err(bad_body)?;
    debug!("prediction requested by {}", identity.username);
    service.predict(&body).map(Json)
}

pub async fn predict_batch(
    State(service): State<Arc<AdmissionService>>,
    Extension(identity): Extension<Identity>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchResponse>> {
    let Json(body) = body.map_err(bad_body)?;
    debug!("batch prediction requested by {}", identity.username);

    // Batches fan out on the rayon pool, off the async workers.
    let response = task::spawn_blocking(move || {
        let students = batch_students(&body)?;
        service.predict_batch(students)
    })
    .await
    .map_err(|e| ApiErr::Internal(format!("batch task failed: {e}")))??;

    Ok(Json(response))
}

pub async fn health(State(service): State<Arc<AdmissionService>>) -> Json<HealthReport> {
    Json(service.health())
}

fn bad_body(rejection: JsonRejection) -> ApiErr {
    ApiErr::BadRequest(rejection.body_text())
}

use std::sync::Arc;

use auth::AuthErr;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{AdmissionService, ApiErr, Result};

/// Rejects requests without a valid bearer token.
///
/// The verified `Identity` is stored in the request extensions.
pub async fn require_auth(
    State(service): State<Arc<AdmissionService>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| ApiErr::Auth(AuthErr::TokenMalformed)))
        .transpose()?;

    let identity = service.authorize(header)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

//! Development-only exposure of server error detail.
//!
//! [`crate::error::AppError`] hides the cause of a 500 behind a generic
//! message and attaches the real text as an [`ErrorDetail`] extension. In
//! development this middleware swaps that text into the body.

use axum::{
    Json,
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::ErrorDetail;

pub async fn expose_error_detail(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = Json(json!({ "success": false, "message": detail }));
    (parts, body).into_response()
}

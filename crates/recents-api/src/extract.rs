use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` extractor whose rejections use the API error body with a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

//! # メトリクスハンドラ
//!
//! `GET /metrics` で Prometheus のテキスト形式を返す。

use std::sync::Arc;

use axum::{
   extract::State,
   http::{StatusCode, header},
   response::IntoResponse,
};

use crate::{error::ApiError, metrics::Metrics};

/// Prometheus テキスト形式の Content-Type
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub async fn export_metrics(
   State(metrics): State<Arc<Metrics>>,
) -> Result<impl IntoResponse, ApiError> {
   let body = metrics
      .render()
      .map_err(|e| ApiError::Internal(format!("メトリクスのエンコードに失敗: {e}")))?;

   Ok((
      StatusCode::OK,
      [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
      body,
   ))
}

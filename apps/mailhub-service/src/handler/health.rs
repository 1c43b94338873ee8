//! # ヘルスチェックハンドラ
//!
//! - `/health` - Liveness Check（常に `{"status":"OK"}` を返す）
//! - `/health/ready` - Readiness Check（PostgreSQL への疎通を確認）
//!
//! レスポンス型は [`mailhub_shared::HealthResponse`] / [`mailhub_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use mailhub_infra::db;
use mailhub_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
use sqlx::PgPool;

/// 依存先チェックのタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness Check
pub async fn health_check() -> Json<HealthResponse> {
   Json(HealthResponse::ok())
}

/// Readiness Check 用の State
pub struct ReadinessState {
   pub pool: PgPool,
}

/// Readiness Check
///
/// データベースに到達できれば 200、できなければ 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
   let mut checks = HashMap::new();
   checks.insert("database".to_string(), check_database(&state.pool).await);

   let response = ReadinessResponse::from_checks(checks);
   let status = match response.status {
      ReadinessStatus::Ready => StatusCode::OK,
      ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
   };

   (status, Json(response))
}

async fn check_database(pool: &PgPool) -> CheckStatus {
   match tokio::time::timeout(CHECK_TIMEOUT, db::ping(pool)).await {
      Ok(Ok(())) => CheckStatus::Ok,
      Ok(Err(e)) => {
         tracing::warn!(error = %e, "readiness check: database ping failed");
         CheckStatus::Error
      }
      Err(_) => {
         tracing::warn!("readiness check: database check timed out");
         CheckStatus::Error
      }
   }
}

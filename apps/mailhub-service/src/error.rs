//! # Mailhub Service エラー定義
//!
//! ハンドラ・ユースケースで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスボディはすべて `{"error": "<message>"}` の形に揃える。
//! 500 系は詳細をログにだけ出し、クライアントには汎用メッセージを返す。

use axum::{
   Json,
   extract::rejection::{JsonRejection, PathRejection, QueryRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use mailhub_domain::{DomainError, mail::MailError};
use mailhub_infra::InfraError;
use mailhub_shared::ErrorResponse;
use thiserror::Error;

/// JSON ボディを解釈できなかった場合のメッセージ
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// パスの ID を UUID として解釈できなかった場合のメッセージ
pub const INVALID_ID_MESSAGE: &str = "Invalid ID format";

/// クエリ文字列を解釈できなかった場合のメッセージ
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters";

/// Mailhub Service で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
   /// 不正なリクエスト
   #[error("不正なリクエスト: {0}")]
   BadRequest(String),

   /// リソースが見つからない
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// 自然キーの重複
   #[error("競合が発生しました: {0}")]
   Conflict(String),

   /// データベースエラー
   #[error("データベースエラー: {0}")]
   Database(#[from] InfraError),

   /// メール送信エラー
   #[error("メール送信エラー: {0}")]
   Mail(#[from] MailError),

   /// 内部エラー
   #[error("内部エラー: {0}")]
   Internal(String),
}

impl From<DomainError> for ApiError {
   fn from(err: DomainError) -> Self {
      let message = err.message();
      match err {
         DomainError::Validation(_) => Self::BadRequest(message),
         DomainError::NotFound { .. } => Self::NotFound(message),
         DomainError::Conflict(_) => Self::Conflict(message),
      }
   }
}

impl From<JsonRejection> for ApiError {
   fn from(rejection: JsonRejection) -> Self {
      tracing::debug!(error = %rejection.body_text(), "JSON ボディの解釈に失敗");
      Self::BadRequest(INVALID_BODY_MESSAGE.to_string())
   }
}

impl From<PathRejection> for ApiError {
   fn from(rejection: PathRejection) -> Self {
      tracing::debug!(error = %rejection.body_text(), "パスパラメータの解釈に失敗");
      Self::BadRequest(INVALID_ID_MESSAGE.to_string())
   }
}

impl From<QueryRejection> for ApiError {
   fn from(rejection: QueryRejection) -> Self {
      tracing::debug!(error = %rejection.body_text(), "クエリ文字列の解釈に失敗");
      Self::BadRequest(INVALID_QUERY_MESSAGE.to_string())
   }
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let (status, body) = match &self {
         ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone())),
         ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg.clone())),
         ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new(msg.clone())),
         ApiError::Database(e) => {
            tracing::error!(
               error = %e,
               span_trace = %e.span_trace(),
               "データベースエラー"
            );
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               ErrorResponse::internal_error(),
            )
         }
         ApiError::Mail(e) => {
            tracing::error!(error = %e, "メール送信エラー");
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               ErrorResponse::internal_error(),
            )
         }
         ApiError::Internal(msg) => {
            tracing::error!("内部エラー: {}", msg);
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               ErrorResponse::internal_error(),
            )
         }
      };

      (status, Json(body)).into_response()
   }
}

#[cfg(test)]
mod tests {
   use axum::body::to_bytes;
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   async fn into_parts(err: ApiError) -> (StatusCode, ErrorResponse) {
      let response = err.into_response();
      let status = response.status();
      let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      (status, serde_json::from_slice(&bytes).unwrap())
   }

   #[rstest]
   #[case(ApiError::BadRequest("key is required".into()), StatusCode::BAD_REQUEST, "key is required")]
   #[case(ApiError::NotFound("Resource not found".into()), StatusCode::NOT_FOUND, "Resource not found")]
   #[case(ApiError::Conflict("Email already subscribed".into()), StatusCode::CONFLICT, "Email already subscribed")]
   #[tokio::test]
   async fn test_クライアントエラーはメッセージをそのまま返す(
      #[case] err: ApiError,
      #[case] expected_status: StatusCode,
      #[case] expected_message: &str,
   ) {
      let (status, body) = into_parts(err).await;

      assert_eq!(status, expected_status);
      assert_eq!(body, ErrorResponse::new(expected_message));
   }

   #[tokio::test]
   async fn test_データベースエラーは詳細を隠して500を返す() {
      let err = ApiError::Database(InfraError::unexpected("connection reset by peer"));

      let (status, body) = into_parts(err).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body, ErrorResponse::internal_error());
   }

   #[tokio::test]
   async fn test_メール送信エラーは500を返す() {
      let err = ApiError::Mail(MailError::SendFailed("550 mailbox unavailable".into()));

      let (status, body) = into_parts(err).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body.error, "Internal server error");
   }

   #[test]
   fn test_ドメインエラーは種別ごとにマッピングされる() {
      let validation: ApiError = DomainError::Validation("value is required".into()).into();
      let not_found: ApiError = DomainError::NotFound {
         entity_type: "Resource",
         id:          "x".into(),
      }
      .into();
      let conflict: ApiError = DomainError::Conflict("dup".into()).into();

      assert!(matches!(validation, ApiError::BadRequest(m) if m == "value is required"));
      assert!(matches!(not_found, ApiError::NotFound(m) if m == "Resource not found"));
      assert!(matches!(conflict, ApiError::Conflict(m) if m == "dup"));
   }
}

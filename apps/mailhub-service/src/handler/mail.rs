//! # メール送信ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /send-email` - 単発送信
//! - `POST /send-bulk-email` - 一括送信（逐次、最初の失敗で打ち切り）

use std::sync::Arc;

use axum::{
   Json,
   extract::{State, rejection::JsonRejection},
   http::StatusCode,
   response::IntoResponse,
};
use mailhub_shared::MessageResponse;
use serde::Deserialize;

use crate::{
   error::ApiError,
   usecase::{MailUseCaseImpl, SendBulkMailInput, SendMailInput},
};

/// メール送信 API の共有状態
pub struct MailState {
   pub usecase: MailUseCaseImpl,
}

/// 単発送信リクエスト
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
   pub to:      String,
   #[serde(default)]
   pub subject: String,
   #[serde(default)]
   pub body:    String,
   #[serde(default)]
   pub is_html: bool,
}

/// 一括送信リクエスト
#[derive(Debug, Deserialize)]
pub struct SendBulkEmailRequest {
   pub recipients: Vec<String>,
   #[serde(default)]
   pub subject:    String,
   #[serde(default)]
   pub body:       String,
   #[serde(default)]
   pub is_html:    bool,
}

/// POST /send-email
pub async fn send_email(
   State(state): State<Arc<MailState>>,
   payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(req) = payload?;

   state
      .usecase
      .send_mail(SendMailInput {
         to:      req.to,
         subject: req.subject,
         body:    req.body,
         is_html: req.is_html,
      })
      .await?;

   Ok((
      StatusCode::OK,
      Json(MessageResponse::message("Email sent successfully")),
   ))
}

/// POST /send-bulk-email
///
/// ## レスポンス
///
/// - `200 OK`: 全宛先に送信できた
/// - `400 Bad Request`: ボディ不正、宛先なし、宛先の書式不正（検証有効時）
/// - `500 Internal Server Error`: いずれかの宛先で送信に失敗（以降の宛先は未送信）
pub async fn send_bulk_email(
   State(state): State<Arc<MailState>>,
   payload: Result<Json<SendBulkEmailRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(req) = payload?;

   state
      .usecase
      .send_bulk_emails(SendBulkMailInput {
         recipients: req.recipients,
         subject:    req.subject,
         body:       req.body,
         is_html:    req.is_html,
      })
      .await?;

   Ok((
      StatusCode::OK,
      Json(MessageResponse::message("Bulk emails sent successfully")),
   ))
}

#[cfg(test)]
mod tests {
   use axum::{Router, body::Body, http::Request, routing::post};
   use mailhub_infra::mock::RecordingMailer;
   use mailhub_shared::ErrorResponse;
   use pretty_assertions::assert_eq;
   use tower::ServiceExt;

   use super::*;
   use crate::metrics::Metrics;

   fn create_test_app(mailer: &RecordingMailer, validate_recipients: bool) -> Router {
      let usecase = MailUseCaseImpl::new(
         Arc::new(mailer.clone()),
         Arc::new(Metrics::new().unwrap()),
         validate_recipients,
      );
      Router::new()
         .route("/send-email", post(send_email))
         .route("/send-bulk-email", post(send_bulk_email))
         .with_state(Arc::new(MailState { usecase }))
   }

   fn json_request(uri: &str, body: &str) -> Request<Body> {
      Request::builder()
         .method("POST")
         .uri(uri)
         .header("content-type", "application/json")
         .body(Body::from(body.to_string()))
         .unwrap()
   }

   async fn response_body<T: serde::de::DeserializeOwned>(
      response: axum::http::Response<Body>,
   ) -> T {
      let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
         .await
         .unwrap();
      serde_json::from_slice(&bytes).unwrap()
   }

   #[tokio::test]
   async fn test_post_send_emailで200とメッセージが返る() {
      // Given
      let mailer = RecordingMailer::new();
      let sut = create_test_app(&mailer, false);

      // When
      let response = sut
         .oneshot(json_request(
            "/send-email",
            r#"{"to":"reader@example.com","subject":"s","body":"b"}"#,
         ))
         .await
         .unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::OK);
      let body: MessageResponse = response_body(response).await;
      assert_eq!(body.message, "Email sent successfully");
      let sent = mailer.attempts();
      assert_eq!(sent.len(), 1);
      assert!(!sent[0].is_html);
   }

   #[tokio::test]
   async fn test_post_send_email_不正なjsonで400が返る() {
      let mailer = RecordingMailer::new();
      let sut = create_test_app(&mailer, false);

      let response = sut
         .oneshot(json_request("/send-email", r#"{"to": 42"#))
         .await
         .unwrap();

      assert_eq!(response.status(), StatusCode::BAD_REQUEST);
      let body: ErrorResponse = response_body(response).await;
      assert_eq!(body.error, "Invalid request body");
      assert!(mailer.attempts().is_empty());
   }

   #[tokio::test]
   async fn test_post_send_email_送信失敗で500が返る() {
      let mailer = RecordingMailer::failing_for("reader@example.com");
      let sut = create_test_app(&mailer, false);

      let response = sut
         .oneshot(json_request("/send-email", r#"{"to":"reader@example.com"}"#))
         .await
         .unwrap();

      assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
   }

   #[tokio::test]
   async fn test_post_send_email_検証有効で不正な宛先は400が返る() {
      let mailer = RecordingMailer::new();
      let sut = create_test_app(&mailer, true);

      let response = sut
         .oneshot(json_request("/send-email", r#"{"to":"nope"}"#))
         .await
         .unwrap();

      assert_eq!(response.status(), StatusCode::BAD_REQUEST);
      let body: ErrorResponse = response_body(response).await;
      assert_eq!(body.error, "invalid email address");
   }

   #[tokio::test]
   async fn test_post_send_bulk_email_途中で失敗すると500で残りは送らない() {
      // Given
      let mailer = RecordingMailer::failing_for("b@example.com");
      let sut = create_test_app(&mailer, false);

      // When
      let response = sut
         .oneshot(json_request(
            "/send-bulk-email",
            r#"{"recipients":["a@example.com","b@example.com","c@example.com"],"subject":"s","body":"b","is_html":true}"#,
         ))
         .await
         .unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(
         mailer.attempted_recipients(),
         vec!["a@example.com", "b@example.com"]
      );
   }

   #[tokio::test]
   async fn test_post_send_bulk_emailで200とメッセージが返る() {
      let mailer = RecordingMailer::new();
      let sut = create_test_app(&mailer, false);

      let response = sut
         .oneshot(json_request(
            "/send-bulk-email",
            r#"{"recipients":["a@example.com","b@example.com"],"subject":"s","body":"b"}"#,
         ))
         .await
         .unwrap();

      assert_eq!(response.status(), StatusCode::OK);
      let body: MessageResponse = response_body(response).await;
      assert_eq!(body.message, "Bulk emails sent successfully");
      assert_eq!(mailer.attempts().len(), 2);
   }
}

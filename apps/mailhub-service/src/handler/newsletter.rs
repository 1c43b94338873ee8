//! # ニュースレター購読ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /newsletter/subscribe` - 購読登録
//! - `POST /newsletter/unsubscribe` - トークンによる購読解除
//! - `GET /newsletter/subscribers` - 有効な購読の一覧（ページング）
//!
//! 購読解除トークンはレスポンスに含めない。

use std::sync::Arc;

use axum::{
   Json,
   extract::{
      Query,
      State,
      rejection::{JsonRejection, QueryRejection},
   },
   http::StatusCode,
   response::IntoResponse,
};
use mailhub_domain::newsletter::Subscription;
use mailhub_shared::{MessageResponse, PaginatedResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::{error::ApiError, usecase::NewsletterUseCaseImpl};

/// ニュースレター API の共有状態
pub struct NewsletterState {
   pub usecase: NewsletterUseCaseImpl,
}

/// 購読登録リクエスト
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
   pub email: String,
}

/// 購読解除リクエスト
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
   pub token: String,
}

/// 購読 DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionDto {
   pub id:         Uuid,
   pub email:      String,
   pub created_at: String,
   pub updated_at: String,
}

impl From<&Subscription> for SubscriptionDto {
   fn from(subscription: &Subscription) -> Self {
      Self {
         id:         *subscription.id().as_uuid(),
         email:      subscription.email().to_string(),
         created_at: subscription.created_at().to_rfc3339(),
         updated_at: subscription.updated_at().to_rfc3339(),
      }
   }
}

/// POST /newsletter/subscribe
///
/// ## レスポンス
///
/// - `201 Created`: 登録した購読
/// - `400 Bad Request`: ボディ不正、メールアドレスの書式不正
/// - `409 Conflict`: 有効な購読が既にある
pub async fn subscribe(
   State(state): State<Arc<NewsletterState>>,
   payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(req) = payload?;

   let subscription = state.usecase.subscribe(req.email).await?;

   let response = MessageResponse::with_data(
      "Successfully subscribed",
      SubscriptionDto::from(&subscription),
   );
   Ok((StatusCode::CREATED, Json(response)))
}

/// POST /newsletter/unsubscribe
///
/// ## レスポンス
///
/// - `200 OK`: 解除した
/// - `400 Bad Request`: ボディ不正、トークンが空
/// - `404 Not Found`: 有効な購読が見つからない（解除済みを含む）
pub async fn unsubscribe(
   State(state): State<Arc<NewsletterState>>,
   payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(req) = payload?;

   state.usecase.unsubscribe(req.token).await?;

   Ok((
      StatusCode::OK,
      Json(MessageResponse::message("Successfully unsubscribed")),
   ))
}

/// GET /newsletter/subscribers?page&size
pub async fn list_subscribers(
   State(state): State<Arc<NewsletterState>>,
   query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Query(query) = query?;
   let request = query.into_page_request();

   let page = state.usecase.list_active_subscribers(request).await?;

   let response = PaginatedResponse::new(
      page.items.iter().map(SubscriptionDto::from).collect(),
      page.total,
      request.page(),
      request.size(),
   );
   Ok((StatusCode::OK, Json(response)))
}

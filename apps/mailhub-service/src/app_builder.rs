//! # アプリケーション構築
//!
//! 初期化済みの State を受け取り、ルーターとミドルウェアを組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## レイヤー構成（外側から）
//!
//! ```text
//! CORS → TraceLayer → Timeout → CatchPanic
//!   → レート制限（サービス全体で 1 つ）→ メトリクス記録 → 各ルート
//! ```
//!
//! レート制限は `Router::layer` ではなく `fallback_service` で API ルーター全体を
//! 包む。`Router::layer` はルートごとにレイヤーを複製するため、上限がルート単位になる。

use std::{sync::Arc, time::Duration};

use axum::{
   BoxError,
   Json,
   Router,
   error_handling::HandleErrorLayer,
   http::{
      Method,
      StatusCode,
      header::{ACCEPT, CONTENT_TYPE, ORIGIN},
   },
   middleware::from_fn_with_state,
   response::{IntoResponse, Response},
   routing::{get, post},
};
use mailhub_shared::ErrorResponse;
use tower::{ServiceBuilder, load_shed::error::Overloaded};
use tower_http::{
   catch_panic::CatchPanicLayer,
   cors::{Any, CorsLayer},
   timeout::TimeoutLayer,
   trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
   config::ServerSettings,
   handler::{
      MailState,
      NewsletterState,
      ReadinessState,
      ResourceState,
      create_resource,
      delete_resource,
      export_metrics,
      get_resource,
      get_resource_by_key_and_lang,
      health_check,
      list_resources,
      list_resources_by_lang,
      list_subscribers,
      readiness_check,
      send_bulk_email,
      send_email,
      subscribe,
      unsubscribe,
      update_resource,
   },
   metrics::Metrics,
   middleware::track_metrics,
};

/// レート制限超過時のメッセージ
const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests";

/// ルーターが依存する State 一式
pub struct AppState {
   pub mail:       Arc<MailState>,
   pub newsletter: Arc<NewsletterState>,
   pub resource:   Arc<ResourceState>,
   pub readiness:  Arc<ReadinessState>,
   pub metrics:    Arc<Metrics>,
}

/// ルーターとミドルウェアを組み立てる
///
/// レート制限のワーカーを `tokio::spawn` するため、Tokio ランタイム上で呼び出すこと。
pub fn build_app(settings: &ServerSettings, state: AppState) -> Router {
   let rate_limit = settings.rate_limit;
   let buffer_capacity = usize::try_from(rate_limit.max_requests).unwrap_or(usize::MAX).max(1);

   let limited = ServiceBuilder::new()
      .layer(HandleErrorLayer::new(handle_edge_error))
      .load_shed()
      .buffer(buffer_capacity)
      .rate_limit(
         rate_limit.max_requests.max(1),
         Duration::from_secs(rate_limit.window_secs.max(1)),
      )
      .service(api_router(state));

   Router::new()
      .fallback_service(limited)
      .layer(CatchPanicLayer::new())
      .layer(TimeoutLayer::with_status_code(
         StatusCode::REQUEST_TIMEOUT,
         Duration::from_secs(settings.request_timeout_secs),
      ))
      .layer(
         TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
      )
      .layer(cors_layer())
}

fn api_router(state: AppState) -> Router {
   let metrics = state.metrics;

   Router::new()
      .route("/health", get(health_check))
      .merge(
         Router::new()
            .route("/health/ready", get(readiness_check))
            .with_state(state.readiness),
      )
      .merge(
         Router::new()
            .route("/metrics", get(export_metrics))
            .with_state(metrics.clone()),
      )
      // メール送信 API
      .merge(
         Router::new()
            .route("/send-email", post(send_email))
            .route("/send-bulk-email", post(send_bulk_email))
            .with_state(state.mail),
      )
      // ニュースレター API
      .merge(
         Router::new()
            .route("/newsletter/subscribe", post(subscribe))
            .route("/newsletter/unsubscribe", post(unsubscribe))
            .route("/newsletter/subscribers", get(list_subscribers))
            .with_state(state.newsletter),
      )
      // 多言語リソース API
      .merge(
         Router::new()
            .route(
               "/resource",
               get(get_resource_by_key_and_lang).post(create_resource),
            )
            .route(
               "/resource/{id}",
               get(get_resource).put(update_resource).delete(delete_resource),
            )
            .route("/resource/lang/{lang_code}", get(list_resources_by_lang))
            .route("/resources", get(list_resources))
            .with_state(state.resource),
      )
      .layer(from_fn_with_state(metrics, track_metrics))
}

/// 任意のオリジンを許可する
fn cors_layer() -> CorsLayer {
   CorsLayer::new()
      .allow_origin(Any)
      .allow_methods([
         Method::GET,
         Method::POST,
         Method::PUT,
         Method::DELETE,
         Method::PATCH,
         Method::HEAD,
      ])
      .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT])
}

/// レート制限レイヤーのエラーを HTTP レスポンスに変換する
async fn handle_edge_error(err: BoxError) -> Response {
   if err.is::<Overloaded>() {
      tracing::warn!("レート制限によりリクエストを拒否しました");
      return (
         StatusCode::TOO_MANY_REQUESTS,
         Json(ErrorResponse::new(TOO_MANY_REQUESTS_MESSAGE)),
      )
         .into_response();
   }

   tracing::error!(error = %err, "リクエストキューでエラーが発生しました");
   (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(ErrorResponse::internal_error()),
   )
      .into_response()
}

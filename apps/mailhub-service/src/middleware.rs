//! # ミドルウェア
//!
//! HTTP リクエストのメトリクスを記録する。
//!
//! `path` ラベルにはマッチしたルートのテンプレート（例: `/resource/{id}`）を使い、
//! ID ごとにラベルが増えないようにする。どのルートにもマッチしなかった
//! リクエストは `unmatched` にまとめる。

use std::{sync::Arc, time::Instant};

use axum::{
   extract::{MatchedPath, Request, State},
   middleware::Next,
   response::Response,
};

use crate::metrics::Metrics;

/// ルートにマッチしなかったリクエストの `path` ラベル
const UNMATCHED_PATH: &str = "unmatched";

/// リクエスト数・処理時間・処理中の数を記録する
pub async fn track_metrics(
   State(metrics): State<Arc<Metrics>>,
   request: Request,
   next: Next,
) -> Response {
   let method = request.method().to_string();
   let path = request
      .extensions()
      .get::<MatchedPath>()
      .map_or_else(|| UNMATCHED_PATH.to_string(), |p| p.as_str().to_string());

   let _in_flight = metrics.track_in_flight();
   let start = Instant::now();
   let response = next.run(request).await;

   metrics.record_request(
      &method,
      &path,
      response.status().as_u16(),
      start.elapsed().as_secs_f64(),
   );
   response
}

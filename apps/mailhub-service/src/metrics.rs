//! # メトリクス
//!
//! Prometheus のメトリクスを保持するコンテキスト。
//!
//! グローバルなレジストリは使わず、`main` で [`Metrics::new`] を 1 回だけ呼び出して
//! HTTP ミドルウェア・メール送信ユースケース・`/metrics` ハンドラへ `Arc` で渡す。
//!
//! | 名前 | 種別 | ラベル |
//! |------|------|--------|
//! | `http_requests_total` | Counter | `method`, `path`, `status` |
//! | `http_request_duration_seconds` | Histogram | `method`, `path` |
//! | `http_requests_in_flight` | Gauge | なし |
//! | `mail_deliveries_total` | Counter | `outcome` |

use prometheus::{
   CounterVec,
   Encoder,
   Gauge,
   HistogramOpts,
   HistogramVec,
   Opts,
   Registry,
   TextEncoder,
};

/// リクエスト処理時間のバケット（秒）
const DURATION_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// メール送信結果のラベル値
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryOutcome {
   Sent,
   Failed,
}

/// 処理中リクエスト数のガード
pub struct InFlightGuard(Gauge);

impl Drop for InFlightGuard {
   fn drop(&mut self) {
      self.0.dec();
   }
}

/// サービス全体のメトリクス
pub struct Metrics {
   registry:                Registry,
   http_requests_total:     CounterVec,
   http_request_duration:   HistogramVec,
   http_requests_in_flight: Gauge,
   mail_deliveries_total:   CounterVec,
}

impl Metrics {
   /// 専用のレジストリを作成し、すべてのメトリクスを登録する
   pub fn new() -> Result<Self, prometheus::Error> {
      let registry = Registry::new();

      let http_requests_total = CounterVec::new(
         Opts::new("http_requests_total", "Total number of HTTP requests"),
         &["method", "path", "status"],
      )?;
      registry.register(Box::new(http_requests_total.clone()))?;

      let http_request_duration = HistogramVec::new(
         HistogramOpts::new(
            "http_request_duration_seconds",
            "Duration of HTTP requests in seconds",
         )
         .buckets(DURATION_BUCKETS.to_vec()),
         &["method", "path"],
      )?;
      registry.register(Box::new(http_request_duration.clone()))?;

      let http_requests_in_flight = Gauge::new(
         "http_requests_in_flight",
         "Current number of HTTP requests being served",
      )?;
      registry.register(Box::new(http_requests_in_flight.clone()))?;

      let mail_deliveries_total = CounterVec::new(
         Opts::new("mail_deliveries_total", "Total number of mail delivery attempts"),
         &["outcome"],
      )?;
      registry.register(Box::new(mail_deliveries_total.clone()))?;

      Ok(Self {
         registry,
         http_requests_total,
         http_request_duration,
         http_requests_in_flight,
         mail_deliveries_total,
      })
   }

   /// 処理中リクエスト数を 1 増やす
   ///
   /// 返したガードが破棄されると 1 減らす。タイムアウトでハンドラが
   /// 中断された場合も数が戻る。
   pub fn track_in_flight(&self) -> InFlightGuard {
      self.http_requests_in_flight.inc();
      InFlightGuard(self.http_requests_in_flight.clone())
   }

   /// 完了したリクエストを記録する
   pub fn record_request(&self, method: &str, path: &str, status: u16, elapsed_secs: f64) {
      let status = status.to_string();
      self.http_requests_total
         .with_label_values(&[method, path, status.as_str()])
         .inc();
      self.http_request_duration
         .with_label_values(&[method, path])
         .observe(elapsed_secs);
   }

   /// メール送信の試行結果を記録する
   pub fn record_delivery(&self, outcome: DeliveryOutcome) {
      let label: &'static str = outcome.into();
      self.mail_deliveries_total.with_label_values(&[label]).inc();
   }

   /// Prometheus のテキスト形式でエンコードする
   pub fn render(&self) -> Result<String, prometheus::Error> {
      let mut buffer = Vec::new();
      TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
      String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
   }
}

//! # Mailhub Service サーバー
//!
//! トランザクションメール送信・ニュースレター購読・多言語リソース管理を
//! 提供する HTTP サービス。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │    Client    │────▶│   Mailhub    │────▶│  PostgreSQL  │
//! └──────────────┘     │   Service    │     └──────────────┘
//!                      └──────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────┐
//!                      │     SMTP     │
//!                      └──────────────┘
//! ```
//!
//! ## 設定
//!
//! YAML の設定ファイル（既定: `./config/config.yaml`）を読み込み、
//! `MAILHUB__<SECTION>__<KEY>` 形式の環境変数で上書きする。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `MAILHUB_CONFIG` | No | 設定ファイルのパス |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,mailhub=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p mailhub-service
//!
//! MAILHUB__DATABASE__HOST=db MAILHUB__SMTP__HOST=smtp cargo run -p mailhub-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use mailhub_domain::clock::{Clock, SystemClock};
use mailhub_infra::{
   db,
   mailer::{Mailer, NoopMailer, SmtpMailer},
   repository::{PostgresNewsletterRepository, PostgresResourceRepository},
};
use mailhub_service::{
   app_builder::{AppState, build_app},
   config::{AppConfig, MailBackend},
   handler::{MailState, NewsletterState, ReadinessState, ResourceState},
   metrics::Metrics,
   usecase::{MailUseCaseImpl, NewsletterUseCaseImpl, ResourceUseCaseImpl},
};
use mailhub_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   init_tracing(&TracingConfig::from_env("mailhub-service"));

   let config = AppConfig::load().context("設定の読み込みに失敗しました")?;
   tracing::info!(
      host = %config.server.host,
      port = config.server.port,
      mail_backend = %config.mail.backend,
      "Mailhub Service を起動します"
   );

   let pool = db::create_pool(&config.database)
      .await
      .context("データベース接続に失敗しました")?;
   tracing::info!("データベースに接続しました");

   db::run_migrations(&pool)
      .await
      .context("マイグレーションの適用に失敗しました")?;
   tracing::info!("マイグレーションを適用しました");

   let metrics = Arc::new(Metrics::new().context("メトリクスの登録に失敗しました")?);
   let clock: Arc<dyn Clock> = Arc::new(SystemClock);

   let mailer: Arc<dyn Mailer> = match config.mail.backend {
      MailBackend::Smtp => {
         Arc::new(SmtpMailer::new(&config.smtp).context("SMTP 送信の初期化に失敗しました")?)
      }
      MailBackend::Noop => Arc::new(NoopMailer),
   };

   let state = AppState {
      mail:       Arc::new(MailState {
         usecase: MailUseCaseImpl::new(
            mailer,
            metrics.clone(),
            config.mail.validate_recipients,
         ),
      }),
      newsletter: Arc::new(NewsletterState {
         usecase: NewsletterUseCaseImpl::new(
            Arc::new(PostgresNewsletterRepository::new(pool.clone())),
            clock.clone(),
         ),
      }),
      resource:   Arc::new(ResourceState {
         usecase: ResourceUseCaseImpl::new(
            Arc::new(PostgresResourceRepository::new(pool.clone())),
            clock,
         ),
      }),
      readiness:  Arc::new(ReadinessState { pool }),
      metrics,
   };
   let app = build_app(&config.server, state);

   let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;
   let listener = TcpListener::bind(addr).await?;
   tracing::info!("Mailhub Service が起動しました: {}", addr);

   axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await?;

   tracing::info!("Mailhub Service を停止しました");
   Ok(())
}

/// SIGINT（Ctrl-C）または SIGTERM を待つ
async fn shutdown_signal() {
   let ctrl_c = async {
      if let Err(e) = tokio::signal::ctrl_c().await {
         tracing::error!(error = %e, "Ctrl-C ハンドラの登録に失敗しました");
         std::future::pending::<()>().await;
      }
   };

   #[cfg(unix)]
   let terminate = async {
      match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
         Ok(mut signal) => {
            signal.recv().await;
         }
         Err(e) => {
            tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗しました");
            std::future::pending::<()>().await;
         }
      }
   };

   #[cfg(not(unix))]
   let terminate = std::future::pending::<()>();

   tokio::select! {
      () = ctrl_c => tracing::info!("SIGINT を受信しました。停止処理を開始します"),
      () = terminate => tracing::info!("SIGTERM を受信しました。停止処理を開始します"),
   }
}

//! # ログ出力の初期化
//!
//! `tracing` の subscriber を組み立てる。サービスの `main` から 1 回だけ呼ぶ。
//!
//! | 環境変数 | 値 | 既定 |
//! |----------|----|------|
//! | `LOG_FORMAT` | `json` / `pretty`（大文字小文字は区別しない） | `pretty` |
//! | `RUST_LOG` | `EnvFilter` のディレクティブ | [`DEFAULT_FILTER`] |
//!
//! メトリクスはここでは扱わない。レジストリはサービス側で生成して注入する。

use std::str::FromStr;

/// `RUST_LOG` が未設定のときのフィルタ
pub const DEFAULT_FILTER: &str = "info,mailhub=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON（本番向け）
    Json,
    /// 人が読む形式（開発向け）
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format: {other:?}")),
        }
    }
}

impl LogFormat {
    /// `LOG_FORMAT` の値から決める
    ///
    /// 未設定・不正な値は `Pretty` にする。subscriber の初期化前なので
    /// 警告は stderr に直接書く。
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::parse::<Self>) {
            None => Self::default(),
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                eprintln!("WARNING: {e}, falling back to pretty");
                Self::default()
            }
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// subscriber の初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name:   String,
    pub log_format:     LogFormat,
    /// `RUST_LOG` が未設定のときに使うフィルタ
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::new(service_name, LogFormat::from_env())
    }
}

/// グローバルな subscriber を登録する
///
/// `tracing_error::ErrorLayer` も登録し、`InfraError` が生成時点の
/// `SpanTrace` を持てるようにする。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let output = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info!(
        service = %config.service_name,
        log_format = ?config.log_format,
        "ログ出力を初期化しました"
    );
}

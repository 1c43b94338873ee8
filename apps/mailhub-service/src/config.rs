//! # Mailhub Service 設定
//!
//! YAML の設定ファイルを読み込み、環境変数で上書きする。
//!
//! ## 読み込み順
//!
//! 1. 環境変数 `MAILHUB_CONFIG` が指すファイル。未設定なら
//!    `./config/config.yaml`、`./config.yaml` の順で最初に見つかったもの
//! 2. 各セクションの既定値（ファイルに書かれていないキー）
//! 3. `MAILHUB__` プレフィックスの環境変数（例: `MAILHUB__DATABASE__HOST`）
//!
//! 設定ファイルが見つからない場合は起動エラーとする。

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use mailhub_infra::{db::DatabaseSettings, mailer::SmtpSettings};
use serde::Deserialize;

/// 設定ファイルのパスを指定する環境変数
pub const CONFIG_PATH_ENV: &str = "MAILHUB_CONFIG";

/// 設定ファイルの探索候補
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./config/config.yaml", "./config.yaml"];

/// 設定読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
   #[error("設定ファイルが見つかりません（MAILHUB_CONFIG, ./config/config.yaml, ./config.yaml）")]
   NotFound,

   #[error("設定の読み込みに失敗しました: {0}")]
   Load(#[from] config::ConfigError),
}

/// Mailhub Service の設定
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
   pub server:   ServerSettings,
   pub database: DatabaseSettings,
   pub smtp:     SmtpSettings,
   pub mail:     MailSettings,
}

/// HTTP サーバーの設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
   pub host:                 String,
   pub port:                 u16,
   /// リクエスト全体のタイムアウト（秒）
   pub request_timeout_secs: u64,
   pub rate_limit:           RateLimitSettings,
}

impl Default for ServerSettings {
   fn default() -> Self {
      Self {
         host:                 "0.0.0.0".to_string(),
         port:                 8080,
         request_timeout_secs: 30,
         rate_limit:           RateLimitSettings::default(),
      }
   }
}

/// レート制限の設定
///
/// `window_secs` 秒あたり `max_requests` 件までを処理する。
/// 超過分は同数まで待機させ、それも埋まったら 429 を返す。
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
   pub max_requests: u64,
   pub window_secs:  u64,
}

impl Default for RateLimitSettings {
   fn default() -> Self {
      Self {
         max_requests: 100,
         window_secs:  60,
      }
   }
}

/// メール送信バックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MailBackend {
   /// SMTP サーバー経由で送信
   #[default]
   Smtp,
   /// 送信しない（ログ出力のみ）
   Noop,
}

/// メール送信の設定
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MailSettings {
   pub backend:             MailBackend,
   /// 送信前に宛先の書式を検証するか
   pub validate_recipients: bool,
}

impl AppConfig {
   /// 設定ファイルと環境変数から設定を読み込む
   pub fn load() -> Result<Self, ConfigError> {
      let path = resolve_config_path(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))?;
      tracing::info!(path = %path.display(), "設定ファイルを読み込みます");

      let config = Config::builder()
         .add_source(File::from(path.as_path()).required(true))
         .add_source(env_source())
         .build()?;

      Ok(config.try_deserialize()?)
   }

   /// YAML 文字列から設定を読み込む（環境変数による上書きなし）
   pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
      let config = Config::builder()
         .add_source(File::from_str(yaml, FileFormat::Yaml))
         .build()?;

      Ok(config.try_deserialize()?)
   }
}

fn env_source() -> Environment {
   Environment::with_prefix("MAILHUB")
      .prefix_separator("__")
      .separator("__")
      .try_parsing(true)
}

/// 読み込む設定ファイルを決める
///
/// 明示されたパスはそのまま使う（存在しなければ読み込み時にエラーになる）。
fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
   if let Some(path) = explicit {
      return Ok(path);
   }

   DEFAULT_CONFIG_PATHS
      .iter()
      .map(Path::new)
      .find(|p| p.is_file())
      .map(Path::to_path_buf)
      .ok_or(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_空の設定ファイルでは既定値が使われる() {
      let config = AppConfig::from_yaml("{}").unwrap();

      assert_eq!(config.server.port, 8080);
      assert_eq!(config.server.rate_limit.max_requests, 100);
      assert_eq!(config.database.max_open_conns, 100);
      assert_eq!(config.mail.backend, MailBackend::Smtp);
      assert!(!config.mail.validate_recipients);
   }

   #[test]
   fn test_yamlの値でセクションを上書きできる() {
      let yaml = r#"
server:
  port: 9090
  rate_limit:
    max_requests: 5
    window_secs: 1
database:
  host: db.internal
  password: s3cr3t
smtp:
  host: smtp.example.com
  port: 587
  secure: true
mail:
  backend: noop
  validate_recipients: true
"#;

      let config = AppConfig::from_yaml(yaml).unwrap();

      assert_eq!(config.server.port, 9090);
      assert_eq!(config.server.host, "0.0.0.0");
      assert_eq!(config.server.rate_limit.max_requests, 5);
      assert_eq!(config.server.rate_limit.window_secs, 1);
      assert_eq!(config.database.host, "db.internal");
      assert_eq!(config.database.port, 5432);
      assert_eq!(config.smtp.port, 587);
      assert!(config.smtp.secure);
      assert_eq!(config.mail.backend, MailBackend::Noop);
      assert!(config.mail.validate_recipients);
   }

   #[test]
   fn test_未知のバックエンドはエラーになる() {
      let result = AppConfig::from_yaml("mail:\n  backend: carrier-pigeon\n");

      assert!(matches!(result, Err(ConfigError::Load(_))));
   }

   #[test]
   fn test_明示されたパスはそのまま使われる() {
      let path = resolve_config_path(Some(PathBuf::from("/etc/mailhub/config.yaml"))).unwrap();

      assert_eq!(path, PathBuf::from("/etc/mailhub/config.yaml"));
   }

   #[test]
   fn test_バックエンド名は小文字で表示される() {
      assert_eq!(MailBackend::Smtp.to_string(), "smtp");
      assert_eq!(MailBackend::Noop.to_string(), "noop");
   }
}

//! # メール送信
//!
//! トランザクションメールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `Mailer` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（lettre）、Noop（ログ出力のみ）
//! - **設定で切替**: 設定ファイルの `mail.backend` でランタイム選択
//! - **リトライなし**: 1 通につき 1 回だけ送信を試みる

mod noop;
mod smtp;

use async_trait::async_trait;
use mailhub_domain::mail::{Mail, MailError};
pub use noop::NoopMailer;
pub use smtp::{SmtpMailer, SmtpSettings};

/// メール送信トレイト
#[async_trait]
pub trait Mailer: Send + Sync {
    /// メールを 1 通送信する
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

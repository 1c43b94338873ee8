//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! `secure = true` のときは STARTTLS で接続し、`user` が設定されていれば認証する。
//! `secure = false` は TLS なしの平文接続（Mailpit 等のローカル SMTP 向け）。

use std::fmt;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use mailhub_domain::mail::{Mail, MailError};
use serde::Deserialize;

use super::Mailer;

/// SMTP 接続設定
///
/// 設定ファイルの `smtp` セクションにそのまま対応する。
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host:   String,
    pub port:   u16,
    pub user:   String,
    pub pass:   String,
    /// 送信元アドレス（`Name <addr>` 形式も可）
    pub from:   String,
    /// STARTTLS を使用するか
    pub secure: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host:   "localhost".to_string(),
            port:   1025,
            user:   String::new(),
            pass:   String::new(),
            from:   "noreply@mailhub.local".to_string(),
            secure: false,
        }
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .field("from", &self.from)
            .field("secure", &self.secure)
            .finish()
    }
}

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// トランスポートは起動時に一度だけ構築し、接続プールを使い回す。
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
}

impl SmtpMailer {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 送信元アドレスの書式とリレーホストの解決はここで検証する。
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("送信元 {}: {e}", settings.from)))?;

        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| MailError::Build(format!("SMTP リレー設定失敗: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let builder = builder.port(settings.port);
        let builder = if settings.user.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, mail: &Mail) -> Result<Message, MailError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {e}", mail.to)))?;

        let content_type = if mail.is_html {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .header(content_type)
            .body(mail.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip_all, level = "debug", fields(to = %mail.to))]
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let message = self.build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        tracing::debug!("SMTP でメールを送信しました");
        Ok(())
    }
}

//! 送信しないメール送信実装
//!
//! `mail.backend: noop` のときに使う。宛先と件名をログに残すだけで、
//! 書式の検証もしないため常に成功する。

use async_trait::async_trait;
use mailhub_domain::mail::{Mail, MailError};

use super::Mailer;

#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            is_html = mail.is_html,
            body_len = mail.body.len(),
            "noop バックエンドのため送信しません"
        );
        Ok(())
    }
}

//! メール送信ユースケース
//!
//! 送信は 1 通ずつ逐次に行い、リトライはしない。
//! 一括送信は最初の失敗で打ち切り、それまでに送れたメールはそのまま残る。

use std::sync::Arc;

use mailhub_domain::mail::{EmailAddress, Mail};
use mailhub_infra::mailer::Mailer;

use crate::{
   error::ApiError,
   metrics::{DeliveryOutcome, Metrics},
};

/// 単発送信の入力
pub struct SendMailInput {
   pub to:      String,
   pub subject: String,
   pub body:    String,
   pub is_html: bool,
}

/// 一括送信の入力
pub struct SendBulkMailInput {
   pub recipients: Vec<String>,
   pub subject:    String,
   pub body:       String,
   pub is_html:    bool,
}

/// メール送信ユースケース
pub struct MailUseCaseImpl {
   mailer:              Arc<dyn Mailer>,
   metrics:             Arc<Metrics>,
   validate_recipients: bool,
}

impl MailUseCaseImpl {
   pub fn new(mailer: Arc<dyn Mailer>, metrics: Arc<Metrics>, validate_recipients: bool) -> Self {
      Self {
         mailer,
         metrics,
         validate_recipients,
      }
   }

   /// メールを 1 通送信する
   #[tracing::instrument(skip_all, fields(to = %input.to))]
   pub async fn send_mail(&self, input: SendMailInput) -> Result<(), ApiError> {
      self.validate(std::slice::from_ref(&input.to))?;

      let mail = Mail::new(input.to, input.subject, input.body, input.is_html);
      self.deliver(&mail).await
   }

   /// 同じ件名・本文のメールを宛先ごとに逐次送信する
   ///
   /// 宛先の検証が有効な場合は、送信を始める前に全宛先を検証する。
   #[tracing::instrument(skip_all, fields(recipients = input.recipients.len()))]
   pub async fn send_bulk_emails(&self, input: SendBulkMailInput) -> Result<(), ApiError> {
      if input.recipients.is_empty() {
         return Err(ApiError::BadRequest("recipients is required".to_string()));
      }
      self.validate(&input.recipients)?;

      for to in input.recipients {
         let mail = Mail::new(to, input.subject.clone(), input.body.clone(), input.is_html);
         self.deliver(&mail).await?;
      }

      Ok(())
   }

   fn validate(&self, recipients: &[String]) -> Result<(), ApiError> {
      if !self.validate_recipients {
         return Ok(());
      }
      for to in recipients {
         EmailAddress::new(to.as_str())?;
      }
      Ok(())
   }

   async fn deliver(&self, mail: &Mail) -> Result<(), ApiError> {
      match self.mailer.send(mail).await {
         Ok(()) => {
            self.metrics.record_delivery(DeliveryOutcome::Sent);
            tracing::info!(to = %mail.to, "メールを送信しました");
            Ok(())
         }
         Err(e) => {
            self.metrics.record_delivery(DeliveryOutcome::Failed);
            tracing::warn!(to = %mail.to, error = %e, "メール送信に失敗しました");
            Err(e.into())
         }
      }
   }
}

#[cfg(test)]
mod tests {
   use mailhub_infra::mock::RecordingMailer;
   use pretty_assertions::assert_eq;

   use super::*;

   fn sut(mailer: &RecordingMailer, validate_recipients: bool) -> MailUseCaseImpl {
      MailUseCaseImpl::new(
         Arc::new(mailer.clone()),
         Arc::new(Metrics::new().unwrap()),
         validate_recipients,
      )
   }

   fn bulk(recipients: &[&str]) -> SendBulkMailInput {
      SendBulkMailInput {
         recipients: recipients.iter().map(|r| r.to_string()).collect(),
         subject:    "お知らせ".to_string(),
         body:       "<p>hello</p>".to_string(),
         is_html:    true,
      }
   }

   #[tokio::test]
   async fn test_単発送信で入力どおりのメールが渡される() {
      let mailer = RecordingMailer::new();

      sut(&mailer, false)
         .send_mail(SendMailInput {
            to:      "reader@example.com".to_string(),
            subject: "subject".to_string(),
            body:    "body".to_string(),
            is_html: false,
         })
         .await
         .unwrap();

      assert_eq!(
         mailer.attempts(),
         vec![Mail::new(
            "reader@example.com".to_string(),
            "subject".to_string(),
            "body".to_string(),
            false,
         )]
      );
   }

   #[tokio::test]
   async fn test_検証無効なら不正な宛先でも送信を試みる() {
      let mailer = RecordingMailer::new();

      let result = sut(&mailer, false)
         .send_mail(SendMailInput {
            to:      "not-an-address".to_string(),
            subject: "s".to_string(),
            body:    "b".to_string(),
            is_html: false,
         })
         .await;

      assert!(result.is_ok());
      assert_eq!(mailer.attempted_recipients(), vec!["not-an-address"]);
   }

   #[tokio::test]
   async fn test_検証有効なら不正な宛先は送信せずbad_requestになる() {
      let mailer = RecordingMailer::new();

      let result = sut(&mailer, true)
         .send_mail(SendMailInput {
            to:      "not-an-address".to_string(),
            subject: "s".to_string(),
            body:    "b".to_string(),
            is_html: false,
         })
         .await;

      assert!(matches!(result, Err(ApiError::BadRequest(m)) if m == "invalid email address"));
      assert!(mailer.attempts().is_empty());
   }

   #[tokio::test]
   async fn test_一括送信は宛先の順に逐次送信する() {
      let mailer = RecordingMailer::new();

      sut(&mailer, false)
         .send_bulk_emails(bulk(&["a@example.com", "b@example.com", "c@example.com"]))
         .await
         .unwrap();

      assert_eq!(
         mailer.attempted_recipients(),
         vec!["a@example.com", "b@example.com", "c@example.com"]
      );
   }

   #[tokio::test]
   async fn test_一括送信は最初の失敗で打ち切り残りを送らない() {
      // Given: 検証なし、2 通目の宛先がトランスポートで拒否される
      let mailer = RecordingMailer::failing_for("b-invalid");

      // When
      let result = sut(&mailer, false)
         .send_bulk_emails(bulk(&["a@example.com", "b-invalid", "c@example.com"]))
         .await;

      // Then
      assert!(matches!(result, Err(ApiError::Mail(_))));
      assert_eq!(
         mailer.attempted_recipients(),
         vec!["a@example.com", "b-invalid"]
      );
   }

   #[tokio::test]
   async fn test_検証有効な一括送信は送信前に全宛先を検証する() {
      let mailer = RecordingMailer::new();

      let result = sut(&mailer, true)
         .send_bulk_emails(bulk(&["a@example.com", "broken", "c@example.com"]))
         .await;

      assert!(matches!(result, Err(ApiError::BadRequest(_))));
      assert!(mailer.attempts().is_empty());
   }

   #[tokio::test]
   async fn test_宛先が空の一括送信はbad_requestになる() {
      let mailer = RecordingMailer::new();

      let result = sut(&mailer, false).send_bulk_emails(bulk(&[])).await;

      assert!(matches!(result, Err(ApiError::BadRequest(_))));
   }
}

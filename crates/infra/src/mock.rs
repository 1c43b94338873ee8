//! # テスト用モック
//!
//! ユースケース・ハンドラテストで使用するインメモリのリポジトリとメール送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailhub-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! PostgreSQL 実装と同じく、論理削除済みの行は参照系から除外し、
//! 有効な行との自然キー重複は Conflict を返す。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailhub_domain::{
   mail::{EmailAddress, Mail, MailError},
   newsletter::{Subscription, SubscriptionId, UnsubscribeToken},
   pagination::{Page, PageRequest},
   resource::{LangCode, Resource, ResourceId, ResourceKey},
};

use crate::{
   error::InfraError,
   mailer::Mailer,
   repository::{NewsletterRepository, ResourceRepository},
};

/// 作成日時の降順（同時刻は ID の降順）で 1 ページ分を切り出す
fn paginate<T: Clone>(
   mut items: Vec<T>,
   request: &PageRequest,
   sort_key: impl Fn(&T) -> (DateTime<Utc>, uuid::Uuid),
) -> Page<T> {
   items.sort_by_key(|item| std::cmp::Reverse(sort_key(item)));
   let total = items.len() as i64;
   let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
   let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
   let page_items = items.into_iter().skip(offset).take(limit).collect();
   Page::new(page_items, total)
}

// ===== MockNewsletterRepository =====

#[derive(Clone, Default)]
pub struct MockNewsletterRepository {
   subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl MockNewsletterRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 論理削除済みの行も含めた全件を返す
   pub fn all(&self) -> Vec<Subscription> {
      self.subscriptions.lock().unwrap().clone()
   }
}

#[async_trait]
impl NewsletterRepository for MockNewsletterRepository {
   async fn find_active_by_email(
      &self,
      email: &EmailAddress,
   ) -> Result<Option<Subscription>, InfraError> {
      Ok(self
         .subscriptions
         .lock()
         .unwrap()
         .iter()
         .find(|s| s.is_active() && s.email() == email)
         .cloned())
   }

   async fn find_active_by_token(
      &self,
      token: &UnsubscribeToken,
   ) -> Result<Option<Subscription>, InfraError> {
      Ok(self
         .subscriptions
         .lock()
         .unwrap()
         .iter()
         .find(|s| s.is_active() && s.token() == token)
         .cloned())
   }

   async fn insert(&self, subscription: &Subscription) -> Result<(), InfraError> {
      let mut subscriptions = self.subscriptions.lock().unwrap();
      if subscriptions
         .iter()
         .any(|s| s.is_active() && s.email() == subscription.email())
      {
         return Err(InfraError::conflict(
            "Subscription",
            subscription.email().as_str(),
         ));
      }
      subscriptions.push(subscription.clone());
      Ok(())
   }

   async fn soft_delete(
      &self,
      id: &SubscriptionId,
      now: DateTime<Utc>,
   ) -> Result<bool, InfraError> {
      let mut subscriptions = self.subscriptions.lock().unwrap();
      let Some(pos) = subscriptions
         .iter()
         .position(|s| s.is_active() && s.id() == id)
      else {
         return Ok(false);
      };
      let current = subscriptions.remove(pos);
      subscriptions.insert(pos, current.unsubscribed(now));
      Ok(true)
   }

   async fn find_active_page(
      &self,
      request: &PageRequest,
   ) -> Result<Page<Subscription>, InfraError> {
      let active = self
         .subscriptions
         .lock()
         .unwrap()
         .iter()
         .filter(|s| s.is_active())
         .cloned()
         .collect();
      Ok(paginate(active, request, |s| (s.created_at(), *s.id().as_uuid())))
   }
}

// ===== MockResourceRepository =====

#[derive(Clone, Default)]
pub struct MockResourceRepository {
   resources: Arc<Mutex<Vec<Resource>>>,
}

impl MockResourceRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 論理削除済みの行も含めた全件を返す
   pub fn all(&self) -> Vec<Resource> {
      self.resources.lock().unwrap().clone()
   }
}

#[async_trait]
impl ResourceRepository for MockResourceRepository {
   async fn find_active_by_id(&self, id: &ResourceId) -> Result<Option<Resource>, InfraError> {
      Ok(self
         .resources
         .lock()
         .unwrap()
         .iter()
         .find(|r| r.is_active() && r.id() == id)
         .cloned())
   }

   async fn find_active_by_key_and_lang(
      &self,
      key: &ResourceKey,
      lang_code: &LangCode,
   ) -> Result<Option<Resource>, InfraError> {
      Ok(self
         .resources
         .lock()
         .unwrap()
         .iter()
         .find(|r| r.is_active() && r.key() == key && r.lang_code() == lang_code)
         .cloned())
   }

   async fn find_active_by_lang(&self, lang_code: &LangCode) -> Result<Vec<Resource>, InfraError> {
      let mut resources: Vec<Resource> = self
         .resources
         .lock()
         .unwrap()
         .iter()
         .filter(|r| r.is_active() && r.lang_code() == lang_code)
         .cloned()
         .collect();
      resources.sort_by(|a, b| a.key().as_str().cmp(b.key().as_str()));
      Ok(resources)
   }

   async fn find_active_page(&self, request: &PageRequest) -> Result<Page<Resource>, InfraError> {
      let active = self
         .resources
         .lock()
         .unwrap()
         .iter()
         .filter(|r| r.is_active())
         .cloned()
         .collect();
      Ok(paginate(active, request, |r| (r.created_at(), *r.id().as_uuid())))
   }

   async fn insert(&self, resource: &Resource) -> Result<(), InfraError> {
      let mut resources = self.resources.lock().unwrap();
      if resources.iter().any(|r| {
         r.is_active() && r.key() == resource.key() && r.lang_code() == resource.lang_code()
      }) {
         return Err(InfraError::conflict(
            "Resource",
            format!("{}/{}", resource.key(), resource.lang_code()),
         ));
      }
      resources.push(resource.clone());
      Ok(())
   }

   async fn update(&self, resource: &Resource) -> Result<bool, InfraError> {
      let mut resources = self.resources.lock().unwrap();
      match resources
         .iter_mut()
         .find(|r| r.is_active() && r.id() == resource.id())
      {
         Some(current) => {
            *current = resource.clone();
            Ok(true)
         }
         None => Ok(false),
      }
   }

   async fn soft_delete(&self, id: &ResourceId, now: DateTime<Utc>) -> Result<bool, InfraError> {
      let mut resources = self.resources.lock().unwrap();
      let Some(pos) = resources.iter().position(|r| r.is_active() && r.id() == id) else {
         return Ok(false);
      };
      let current = resources.remove(pos);
      resources.insert(pos, current.deleted(now));
      Ok(true)
   }
}

// ===== RecordingMailer =====

/// 送信を試みた宛先を記録するメール送信モック
///
/// `failing_for` に指定した宛先への送信は `SendFailed` を返す。
/// 失敗した宛先も「試みた」として記録する。
#[derive(Clone, Default)]
pub struct RecordingMailer {
   attempts:    Arc<Mutex<Vec<Mail>>>,
   failing_for: Option<String>,
}

impl RecordingMailer {
   pub fn new() -> Self {
      Self::default()
   }

   /// 指定した宛先への送信だけ失敗させる
   pub fn failing_for(recipient: impl Into<String>) -> Self {
      Self {
         attempts:    Arc::default(),
         failing_for: Some(recipient.into()),
      }
   }

   /// 送信を試みたメール（試行順）
   pub fn attempts(&self) -> Vec<Mail> {
      self.attempts.lock().unwrap().clone()
   }

   /// 送信を試みた宛先（試行順）
   pub fn attempted_recipients(&self) -> Vec<String> {
      self.attempts().into_iter().map(|m| m.to).collect()
   }
}

#[async_trait]
impl Mailer for RecordingMailer {
   async fn send(&self, mail: &Mail) -> Result<(), MailError> {
      self.attempts.lock().unwrap().push(mail.clone());
      if self.failing_for.as_deref() == Some(mail.to.as_str()) {
         return Err(MailError::SendFailed(format!("{} への送信に失敗", mail.to)));
      }
      Ok(())
   }
}

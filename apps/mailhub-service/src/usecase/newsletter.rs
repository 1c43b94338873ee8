//! ニュースレター購読ユースケース

use std::sync::Arc;

use mailhub_domain::{
   DomainError,
   clock::Clock,
   mail::EmailAddress,
   newsletter::{Subscription, UnsubscribeToken},
   pagination::{Page, PageRequest},
};
use mailhub_infra::{InfraError, repository::NewsletterRepository};

use crate::error::ApiError;

/// 購読済みのメールアドレスで再度購読しようとした場合のメッセージ
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "Email already subscribed";

/// ニュースレター購読ユースケース
pub struct NewsletterUseCaseImpl {
   newsletter_repository: Arc<dyn NewsletterRepository>,
   clock:                 Arc<dyn Clock>,
}

impl NewsletterUseCaseImpl {
   pub fn new(newsletter_repository: Arc<dyn NewsletterRepository>, clock: Arc<dyn Clock>) -> Self {
      Self {
         newsletter_repository,
         clock,
      }
   }

   /// 購読を登録する
   ///
   /// 1. メールアドレスの書式を検証
   /// 2. 有効な購読が既にあれば Conflict
   /// 3. 購読解除トークンを生成して挿入（一意制約違反も Conflict）
   #[tracing::instrument(skip_all)]
   pub async fn subscribe(&self, email: String) -> Result<Subscription, ApiError> {
      let email = EmailAddress::new(email)?;

      if self
         .newsletter_repository
         .find_active_by_email(&email)
         .await?
         .is_some()
      {
         return Err(ApiError::Conflict(ALREADY_SUBSCRIBED_MESSAGE.to_string()));
      }

      let subscription = Subscription::new(email, self.clock.now());
      self
         .newsletter_repository
         .insert(&subscription)
         .await
         .map_err(already_subscribed_on_conflict)?;

      tracing::info!(id = %subscription.id(), "購読を登録しました");
      Ok(subscription)
   }

   /// 購読解除トークンで購読を解除する
   ///
   /// 解除済み・未知のトークンはどちらも NotFound になる。
   #[tracing::instrument(skip_all)]
   pub async fn unsubscribe(&self, token: String) -> Result<(), ApiError> {
      if token.trim().is_empty() {
         return Err(ApiError::BadRequest("token is required".to_string()));
      }
      let token = UnsubscribeToken::from_string(token);

      let subscription = self
         .newsletter_repository
         .find_active_by_token(&token)
         .await?
         .ok_or_else(subscription_not_found)?;

      let deleted = self
         .newsletter_repository
         .soft_delete(subscription.id(), self.clock.now())
         .await?;
      if !deleted {
         // 検索と削除の間に別リクエストが解除した
         return Err(subscription_not_found());
      }

      tracing::info!(id = %subscription.id(), "購読を解除しました");
      Ok(())
   }

   /// 有効な購読を新しい順にページ取得する
   #[tracing::instrument(skip_all, fields(page = request.page(), size = request.size()))]
   pub async fn list_active_subscribers(
      &self,
      request: PageRequest,
   ) -> Result<Page<Subscription>, ApiError> {
      Ok(self.newsletter_repository.find_active_page(&request).await?)
   }
}

fn subscription_not_found() -> ApiError {
   DomainError::NotFound {
      entity_type: "Subscription",
      id:          "token".to_string(),
   }
   .into()
}

fn already_subscribed_on_conflict(err: InfraError) -> ApiError {
   if err.as_conflict().is_some() {
      ApiError::Conflict(ALREADY_SUBSCRIBED_MESSAGE.to_string())
   } else {
      ApiError::Database(err)
   }
}

#[cfg(test)]
mod tests {
   use chrono::{DateTime, Duration, Utc};
   use mailhub_domain::clock::FixedClock;
   use mailhub_infra::mock::MockNewsletterRepository;
   use pretty_assertions::assert_eq;

   use super::*;

   fn fixed_now() -> DateTime<Utc> {
      DateTime::from_timestamp(1_700_000_000, 0).unwrap()
   }

   fn sut(repo: &MockNewsletterRepository) -> NewsletterUseCaseImpl {
      NewsletterUseCaseImpl::new(
         Arc::new(repo.clone()),
         Arc::new(FixedClock::new(fixed_now())),
      )
   }

   #[tokio::test]
   async fn test_購読すると43文字のトークン付きで保存される() {
      let repo = MockNewsletterRepository::new();

      let subscription = sut(&repo)
         .subscribe("reader@example.com".to_string())
         .await
         .unwrap();

      assert_eq!(subscription.email().as_str(), "reader@example.com");
      assert_eq!(subscription.token().as_str().len(), 43);
      assert_eq!(subscription.created_at(), fixed_now());
      assert_eq!(repo.all(), vec![subscription]);
   }

   #[tokio::test]
   async fn test_同じメールアドレスで2回購読すると2回目はconflictになる() {
      let repo = MockNewsletterRepository::new();
      let sut = sut(&repo);

      sut.subscribe("reader@example.com".to_string()).await.unwrap();
      let second = sut.subscribe("reader@example.com".to_string()).await;

      assert!(matches!(second, Err(ApiError::Conflict(m)) if m == ALREADY_SUBSCRIBED_MESSAGE));
      assert_eq!(repo.all().len(), 1);
   }

   #[tokio::test]
   async fn test_不正なメールアドレスはbad_requestになる() {
      let repo = MockNewsletterRepository::new();

      let result = sut(&repo).subscribe("not-an-address".to_string()).await;

      assert!(matches!(result, Err(ApiError::BadRequest(m)) if m == "invalid email address"));
      assert!(repo.all().is_empty());
   }

   #[tokio::test]
   async fn test_同じトークンで2回解除すると2回目はnot_foundになる() {
      let repo = MockNewsletterRepository::new();
      let sut = sut(&repo);
      let subscription = sut.subscribe("reader@example.com".to_string()).await.unwrap();
      let token = subscription.token().as_str().to_string();

      sut.unsubscribe(token.clone()).await.unwrap();
      let second = sut.unsubscribe(token).await;

      assert!(matches!(second, Err(ApiError::NotFound(m)) if m == "Subscription not found"));
      assert!(!repo.all()[0].is_active());
   }

   #[tokio::test]
   async fn test_未知のトークンはnot_foundになる() {
      let repo = MockNewsletterRepository::new();

      let result = sut(&repo).unsubscribe("unknown-token".to_string()).await;

      assert!(matches!(result, Err(ApiError::NotFound(_))));
   }

   #[tokio::test]
   async fn test_解除後は同じメールアドレスで再購読できる() {
      let repo = MockNewsletterRepository::new();
      let sut = sut(&repo);
      let first = sut.subscribe("reader@example.com".to_string()).await.unwrap();
      sut
         .unsubscribe(first.token().as_str().to_string())
         .await
         .unwrap();

      let again = sut.subscribe("reader@example.com".to_string()).await.unwrap();

      assert_ne!(again.token(), first.token());
      assert_eq!(repo.all().len(), 2);
   }

   #[tokio::test]
   async fn test_有効な購読25件をサイズ10で取得すると3ページになる() {
      // Given: 作成日時をずらした 25 件と解除済み 1 件
      let repo = MockNewsletterRepository::new();
      let clock = Arc::new(FixedClock::new(fixed_now()));
      let sut = NewsletterUseCaseImpl::new(Arc::new(repo.clone()), clock.clone());
      for i in 0..25 {
         sut.subscribe(format!("reader{i}@example.com")).await.unwrap();
         clock.advance(Duration::minutes(1));
      }
      let gone = sut.subscribe("gone@example.com".to_string()).await.unwrap();
      sut.unsubscribe(gone.token().as_str().to_string()).await.unwrap();

      // When
      let request = PageRequest::new(1, 10);
      let page = sut.list_active_subscribers(request).await.unwrap();

      // Then
      assert_eq!(page.items.len(), 10);
      assert_eq!(page.total, 25);
      assert_eq!(page.items[0].email().as_str(), "reader24@example.com");
   }
}

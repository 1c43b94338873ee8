//! # NewsletterRepository
//!
//! ニュースレター購読の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **論理削除**: 購読解除は `deleted_at` を設定するだけで行は残す
//! - **有効行のみ参照**: すべての参照系クエリは `deleted_at IS NULL` で絞り込む
//! - **一意性は DB が最終判定**: `newsletters_email_active_key` の違反は
//!   [`InfraError::conflict`] に変換して返す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailhub_domain::{
    mail::EmailAddress,
    newsletter::{Subscription, SubscriptionId, UnsubscribeToken},
    pagination::{Page, PageRequest},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ニュースレター購読リポジトリトレイト
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// メールアドレスで有効な購読を検索する
    async fn find_active_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscription>, InfraError>;

    /// 購読解除トークンで有効な購読を検索する
    async fn find_active_by_token(
        &self,
        token: &UnsubscribeToken,
    ) -> Result<Option<Subscription>, InfraError>;

    /// 購読を挿入する
    ///
    /// 有効な行と email が重複した場合は Conflict を返す。
    async fn insert(&self, subscription: &Subscription) -> Result<(), InfraError>;

    /// 購読を論理削除する
    ///
    /// 対象の有効な行が存在しなかった場合は `false` を返す。
    async fn soft_delete(&self, id: &SubscriptionId, now: DateTime<Utc>)
    -> Result<bool, InfraError>;

    /// 有効な購読を作成日時の降順でページ取得する
    async fn find_active_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Subscription>, InfraError>;
}

/// PostgreSQL 実装の NewsletterRepository
#[derive(Debug, Clone)]
pub struct PostgresNewsletterRepository {
    pool: PgPool,
}

impl PostgresNewsletterRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// newsletters テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct NewsletterRow {
    id:         Uuid,
    email:      String,
    token:      String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl NewsletterRow {
    fn into_entity(self) -> Result<Subscription, InfraError> {
        let email = EmailAddress::new(self.email)
            .map_err(|e| InfraError::unexpected(format!("不正な email が保存されています: {e}")))?;

        Ok(Subscription::from_db(
            SubscriptionId::from_uuid(self.id),
            email,
            UnsubscribeToken::from_string(self.token),
            self.created_at,
            self.updated_at,
            self.deleted_at,
        ))
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_active_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscription>, InfraError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, email, token, created_at, updated_at, deleted_at
            FROM newsletters
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(NewsletterRow::into_entity).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_active_by_token(
        &self,
        token: &UnsubscribeToken,
    ) -> Result<Option<Subscription>, InfraError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, email, token, created_at, updated_at, deleted_at
            FROM newsletters
            WHERE token = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(NewsletterRow::into_entity).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %subscription.id()))]
    async fn insert(&self, subscription: &Subscription) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO newsletters (id, email, token, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscription.id().as_uuid())
        .bind(subscription.email().as_str())
        .bind(subscription.token().as_str())
        .bind(subscription.created_at())
        .bind(subscription.updated_at())
        .bind(subscription.deleted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| InfraError::from_write(e, "Subscription", subscription.email().as_str()))?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn soft_delete(
        &self,
        id: &SubscriptionId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE newsletters
            SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(page = request.page(), size = request.size()))]
    async fn find_active_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Subscription>, InfraError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM newsletters
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, email, token, created_at, updated_at, deleted_at
            FROM newsletters
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(request.offset())
        .bind(request.limit())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(NewsletterRow::into_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total))
    }
}

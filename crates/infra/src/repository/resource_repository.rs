//! # ResourceRepository
//!
//! 多言語リソースの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **論理削除**: 削除は `deleted_at` を設定するだけで行は残す
//! - **有効行のみ参照**: ID / キー+言語 / 言語 / ページ取得のすべてで
//!   `deleted_at IS NULL` を条件に含める
//! - **更新は行全体の上書き**: 楽観ロックは持たず、後勝ちとする

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailhub_domain::{
    DomainError,
    pagination::{Page, PageRequest},
    resource::{LangCode, Resource, ResourceId, ResourceKey, ResourceValue},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 多言語リソースリポジトリトレイト
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// ID で有効なリソースを検索する
    async fn find_active_by_id(&self, id: &ResourceId) -> Result<Option<Resource>, InfraError>;

    /// キーと言語コードで有効なリソースを検索する
    async fn find_active_by_key_and_lang(
        &self,
        key: &ResourceKey,
        lang_code: &LangCode,
    ) -> Result<Option<Resource>, InfraError>;

    /// 言語コードに属する有効なリソースをキー順で取得する
    async fn find_active_by_lang(&self, lang_code: &LangCode) -> Result<Vec<Resource>, InfraError>;

    /// 有効なリソースを作成日時の降順でページ取得する
    async fn find_active_page(&self, request: &PageRequest) -> Result<Page<Resource>, InfraError>;

    /// リソースを挿入する
    ///
    /// 有効な行と (key, lang_code) が重複した場合は Conflict を返す。
    async fn insert(&self, resource: &Resource) -> Result<(), InfraError>;

    /// リソースを上書き保存する
    ///
    /// 対象の有効な行が存在しなかった場合は `false` を返す。
    async fn update(&self, resource: &Resource) -> Result<bool, InfraError>;

    /// リソースを論理削除する
    ///
    /// 対象の有効な行が存在しなかった場合は `false` を返す。
    async fn soft_delete(&self, id: &ResourceId, now: DateTime<Utc>) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の ResourceRepository
#[derive(Debug, Clone)]
pub struct PostgresResourceRepository {
    pool: PgPool,
}

impl PostgresResourceRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// resources テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id:         Uuid,
    key:        String,
    value:      String,
    lang_code:  String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ResourceRow {
    fn into_entity(self) -> Result<Resource, InfraError> {
        let corrupted =
            |e: DomainError| InfraError::unexpected(format!("不正なリソースが保存されています: {e}"));

        Ok(Resource::from_db(
            ResourceId::from_uuid(self.id),
            ResourceKey::new(self.key).map_err(corrupted)?,
            ResourceValue::new(self.value).map_err(corrupted)?,
            LangCode::new(self.lang_code).map_err(corrupted)?,
            self.created_at,
            self.updated_at,
            self.deleted_at,
        ))
    }
}

fn into_entities(rows: Vec<ResourceRow>) -> Result<Vec<Resource>, InfraError> {
    rows.into_iter().map(ResourceRow::into_entity).collect()
}

#[async_trait]
impl ResourceRepository for PostgresResourceRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_active_by_id(&self, id: &ResourceId) -> Result<Option<Resource>, InfraError> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, key, value, lang_code, created_at, updated_at, deleted_at
            FROM resources
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResourceRow::into_entity).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%key, %lang_code))]
    async fn find_active_by_key_and_lang(
        &self,
        key: &ResourceKey,
        lang_code: &LangCode,
    ) -> Result<Option<Resource>, InfraError> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, key, value, lang_code, created_at, updated_at, deleted_at
            FROM resources
            WHERE key = $1 AND lang_code = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(key.as_str())
        .bind(lang_code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResourceRow::into_entity).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%lang_code))]
    async fn find_active_by_lang(&self, lang_code: &LangCode) -> Result<Vec<Resource>, InfraError> {
        let rows = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, key, value, lang_code, created_at, updated_at, deleted_at
            FROM resources
            WHERE lang_code = $1 AND deleted_at IS NULL
            ORDER BY key ASC
            "#,
        )
        .bind(lang_code.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_entities(rows)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(page = request.page(), size = request.size()))]
    async fn find_active_page(&self, request: &PageRequest) -> Result<Page<Resource>, InfraError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM resources
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT id, key, value, lang_code, created_at, updated_at, deleted_at
            FROM resources
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

        Ok(Page::new(into_entities(rows)?, total))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %resource.id()))]
    async fn insert(&self, resource: &Resource) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO resources (id, key, value, lang_code, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(resource.id().as_uuid())
        .bind(resource.key().as_str())
        .bind(resource.value().as_str())
        .bind(resource.lang_code().as_str())
        .bind(resource.created_at())
        .bind(resource.updated_at())
        .bind(resource.deleted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            InfraError::from_write(
                e,
                "Resource",
                format!("{}/{}", resource.key(), resource.lang_code()),
            )
        })?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %resource.id()))]
    async fn update(&self, resource: &Resource) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE resources
            SET key = $2, value = $3, lang_code = $4, updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(resource.id().as_uuid())
        .bind(resource.key().as_str())
        .bind(resource.value().as_str())
        .bind(resource.lang_code().as_str())
        .bind(resource.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            InfraError::from_write(
                e,
                "Resource",
                format!("{}/{}", resource.key(), resource.lang_code()),
            )
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn soft_delete(&self, id: &ResourceId, now: DateTime<Utc>) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE resources
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfraErrorKind;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresResourceRepository>();
        assert_send_sync::<Box<dyn ResourceRepository>>();
    }

    #[test]
    fn test_空のキーを持つ行は予期しないエラーになる() {
        let now = Utc::now();
        let row = ResourceRow {
            id:         Uuid::new_v4(),
            key:        String::new(),
            value:      "hello".to_string(),
            lang_code:  "en".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let err = row.into_entity().unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::Unexpected(_)));
    }
}

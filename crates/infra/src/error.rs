//! # インフラ層エラー
//!
//! PostgreSQL へのアクセスで発生するエラー。
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）に加えて、生成した時点の
//! [`SpanTrace`] を持つ。500 を返すときにハンドラがこれをログに出すため、
//! どのリポジトリ操作で失敗したかを追える（`tracing_error::ErrorLayer` の登録が必要）。
//!
//! 部分ユニークインデックス違反だけは `Conflict` に分け、ユースケース層が
//! 409 として扱えるようにする。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// クエリの実行失敗・接続エラー
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    #[error("マイグレーションエラー: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// 有効な行と自然キー（email、key + lang_code）が重複した
    #[error("{entity} が重複しています: {key}")]
    Conflict { entity: String, key: String },

    /// 保存済みの行をドメインモデルに復元できないなど
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn conflict(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Conflict {
            entity: entity.into(),
            key:    key.into(),
        })
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(message.into()))
    }

    /// INSERT / UPDATE の失敗を変換する
    ///
    /// 一意制約違反は `Conflict`（`entity` と `key` はログ用）、それ以外は `Database`。
    pub(crate) fn from_write(source: sqlx::Error, entity: &str, key: impl Into<String>) -> Self {
        match source.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Self::conflict(entity, key),
            _ => source.into(),
        }
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 一意制約違反なら `(entity, key)` を返す
    pub fn as_conflict(&self) -> Option<(&str, &str)> {
        match &self.kind {
            InfraErrorKind::Conflict { entity, key } => Some((entity, key)),
            _ => None,
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self::new(InfraErrorKind::Database(source))
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        Self::new(InfraErrorKind::Migration(source))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    #[test]
    fn test_生成時のスパンがspan_traceに残る() {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        let span = tracing::info_span!("insert_subscription");
        let _enter = span.enter();

        let from_sqlx: InfraError = sqlx::Error::PoolTimedOut.into();
        let conflict = InfraError::conflict("Subscription", "reader@example.com");

        assert!(from_sqlx.span_trace().to_string().contains("insert_subscription"));
        assert!(conflict.span_trace().to_string().contains("insert_subscription"));
    }

    #[test]
    fn test_制約違反以外の書き込み失敗はdatabaseになる() {
        let err = InfraError::from_write(sqlx::Error::PoolTimedOut, "Resource", "greeting/en");

        assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
        assert!(err.as_conflict().is_none());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_conflictはエンティティとキーを返す() {
        let err = InfraError::conflict("Resource", "greeting/en");

        assert_eq!(err.as_conflict(), Some(("Resource", "greeting/en")));
        assert_eq!(err.to_string(), "Resource が重複しています: greeting/en");
    }

    #[test]
    fn test_unexpectedはconflictとして扱われない() {
        let err = InfraError::unexpected("broken row");

        assert!(err.as_conflict().is_none());
        assert!(err.source().is_none());
    }
}

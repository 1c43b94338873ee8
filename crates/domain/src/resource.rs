//! # 多言語リソース
//!
//! キーと言語コードの組で引く文字列テーブル（i18n）のエントリを定義する。
//!
//! ## 不変条件
//!
//! - 有効な行は (key, lang_code) ごとに高々 1 件
//! - 更新で変わるのは value と updated_at のみ。id / key / lang_code は不変
//!
//! ## ライフサイクル
//!
//! ```text
//! Active --(update value)--> Active
//! Active --(soft delete)---> Deleted
//! ```

use chrono::{DateTime, Utc};

use crate::DomainError;

define_uuid_id! {
    /// リソース ID
    pub struct ResourceId;
}

define_validated_string! {
    /// リソースキー（例: `"greeting"`, `"checkout.title"`）
    pub struct ResourceKey {
        label: "key",
        max_length: 255,
    }
}

define_validated_string! {
    /// 言語コード（例: `"en"`, `"ja"`, `"pt-BR"`）
    pub struct LangCode {
        label: "lang_code",
        max_length: 16,
    }
}

/// リソースの値
///
/// 任意長のテキスト。前後の空白も値の一部として保持するため trim しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceValue(String);

impl ResourceValue {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::Validation("value is required".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 多言語リソース
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id:         ResourceId,
    key:        ResourceKey,
    value:      ResourceValue,
    lang_code:  LangCode,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// 新しいリソースを作成する
    ///
    /// # 引数
    ///
    /// - `key`: リソースキー
    /// - `value`: 値
    /// - `lang_code`: 言語コード
    /// - `now`: 現在日時（呼び出し元から注入）
    pub fn new(
        key: ResourceKey,
        value: ResourceValue,
        lang_code: LangCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            key,
            value,
            lang_code,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// 既存のデータからリソースを復元する（データベースから取得時）
    pub fn from_db(
        id: ResourceId,
        key: ResourceKey,
        value: ResourceValue,
        lang_code: LangCode,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            key,
            value,
            lang_code,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn value(&self) -> &ResourceValue {
        &self.value
    }

    pub fn lang_code(&self) -> &LangCode {
        &self.lang_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    // 不変更新メソッド

    /// 値を差し替える
    pub fn with_value(self, value: ResourceValue, now: DateTime<Utc>) -> Self {
        Self {
            value,
            updated_at: now,
            ..self
        }
    }

    /// 論理削除したリソースを返す
    pub fn deleted(self, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            deleted_at: Some(now),
            ..self
        }
    }
}

//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//! | `Conflict` | 409 Conflict | 自然キー（email / key+lang_code）の重複 |
//!
//! `Validation` と `Conflict` が保持するメッセージはそのままクライアントに返るため英語で書く。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 不正なフォーマット
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// 論理削除済みの行も「存在しない」として扱う。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Subscription", "Resource" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    ///
    /// 有効な行と自然キーが重複する場合に使用する。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}

impl DomainError {
    /// クライアントに返すメッセージ部分を取り出す
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) => msg.clone(),
            Self::NotFound { entity_type, .. } => format!("{entity_type} not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validationのmessageは内側の文言をそのまま返す() {
        let err = DomainError::Validation("key is required".to_string());

        assert_eq!(err.message(), "key is required");
    }

    #[test]
    fn test_not_foundのmessageはエンティティ種別を含む() {
        let err = DomainError::NotFound {
            entity_type: "Resource",
            id:          "42".to_string(),
        };

        assert_eq!(err.message(), "Resource not found");
        assert_eq!(err.to_string(), "Resource が見つかりません: 42");
    }
}

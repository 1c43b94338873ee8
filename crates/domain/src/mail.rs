//! # メール
//!
//! トランザクションメールのドメインモデルを定義する。
//!
//! [`Mail`] はリクエストごとに組み立てられ、送信を試みた後に破棄される。
//! 永続化はしない。

use std::sync::LazyLock;

use derive_more::Constructor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DomainError;

/// メールアドレスの書式
///
/// `local@domain.tld` 形式で、TLD は英字 2 文字以上。
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| unreachable!("メールアドレスの正規表現が不正: {e}"))
});

/// 不正なメールアドレスに対するクライアント向けメッセージ
pub const INVALID_EMAIL_MESSAGE: &str = "invalid email address";

/// メールアドレス（値オブジェクト）
///
/// 生成時に書式を検証する。前後の空白は除去しない
/// （空白を含むアドレスは書式違反として扱う）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// メールアドレスを作成する
    ///
    /// # エラー
    ///
    /// 書式に一致しない場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.len() > 255 || !EMAIL_PATTERN.is_match(&value) {
            return Err(DomainError::Validation(INVALID_EMAIL_MESSAGE.to_string()));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 送信メール
///
/// `to` は検証前の生の文字列。検証するかどうかは設定次第のため、
/// 書式チェックはユースケース層で行う。
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Mail {
    pub to:      String,
    pub subject: String,
    pub body:    String,
    pub is_html: bool,
}

/// メール送信エラー
#[derive(Debug, Error)]
pub enum MailError {
    /// 宛先（または送信元）アドレスが不正
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// メッセージの組み立てに失敗
    #[error("メッセージ構築失敗: {0}")]
    Build(String),

    /// トランスポートでの送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("user@example.com")]
    #[case("first.last+tag@sub.example.co.jp")]
    #[case("a_b%c-d@example.io")]
    fn test_正しい書式のアドレスを受け付ける(#[case] input: &str) {
        let email = EmailAddress::new(input).unwrap();

        assert_eq!(email.as_str(), input);
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("user@")]
    #[case("@example.com")]
    #[case("user@example")]
    #[case("user@example.c")]
    #[case(" user@example.com")]
    fn test_不正な書式のアドレスはvalidationエラー(#[case] input: &str) {
        let result = EmailAddress::new(input);

        assert!(matches!(result, Err(DomainError::Validation(msg)) if msg == INVALID_EMAIL_MESSAGE));
    }

    #[test]
    fn test_255文字を超えるアドレスはvalidationエラー() {
        let long = format!("{}@example.com", "a".repeat(250));

        assert!(matches!(EmailAddress::new(long), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_mailのコンストラクタ() {
        let mail = Mail::new(
            "user@example.com".to_string(),
            "件名".to_string(),
            "<p>本文</p>".to_string(),
            true,
        );

        assert_eq!(mail.to, "user@example.com");
        assert!(mail.is_html);
    }

    #[test]
    fn test_invalid_addressの表示() {
        let err = MailError::InvalidAddress("foo".to_string());

        assert_eq!(err.to_string(), "invalid email address: foo");
    }
}

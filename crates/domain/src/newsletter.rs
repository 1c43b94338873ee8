//! # ニュースレター購読
//!
//! 購読者（[`Subscription`]）と購読解除トークン（[`UnsubscribeToken`]）を定義する。
//!
//! ## 不変条件
//!
//! - 有効な（論理削除されていない）購読はメールアドレスごとに高々 1 件
//! - 購読解除トークンは CSPRNG から生成した 256 bit を URL セーフ base64（パディングなし）で
//!   表現した 43 文字の文字列で、全行を通して一意
//!
//! ## ライフサイクル
//!
//! ```text
//! Active --(unsubscribe)--> Deleted
//! ```
//!
//! Deleted から Active へ戻る遷移はない。同じアドレスでの再購読は新しい行になる。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::mail::EmailAddress;

/// トークンの元になる乱数のバイト長（256 bit）
const TOKEN_BYTES: usize = 32;

define_uuid_id! {
    /// 購読 ID
    ///
    /// newsletters テーブルの主キー。INSERT 前にアプリケーション側で採番する。
    pub struct SubscriptionId;
}

/// 購読解除トークン
///
/// 購読解除リンクに埋め込む秘密値。API レスポンスには含めない。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnsubscribeToken(String);

impl UnsubscribeToken {
    /// 新しいトークンを生成する
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// 既存のトークン文字列から復元する（DB・リクエストから）
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// 秘密値なので Debug ではマスクする
impl std::fmt::Debug for UnsubscribeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UnsubscribeToken").field(&"[REDACTED]").finish()
    }
}

/// ニュースレター購読
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id:         SubscriptionId,
    email:      EmailAddress,
    token:      UnsubscribeToken,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// 新しい購読を作成する
    ///
    /// ID とトークンはここで生成する。
    pub fn new(email: EmailAddress, now: DateTime<Utc>) -> Self {
        Self {
            id: SubscriptionId::new(),
            email,
            token: UnsubscribeToken::generate(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// 既存のデータから購読を復元する（データベースから取得時）
    pub fn from_db(
        id: SubscriptionId,
        email: EmailAddress,
        token: UnsubscribeToken,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            email,
            token,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn token(&self) -> &UnsubscribeToken {
        &self.token
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

    /// 論理削除した購読を返す
    pub fn unsubscribed(self, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            deleted_at: Some(now),
            ..self
        }
    }
}

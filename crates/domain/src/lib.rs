//! # Mailhub ドメイン層
//!
//! メール送信・ニュースレター購読・多言語リソースのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`clock`] - 時刻プロバイダ
//! - [`mail`] - 送信メールとメールアドレス
//! - [`newsletter`] - ニュースレター購読と購読解除トークン
//! - [`resource`] - キー・言語コード単位の文字列リソース
//! - [`pagination`] - オフセットベースのページ指定
//!
//! ## 使用例
//!
//! ```rust
//! use mailhub_domain::{DomainError, resource::ResourceKey};
//!
//! let key = ResourceKey::new("greeting").unwrap();
//! assert_eq!(key.as_str(), "greeting");
//!
//! let error = DomainError::NotFound {
//!     entity_type: "Resource",
//!     id:          "greeting".to_string(),
//! };
//! assert!(error.to_string().contains("Resource"));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod mail;
pub mod newsletter;
pub mod pagination;
pub mod resource;

pub use error::DomainError;

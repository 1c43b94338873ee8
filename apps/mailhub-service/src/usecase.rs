//! # ユースケース層
//!
//! メール送信・ニュースレター購読・多言語リソースのビジネスルールを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・メール送信・時計を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは入出力の変換だけを行い、判定はユースケースに集約
//! - **事前チェック + DB 制約**: 自然キーの重複は事前検索で検出し、
//!   すり抜けた同時リクエストは一意制約違反を Conflict に変換して検出する

pub mod mail;
pub mod newsletter;
pub mod resource;

pub use mail::{MailUseCaseImpl, SendBulkMailInput, SendMailInput};
pub use newsletter::NewsletterUseCaseImpl;
pub use resource::{CreateResourceInput, ResourceUseCaseImpl};

//! # Mailhub インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: 購読・多言語リソースの永続化
//! - **メール送信**: SMTP / Noop による送信
//!
//! ## 依存関係
//!
//! ```text
//! mailhub-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`mailer`] - メール送信
//! - [`repository`] - リポジトリ実装

pub mod db;
pub mod error;
pub mod mailer;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::InfraError;

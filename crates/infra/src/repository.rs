//! # リポジトリ
//!
//! エンティティの永続化を担当するリポジトリの定義と PostgreSQL 実装。

pub mod newsletter_repository;
pub mod resource_repository;

pub use newsletter_repository::{NewsletterRepository, PostgresNewsletterRepository};
pub use resource_repository::{PostgresResourceRepository, ResourceRepository};

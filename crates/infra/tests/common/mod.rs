//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use mailhub_domain::{
   mail::EmailAddress,
   newsletter::Subscription,
   resource::{LangCode, Resource, ResourceKey, ResourceValue},
};

/// 基準時刻（2025-01-01T00:00:00Z）
pub fn base_time() -> DateTime<Utc> {
   Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// 基準時刻から `minutes` 分後
pub fn minutes_after(minutes: i64) -> DateTime<Utc> {
   base_time() + Duration::minutes(minutes)
}

pub fn subscription(email: &str, created_at: DateTime<Utc>) -> Subscription {
   Subscription::new(EmailAddress::new(email).unwrap(), created_at)
}

pub fn resource(key: &str, lang_code: &str, value: &str, created_at: DateTime<Utc>) -> Resource {
   Resource::new(
      ResourceKey::new(key).unwrap(),
      ResourceValue::new(value).unwrap(),
      LangCode::new(lang_code).unwrap(),
      created_at,
   )
}

//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、検証と永続化はユースケース層に委譲

pub mod health;
pub mod mail;
pub mod metrics;
pub mod newsletter;
pub mod resource;

use mailhub_domain::pagination::{DEFAULT_PAGE, DEFAULT_SIZE, PageRequest};
use serde::Deserialize;

pub use health::{ReadinessState, health_check, readiness_check};
pub use mail::{MailState, send_bulk_email, send_email};
pub use metrics::export_metrics;
pub use newsletter::{NewsletterState, list_subscribers, subscribe, unsubscribe};
pub use resource::{
   ResourceState,
   create_resource,
   delete_resource,
   get_resource,
   get_resource_by_key_and_lang,
   list_resources,
   list_resources_by_lang,
   update_resource,
};

/// 一覧 API のページ指定クエリ
///
/// 数値として解釈できない値はエラーにせず既定値に置き換える。
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
   page: Option<String>,
   size: Option<String>,
}

impl PageQuery {
   pub fn into_page_request(self) -> PageRequest {
      let parse = |value: Option<String>, default: i64| {
         value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(default)
      };
      PageRequest::new(
         parse(self.page, DEFAULT_PAGE),
         parse(self.size, DEFAULT_SIZE),
      )
   }
}

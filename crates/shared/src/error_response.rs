//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - 形式はフラットな `{ "error": "<message>" }` のみ。エラーコードやスタックトレースは返さない
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務

use serde::{Deserialize, Serialize};

/// 500 系で返す固定メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub error: String,
}

impl ErrorResponse {
   pub fn new(error: impl Into<String>) -> Self {
      Self {
         error: error.into(),
      }
   }

   /// 500 Internal Server Error
   ///
   /// 内部情報を漏らさないため固定メッセージを返す。
   pub fn internal_error() -> Self {
      Self::new(INTERNAL_ERROR_MESSAGE)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_jsonシリアライズでerrorフィールドのみを出力する() {
      let error = ErrorResponse::new("Resource not found");
      let json = serde_json::to_value(&error).unwrap();

      assert_eq!(json, serde_json::json!({ "error": "Resource not found" }));
   }

   #[test]
   fn test_internal_error_は固定メッセージを返す() {
      assert_eq!(ErrorResponse::internal_error().error, "Internal server error");
   }
}

//! # API レスポンスエンベロープ
//!
//! 参照系 API の `{ "data": T }` と、更新系 API の
//! `{ "message": "...", "data": T }` の 2 形式を提供する。

use serde::{Deserialize, Serialize};

/// 参照系 API の統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use mailhub_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// 更新系 API のレスポンス型
///
/// 操作結果のメッセージと、作成・更新されたエンティティ（任意）を返す。
/// `data` が `None` の場合はフィールドごと省略する。
///
/// ```json
/// { "message": "Resource created successfully", "data": { ... } }
/// { "message": "Email sent successfully" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse<T = ()> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data:    Option<T>,
}

impl MessageResponse<()> {
    /// メッセージのみのレスポンスを作成する
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data:    None,
        }
    }
}

impl<T> MessageResponse<T> {
    /// メッセージとデータを持つレスポンスを作成する
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data:    Some(data),
        }
    }
}

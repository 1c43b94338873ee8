//! # Mailhub 共有ユーティリティ
//!
//! サービス全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - HTTP フレームワーク（axum）には依存しない。`IntoResponse` 変換はサービス側で行う

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod observability;
pub mod paginated_response;

pub use api_response::{ApiResponse, MessageResponse};
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use paginated_response::PaginatedResponse;

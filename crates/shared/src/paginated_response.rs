//! # ページネーション付きレスポンス
//!
//! オフセットベースのページネーションに対応した API レスポンス型。

use serde::{Deserialize, Serialize};

/// ページネーション付きレスポンス
///
/// ## JSON 形式
///
/// ```json
/// {
///   "data": [...],
///   "total": 25,
///   "page": 1,
///   "size": 10,
///   "total_pages": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
   pub data:        Vec<T>,
   pub total:       i64,
   pub page:        i64,
   pub size:        i64,
   pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
   /// 総ページ数を計算してレスポンスを組み立てる
   ///
   /// `size` は 1 以上であることを呼び出し元が保証する。
   pub fn new(data: Vec<T>, total: i64, page: i64, size: i64) -> Self {
      Self {
         data,
         total,
         page,
         size,
         total_pages: total_pages(total, size),
      }
   }
}

/// 総ページ数（切り上げ）
///
/// `size` が `i64::MAX` でも溢れないよう、加算せずに計算する。
fn total_pages(total: i64, size: i64) -> i64 {
   if total <= 0 { 0 } else { (total - 1) / size + 1 }
}

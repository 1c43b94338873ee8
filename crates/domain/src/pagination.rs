//! # ページ指定
//!
//! オフセットベースのページネーションのための値オブジェクト。
//! 1 未満の page / size は既定値（1 / 10）に正規化する。

/// 既定のページ番号
pub const DEFAULT_PAGE: i64 = 1;

/// 既定のページサイズ
pub const DEFAULT_SIZE: i64 = 10;

/// 正規化済みのページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    /// ページ指定を作成する
    ///
    /// `page < 1` は 1 に、`size < 1` は 10 に置き換える。上限は設けない。
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            size: if size < 1 { DEFAULT_SIZE } else { size },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// SQL の OFFSET 値
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// SQL の LIMIT 値
    pub fn limit(&self) -> i64 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_SIZE)
    }
}

/// 1 ページ分の取得結果と、条件に一致する全件数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }

    /// 要素を変換する
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

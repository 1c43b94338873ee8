//! # 時刻プロバイダ
//!
//! 作成日時・更新日時・論理削除日時はすべて [`Clock`] から取得する。
//! 一覧は作成日時の降順に並ぶため、テストでは [`FixedClock`] を注入し、
//! 行を追加するたびに時刻を進めて並び順を決める。

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
   /// 現在時刻（UTC）
   fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 手動で進める時刻
///
/// [`advance`](FixedClock::advance) を呼ぶまで同じ時刻を返し続ける。
#[derive(Debug)]
pub struct FixedClock {
   now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self {
         now: Mutex::new(now),
      }
   }

   /// 時刻を `by` だけ進める
   pub fn advance(&self, by: Duration) {
      let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
      *now += by;
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      *self.now.lock().unwrap_or_else(PoisonError::into_inner)
   }
}

//! # PostgreSQL データベース接続管理
//!
//! データベース接続プールの作成、マイグレーション、疎通確認を行う。
//!
//! ## 設計方針
//!
//! - **接続プール**: 上限・常駐数・寿命は設定ファイルの `database` セクションで指定する
//! - **接続情報は個別フィールド**: URL を組み立てずに `PgConnectOptions` へ直接渡すため、
//!   パスワード中の記号をエスケープする必要がない
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use mailhub_infra::db::{self, DatabaseSettings};
//!
//! async fn example() -> Result<(), mailhub_infra::InfraError> {
//!     let pool = db::create_pool(&DatabaseSettings::default()).await?;
//!     db::run_migrations(&pool).await?;
//!     db::ping(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::{fmt, time::Duration};

use serde::Deserialize;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};

use crate::error::InfraError;

/// 接続取得のタイムアウト
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// データベース接続設定
///
/// 設定ファイルの `database` セクションにそのまま対応する。
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host:                   String,
    pub port:                   u16,
    pub user:                   String,
    pub password:               String,
    pub dbname:                 String,
    /// `disable` / `allow` / `prefer` / `require` / `verify-ca` / `verify-full`
    pub sslmode:                String,
    /// プールの最大接続数
    pub max_open_conns:         u32,
    /// プールに常駐させる接続数
    pub max_idle_conns:         u32,
    /// 接続の最大寿命（秒）
    pub conn_max_lifetime_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host:                   "localhost".to_string(),
            port:                   5432,
            user:                   "postgres".to_string(),
            password:               String::new(),
            dbname:                 "mailhub".to_string(),
            sslmode:                "disable".to_string(),
            max_open_conns:         100,
            max_idle_conns:         10,
            conn_max_lifetime_secs: 3600,
        }
    }
}

// パスワードをログに出さない
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime_secs", &self.conn_max_lifetime_secs)
            .finish()
    }
}

impl DatabaseSettings {
    /// sqlx の接続オプションに変換する
    ///
    /// `sslmode` が不正な場合は `sqlx::Error::Configuration` を返す。
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let ssl_mode: PgSslMode = self.sslmode.parse()?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(ssl_mode))
    }

    /// 接続プールのオプションに変換する
    ///
    /// 常駐数が最大数を超えないように丸める。
    pub fn pool_options(&self) -> PgPoolOptions {
        let max_connections = self.max_open_conns.max(1);
        PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(self.max_idle_conns.min(max_connections))
            .max_lifetime(Duration::from_secs(self.conn_max_lifetime_secs))
            .acquire_timeout(ACQUIRE_TIMEOUT)
    }
}

/// PostgreSQL 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, InfraError> {
    let options = settings.connect_options()?;
    let pool = settings.pool_options().connect_with(options).await?;
    Ok(pool)
}

/// データベースマイグレーションを実行する
///
/// `sqlx::migrate!()` マクロで埋め込まれたマイグレーションファイルを
/// 順番に適用する。適用済みのマイグレーションはスキップされる。
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// 疎通確認（Readiness Check 用）
pub async fn ping(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

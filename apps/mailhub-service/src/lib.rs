//! # Mailhub Service ライブラリ
//!
//! ルーター構築・ハンドラ・ユースケースを公開する。
//! `main.rs` はここで公開した部品を組み合わせてサーバーを起動する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod middleware;
pub mod usecase;

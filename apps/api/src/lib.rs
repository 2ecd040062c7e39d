//! # CaseGen API ライブラリ
//!
//! テストケース生成 API サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `client`: 外部 API クライアント（GitHub / OpenAI）
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラーレスポンスと認証ヘルパー
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（Trusted Host 検証、Request ID 伝播）

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;

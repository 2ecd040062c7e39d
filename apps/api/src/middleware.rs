//! # ミドルウェア
//!
//! API サーバー用のミドルウェアを提供する。

pub mod request_id;
mod trusted_host;

pub use trusted_host::{TrustedHostState, enforce_trusted_host};

//! # ルート・ヘルスチェックハンドラ
//!
//! - `GET /` — API の稼働メッセージとバージョン
//! - `GET /health` — 監視用ヘルスチェック（設定状況を含む）
//!
//! レスポンス型は [`casegen_shared::HealthResponse`] を参照。

use std::sync::Arc;

use axum::{Json, extract::State};
use casegen_shared::{ConfigurationStatus, HealthResponse};
use chrono::Utc;
use serde::Serialize;

/// ルート・ヘルスチェック共通の State
pub struct MetaState {
    pub environment:   String,
    pub configuration: ConfigurationStatus,
}

/// ルートレスポンス
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message:     String,
    pub version:     String,
    pub environment: String,
}

/// GET /
///
/// API の稼働確認用メッセージを返す。
pub async fn root(State(state): State<Arc<MetaState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message:     "Test Case Generator API is running".to_string(),
        version:     env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.clone(),
    })
}

/// GET /health
///
/// 稼働状態と設定状況（機密値を含まない真偽値のみ）を返す。
pub async fn health_check(State(state): State<Arc<MetaState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status:        "healthy".to_string(),
        version:       env!("CARGO_PKG_VERSION").to_string(),
        environment:   state.environment.clone(),
        timestamp:     Utc::now(),
        configuration: state.configuration.clone(),
    })
}

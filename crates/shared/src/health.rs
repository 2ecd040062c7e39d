//! # ヘルスチェック共通型
//!
//! `/health` エンドポイントが返すレスポンス型を提供する。
//!
//! 稼働状態に加えて、外部サービス連携に必要な設定が揃っているかを
//! `configuration` ブロックで報告する（秘密情報そのものは含めない）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// `status` はサービスの稼働状態、`version` は Cargo.toml のバージョン、
/// `timestamp` はレスポンス生成時刻（UTC）を示す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 稼働状態（`"healthy"` または `"unhealthy"`）
    pub status:        String,
    /// アプリケーションバージョン（Cargo.toml から取得）
    pub version:       String,
    /// 実行環境（`development` / `production` など）
    pub environment:   String,
    /// レスポンス生成時刻（UTC）
    pub timestamp:     DateTime<Utc>,
    /// 設定状況（秘密情報は含まない）
    pub configuration: ConfigurationStatus,
}

/// 設定状況
///
/// 各外部連携のクレデンシャルが設定済みかどうかのフラグ。
/// モニタリングやデプロイ後の疎通確認で参照する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStatus {
    /// GitHub OAuth クライアント ID が設定されている
    pub github_configured: bool,
    /// OpenAI API キーが設定されている
    pub openai_configured: bool,
    /// JWT 署名鍵がデフォルト値から変更されている
    pub jwt_configured:    bool,
}

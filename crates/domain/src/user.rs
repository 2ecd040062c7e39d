//! # GitHub ユーザー
//!
//! GitHub OAuth で認証したユーザーを表現する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: [`GitHubUserId`] は GitHub の数値 ID をラップし、
//!   他の数値と混同しないようにする
//! - **Serde 境界**: フィールド名は GitHub API `GET /user` のレスポンスと
//!   一致させ、クライアント層でそのままデシリアライズできるようにする

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// GitHub ユーザー ID（一意識別子）
///
/// GitHub が採番する数値 ID。Newtype パターンで型安全性を確保。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct GitHubUserId(i64);

impl GitHubUserId {
    /// 既存の数値 ID からユーザー ID を作成する
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// 内部の数値 ID を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// GitHub ユーザー
///
/// GitHub API `GET /user` のレスポンスに対応する。
/// `name` と `email` は GitHub 上で非公開にできるため Option とする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// GitHub の数値 ID
    pub id: GitHubUserId,
    /// ログイン名（`octocat` など）
    pub login: String,
    /// 表示名（未設定の場合は `None`）
    pub name: Option<String>,
    /// 公開メールアドレス（非公開の場合は `None`）
    pub email: Option<String>,
    /// アバター画像 URL
    pub avatar_url: String,
    /// プロフィールページ URL
    pub html_url: String,
}

impl GitHubUser {
    /// 画面表示用の名前を返す
    ///
    /// `name` が未設定の場合は `login` にフォールバックする。
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

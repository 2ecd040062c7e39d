//! # GitHub API クライアント
//!
//! OAuth コード交換とリポジトリ参照を担当する。
//!
//! ## エンドポイント
//!
//! - `POST https://github.com/login/oauth/access_token` - 認可コード交換
//! - `GET /user` - 認証ユーザー取得
//! - `GET /user/repos` - リポジトリ一覧
//! - `GET /repos/{owner}/{repo}` - リポジトリ詳細
//! - `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1` - ファイルツリー
//! - `GET /repos/{owner}/{repo}/contents/{path}` - ファイル内容

use async_trait::async_trait;
use casegen_domain::{GitHubUser, Repository};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::middleware::request_id::inject_request_id;

/// GitHub API の REST ベース URL
const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
/// OAuth トークンエンドポイントのベース URL
const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";
/// GitHub API が要求する User-Agent
const USER_AGENT: &str = "casegen-api";

/// GitHub クライアントエラー
#[derive(Debug, Clone, Error)]
pub enum GitHubError {
    /// 認可コードが無効または失効している
    #[error("認可コードが無効です")]
    InvalidCode,

    /// アクセストークンが無効（401）
    #[error("GitHub の認証に失敗しました")]
    Unauthorized,

    /// リソースが存在しない（404）
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// レート制限超過（403 + X-RateLimit-Remaining: 0）
    #[error("GitHub API のレート制限を超過しました")]
    RateLimited,

    /// GitHub が一時的に利用不可
    #[error("GitHub API が一時的に利用できません")]
    ServiceUnavailable,

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            GitHubError::ServiceUnavailable
        } else {
            GitHubError::Network(err.to_string())
        }
    }
}

// --- リクエスト/レスポンス型 ---

/// 認可コード交換リクエスト
#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    client_id:     &'a str,
    client_secret: &'a str,
    code:          &'a str,
}

/// 認可コード交換レスポンス
///
/// GitHub はエラー時も 200 を返し、`error` フィールドで失敗を通知する。
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token:      Option<String>,
    error:             Option<String>,
    error_description: Option<String>,
}

/// Git ツリーの 1 エントリ
#[derive(Debug, Clone, Deserialize)]
pub struct GitTreeEntry {
    pub path:   String,
    /// `blob`（ファイル）または `tree`（ディレクトリ）
    #[serde(rename = "type")]
    pub kind:   String,
    pub size:   Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GitTreeResponse {
    tree:      Vec<GitTreeEntry>,
    /// recursive=1 でエントリ数上限を超えた場合 true
    truncated: bool,
}

/// GitHub クライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// OAuth 認可コードをアクセストークンへ交換する
    async fn exchange_code(&self, code: &str) -> Result<String, GitHubError>;

    /// アクセストークンに紐づくユーザーを取得する
    async fn fetch_user(&self, token: &str) -> Result<GitHubUser, GitHubError>;

    /// 認証ユーザーのリポジトリ一覧を取得する（更新日時降順）
    async fn list_repositories(&self, token: &str) -> Result<Vec<Repository>, GitHubError>;

    /// リポジトリ詳細を取得する
    async fn get_repository(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, GitHubError>;

    /// ブランチのファイルツリーを再帰的に取得する
    async fn list_tree(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<GitTreeEntry>, GitHubError>;

    /// ファイル内容をテキストとして取得する
    async fn get_file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, GitHubError>;
}

/// GitHub クライアント実装
pub struct GitHubClientImpl {
    client:         reqwest::Client,
    client_id:      String,
    client_secret:  String,
    api_base_url:   String,
    oauth_base_url: String,
}

impl GitHubClientImpl {
    /// 新しい GitHubClient を作成する
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client:         reqwest::Client::new(),
            client_id:      client_id.to_string(),
            client_secret:  client_secret.to_string(),
            api_base_url:   DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
        }
    }

    /// ベース URL を差し替える（GitHub Enterprise やモックサーバー向け）
    pub fn with_base_urls(mut self, api_base_url: &str, oauth_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self.oauth_base_url = oauth_base_url.trim_end_matches('/').to_string();
        self
    }

    fn api_get(&self, token: &str, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .get(format!("{}{}", self.api_base_url, path))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        inject_request_id(builder)
    }

    /// レート制限超過かどうかを判定する
    ///
    /// GitHub はレート制限超過を 403 + `X-RateLimit-Remaining: 0` で通知する。
    fn is_rate_limited(response: &reqwest::Response) -> bool {
        response.status() == reqwest::StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == "0")
    }

    async fn error_from(response: reqwest::Response, resource: &str) -> GitHubError {
        if Self::is_rate_limited(&response) {
            return GitHubError::RateLimited;
        }
        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED => GitHubError::Unauthorized,
            reqwest::StatusCode::NOT_FOUND => GitHubError::NotFound(resource.to_string()),
            status if status.is_server_error() => GitHubError::ServiceUnavailable,
            status => {
                let body = response.text().await.unwrap_or_default();
                GitHubError::Unexpected(format!("予期しないステータス {}: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
    async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
        let url = format!("{}/login/oauth/access_token", self.oauth_base_url);
        let request = AccessTokenRequest {
            client_id:     &self.client_id,
            client_secret: &self.client_secret,
            code,
        };

        let builder = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request);
        let response = inject_request_id(builder).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "oauth/access_token").await);
        }

        let body = response.json::<AccessTokenResponse>().await?;
        match (body.access_token, body.error) {
            (Some(token), _) => Ok(token),
            (None, Some(error)) => {
                tracing::warn!(
                    oauth.error = %error,
                    oauth.error_description = body.error_description.as_deref().unwrap_or("-"),
                    "認可コード交換に失敗"
                );
                Err(GitHubError::InvalidCode)
            }
            (None, None) => {
                Err(GitHubError::Unexpected("トークン交換レスポンスが不正です".to_string()))
            }
        }
    }

    async fn fetch_user(&self, token: &str) -> Result<GitHubUser, GitHubError> {
        let response = self.api_get(token, "/user").send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "user").await);
        }

        Ok(response.json::<GitHubUser>().await?)
    }

    async fn list_repositories(&self, token: &str) -> Result<Vec<Repository>, GitHubError> {
        let response = self
            .api_get(token, "/user/repos?sort=updated&per_page=100")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "user/repos").await);
        }

        Ok(response.json::<Vec<Repository>>().await?)
    }

    async fn get_repository(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, GitHubError> {
        let resource = format!("{owner}/{repo}");
        let response = self
            .api_get(token, &format!("/repos/{owner}/{repo}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &resource).await);
        }

        Ok(response.json::<Repository>().await?)
    }

    async fn list_tree(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<GitTreeEntry>, GitHubError> {
        let resource = format!("{owner}/{repo}@{branch}");
        let response = self
            .api_get(
                token,
                &format!("/repos/{owner}/{repo}/git/trees/{branch}?recursive=1"),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &resource).await);
        }

        let body = response.json::<GitTreeResponse>().await?;
        if body.truncated {
            tracing::warn!(
                github.repo = %resource,
                "ファイルツリーが GitHub API の上限で切り詰められた"
            );
        }
        Ok(body.tree)
    }

    async fn get_file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, GitHubError> {
        let resource = format!("{owner}/{repo}:{path}");
        let builder = self
            .client
            .get(format!(
                "{}/repos/{owner}/{repo}/contents/{path}",
                self.api_base_url
            ))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            // raw メディアタイプで Base64 デコード済みの内容を受け取る
            .header(reqwest::header::ACCEPT, "application/vnd.github.raw+json");
        let response = inject_request_id(builder).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &resource).await);
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_トークン交換レスポンスのデシリアライズ_成功() {
        let json = r#"{"access_token": "gho_abc123", "token_type": "bearer", "scope": "read:user,repo"}"#;
        let body: AccessTokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(body.access_token.as_deref(), Some("gho_abc123"));
        assert_eq!(body.error, None);
    }

    #[test]
    fn test_トークン交換レスポンスのデシリアライズ_エラー() {
        let json = r#"{"error": "bad_verification_code", "error_description": "The code passed is incorrect or expired."}"#;
        let body: AccessTokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(body.access_token, None);
        assert_eq!(body.error.as_deref(), Some("bad_verification_code"));
    }

    #[test]
    fn test_gitツリーレスポンスのデシリアライズ() {
        let json = r#"{
            "sha": "abc",
            "tree": [
                {"path": "src/main.py", "type": "blob", "size": 1024},
                {"path": "src", "type": "tree"}
            ],
            "truncated": false
        }"#;
        let body: GitTreeResponse = serde_json::from_str(json).unwrap();

        assert_eq!(body.tree.len(), 2);
        assert_eq!(body.tree[0].path, "src/main.py");
        assert_eq!(body.tree[0].kind, "blob");
        assert_eq!(body.tree[0].size, Some(1024));
        assert_eq!(body.tree[1].kind, "tree");
        assert_eq!(body.tree[1].size, None);
        assert!(!body.truncated);
    }
}

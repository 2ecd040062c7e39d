//! # 統合テスト共通ヘルパー
//!
//! スタブクライアントを注入して本番と同じルーターを構築する。

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use casegen_api::{
    app_builder::build_app,
    client::{
        github::{GitHubClient, GitHubError, GitTreeEntry},
        openai::{SourceFile, TestGenError, TestGenerator},
    },
    config::AppConfig,
};
use casegen_domain::{
    GeneratedTest,
    GitHubUser,
    GitHubUserId,
    Repository,
    TestCaseSummary,
    TestCategory,
};
use casegen_infra::{Hs256TokenIssuer, TokenIssuer};
use chrono::Utc;

/// テスト用 JWT 署名鍵
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// スタブが受理する認可コード
pub const VALID_CODE: &str = "valid-test-code";

/// スタブが返す GitHub トークン
pub const STUB_GITHUB_TOKEN: &str = "gho_stub_token";

/// テスト用の設定を組み立てる
pub fn test_config() -> AppConfig {
    AppConfig {
        host:                 "127.0.0.1".to_string(),
        port:                 8000,
        environment:          "test".to_string(),
        frontend_url:         "http://localhost:3000".to_string(),
        cors_origins:         vec!["http://localhost:3000".to_string()],
        allowed_hosts:        vec!["*".to_string()],
        github_client_id:     "test-client-id".to_string(),
        github_client_secret: "test-client-secret".to_string(),
        github_redirect_uri:  "http://localhost:3000/callback".to_string(),
        openai_api_key:       "test-openai-key".to_string(),
        openai_model:         "gpt-4o-mini".to_string(),
        jwt_secret_key:       TEST_JWT_SECRET.to_string(),
    }
}

/// スタブが返すユーザー
pub fn stub_user() -> GitHubUser {
    GitHubUser {
        id:         GitHubUserId::new(583231),
        login:      "octocat".to_string(),
        name:       Some("The Octocat".to_string()),
        email:      None,
        avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".to_string(),
        html_url:   "https://github.com/octocat".to_string(),
    }
}

/// スタブが返すリポジトリ
pub fn stub_repository() -> Repository {
    serde_json::from_value(serde_json::json!({
        "id": 1296269,
        "name": "hello-world",
        "full_name": "octocat/hello-world",
        "owner": { "login": "octocat" },
        "private": false,
        "description": "My first repository",
        "html_url": "https://github.com/octocat/hello-world",
        "default_branch": "main",
        "language": "Python",
        "updated_at": "2025-06-01T12:00:00Z"
    }))
    .expect("スタブリポジトリの構築に失敗しないこと")
}

/// GitHub クライアントのスタブ
///
/// `VALID_CODE` 以外の認可コードは `InvalidCode` として拒否する。
pub struct StubGitHubClient {
    pub repositories: Vec<Repository>,
    pub tree:         Vec<GitTreeEntry>,
    pub file_content: String,
}

impl Default for StubGitHubClient {
    fn default() -> Self {
        let tree = serde_json::from_value(serde_json::json!([
            { "path": "src/main.py", "type": "blob", "size": 1024 },
            { "path": "src/util.py", "type": "blob", "size": 256 },
            { "path": "README.md", "type": "blob", "size": 512 },
            { "path": "src", "type": "tree" }
        ]))
        .expect("スタブツリーの構築に失敗しないこと");

        Self {
            repositories: vec![stub_repository()],
            tree,
            file_content: "def add(a, b):\n    return a + b\n".to_string(),
        }
    }
}

#[async_trait]
impl GitHubClient for StubGitHubClient {
    async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
        if code == VALID_CODE {
            Ok(STUB_GITHUB_TOKEN.to_string())
        } else {
            Err(GitHubError::InvalidCode)
        }
    }

    async fn fetch_user(&self, token: &str) -> Result<GitHubUser, GitHubError> {
        if token == STUB_GITHUB_TOKEN {
            Ok(stub_user())
        } else {
            Err(GitHubError::Unauthorized)
        }
    }

    async fn list_repositories(&self, _token: &str) -> Result<Vec<Repository>, GitHubError> {
        Ok(self.repositories.clone())
    }

    async fn get_repository(
        &self,
        _token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, GitHubError> {
        self.repositories
            .iter()
            .find(|r| r.full_name == format!("{owner}/{repo}"))
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("{owner}/{repo}")))
    }

    async fn list_tree(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<Vec<GitTreeEntry>, GitHubError> {
        Ok(self.tree.clone())
    }

    async fn get_file_content(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _path: &str,
    ) -> Result<String, GitHubError> {
        Ok(self.file_content.clone())
    }
}

/// 常に同じエラーを返す GitHub クライアントのスタブ
///
/// レート制限や GitHub 障害時の HTTP ステータス変換を検証する。
pub struct FailingGitHubClient {
    pub error: GitHubError,
}

#[async_trait]
impl GitHubClient for FailingGitHubClient {
    async fn exchange_code(&self, _code: &str) -> Result<String, GitHubError> {
        Err(self.error.clone())
    }

    async fn fetch_user(&self, _token: &str) -> Result<GitHubUser, GitHubError> {
        Err(self.error.clone())
    }

    async fn list_repositories(&self, _token: &str) -> Result<Vec<Repository>, GitHubError> {
        Err(self.error.clone())
    }

    async fn get_repository(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
    ) -> Result<Repository, GitHubError> {
        Err(self.error.clone())
    }

    async fn list_tree(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<Vec<GitTreeEntry>, GitHubError> {
        Err(self.error.clone())
    }

    async fn get_file_content(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _path: &str,
    ) -> Result<String, GitHubError> {
        Err(self.error.clone())
    }
}

/// テスト生成のスタブ
pub struct StubGenerator;

#[async_trait]
impl TestGenerator for StubGenerator {
    async fn generate_summaries(
        &self,
        files: &[SourceFile],
    ) -> Result<Vec<TestCaseSummary>, TestGenError> {
        Ok(files
            .iter()
            .enumerate()
            .map(|(i, file)| TestCaseSummary {
                id:          i as u32 + 1,
                title:       format!("{} の基本動作", file.path),
                description: "正常系の入出力を検証する".to_string(),
                category:    TestCategory::Unit,
                file:        file.path.clone(),
            })
            .collect())
    }

    async fn generate_test_code(
        &self,
        file: &SourceFile,
        _summary: &TestCaseSummary,
        framework: &str,
    ) -> Result<GeneratedTest, TestGenError> {
        Ok(GeneratedTest {
            file_name: format!("test_{}", file.path.rsplit('/').next().unwrap_or(&file.path)),
            framework: framework.to_string(),
            code:      "def test_add():\n    assert add(1, 2) == 3\n".to_string(),
        })
    }
}

/// 常に同じエラーを返すテスト生成のスタブ
///
/// 未設定・パース失敗時の HTTP ステータス変換を検証する。
pub struct FailingGenerator {
    pub error: TestGenError,
}

#[async_trait]
impl TestGenerator for FailingGenerator {
    async fn generate_summaries(
        &self,
        _files: &[SourceFile],
    ) -> Result<Vec<TestCaseSummary>, TestGenError> {
        Err(self.error.clone())
    }

    async fn generate_test_code(
        &self,
        _file: &SourceFile,
        _summary: &TestCaseSummary,
        _framework: &str,
    ) -> Result<GeneratedTest, TestGenError> {
        Err(self.error.clone())
    }
}

/// スタブ入りのテストアプリを構築する
pub fn build_test_app() -> Router {
    build_test_app_with(test_config(), StubGitHubClient::default(), StubGenerator)
}

/// 設定・スタブを差し替えてテストアプリを構築する
pub fn build_test_app_with(
    config: AppConfig,
    github_client: impl GitHubClient + 'static,
    generator: impl TestGenerator + 'static,
) -> Router {
    let token_issuer: Arc<dyn TokenIssuer> = Arc::new(Hs256TokenIssuer::new(config.jwt_secret_key.as_bytes()));
    build_app(
        &config,
        Arc::new(github_client),
        Arc::new(generator),
        token_issuer,
    )
}

/// テスト用の有効な Bearer トークンを発行する
pub fn issue_test_token() -> String {
    let issuer = Hs256TokenIssuer::new(TEST_JWT_SECRET.as_bytes());
    issuer
        .issue(&stub_user(), STUB_GITHUB_TOKEN, Utc::now())
        .expect("テストトークンの発行に失敗しないこと")
}

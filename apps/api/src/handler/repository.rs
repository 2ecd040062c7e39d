//! # リポジトリハンドラ
//!
//! 認証ユーザーの GitHub リポジトリ参照を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/repositories/` - リポジトリ一覧（更新日時降順）
//! - `GET /api/repositories/supported-extensions` - 対応拡張子一覧（認証不要）
//! - `GET /api/repositories/{owner}/{repo}` - リポジトリ詳細
//! - `GET /api/repositories/{owner}/{repo}/files` - 対応ファイル一覧
//!
//! `supported-extensions` 以外は Bearer トークン必須。クレーム内の
//! GitHub トークンで GitHub API を呼び出す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use casegen_domain::{RepoFile, SUPPORTED_EXTENSIONS};
use casegen_infra::TokenIssuer;
use serde::Serialize;

use crate::{client::github::GitHubClient, error::authenticate};

/// リポジトリハンドラの共有状態
pub struct RepositoryState {
    pub github_client: Arc<dyn GitHubClient>,
    pub token_issuer:  Arc<dyn TokenIssuer>,
}

// --- レスポンス型 ---

/// 対応拡張子レスポンス
#[derive(Debug, Serialize)]
pub struct SupportedExtensionsResponse {
    pub extensions: &'static [&'static str],
}

/// ファイル一覧レスポンス
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    /// `owner/repo` 形式のリポジトリ名
    pub repository:      String,
    /// 走査対象のブランチ
    pub branch:          String,
    /// ツリー内の全ファイル数（blob のみ）
    pub total_files:     usize,
    /// 対応拡張子を持つファイル数
    pub supported_files: usize,
    pub files:           Vec<RepoFile>,
}

// --- ハンドラ ---

/// GET /api/repositories/supported-extensions
///
/// テスト生成の対象となる拡張子一覧を返す。認証不要。
pub async fn supported_extensions() -> Json<SupportedExtensionsResponse> {
    Json(SupportedExtensionsResponse {
        extensions: SUPPORTED_EXTENSIONS,
    })
}

/// GET /api/repositories/
///
/// 認証ユーザーのリポジトリ一覧を更新日時降順で返す。
pub async fn list_repositories(
    State(state): State<Arc<RepositoryState>>,
    headers: HeaderMap,
) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match state.github_client.list_repositories(&claims.github_token).await {
        Ok(repositories) => Json(repositories).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/repositories/{owner}/{repo}
pub async fn get_repository(
    State(state): State<Arc<RepositoryState>>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match state
        .github_client
        .get_repository(&claims.github_token, &owner, &repo)
        .await
    {
        Ok(repository) => Json(repository).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/repositories/{owner}/{repo}/files
///
/// デフォルトブランチのファイルツリーを再帰取得し、
/// 対応拡張子のファイルだけに絞って返す。
pub async fn list_repository_files(
    State(state): State<Arc<RepositoryState>>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    let token = &claims.github_token;

    // デフォルトブランチを知るためにまず詳細を取得する
    let repository = match state.github_client.get_repository(token, &owner, &repo).await {
        Ok(repository) => repository,
        Err(e) => return e.into_response(),
    };

    let tree = match state
        .github_client
        .list_tree(token, &owner, &repo, &repository.default_branch)
        .await
    {
        Ok(tree) => tree,
        Err(e) => return e.into_response(),
    };

    let blobs: Vec<_> = tree.into_iter().filter(|e| e.kind == "blob").collect();
    let total_files = blobs.len();
    let files: Vec<RepoFile> = blobs
        .into_iter()
        .filter_map(|e| RepoFile::from_path(&e.path, e.size.unwrap_or(0)))
        .collect();

    Json(FileListResponse {
        repository:      repository.full_name,
        branch:          repository.default_branch,
        total_files,
        supported_files: files.len(),
        files,
    })
    .into_response()
}

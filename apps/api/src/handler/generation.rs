//! # テスト生成ハンドラ
//!
//! 選択されたソースファイルから LLM でテストケースを生成する。
//!
//! ## エンドポイント
//!
//! - `POST /api/test-generation/generate` - テストケースサマリーの生成
//! - `POST /api/test-generation/generate-code` - テストコードの生成
//!
//! いずれも Bearer トークン必須。ファイル内容はクレーム内の GitHub
//! トークンで取得する。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use casegen_domain::{TestCaseSummary, supported_extension};
use casegen_infra::TokenIssuer;
use casegen_shared::ErrorResponse;
use serde::{Deserialize, Serialize};

use crate::{
    client::{
        github::GitHubClient,
        openai::{SourceFile, TestGenerator, default_framework},
    },
    error::authenticate,
};

/// 1 リクエストで解析できるファイル数の上限
const MAX_FILES_PER_REQUEST: usize = 10;

/// テスト生成ハンドラの共有状態
pub struct GenerationState {
    pub github_client: Arc<dyn GitHubClient>,
    pub generator:     Arc<dyn TestGenerator>,
    pub token_issuer:  Arc<dyn TokenIssuer>,
}

// --- リクエスト/レスポンス型 ---

/// サマリー生成リクエスト
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub owner: String,
    pub repo:  String,
    /// 解析対象ファイルのパス（1〜10 件）
    pub files: Vec<String>,
}

/// サマリー生成レスポンス
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub summaries: Vec<TestCaseSummary>,
}

/// コード生成リクエスト
#[derive(Debug, Deserialize)]
pub struct GenerateCodeRequest {
    pub owner:     String,
    pub repo:      String,
    pub file:      String,
    pub summary:   TestCaseSummary,
    /// 省略時はファイル拡張子から推定する
    pub framework: Option<String>,
}

// --- ハンドラ ---

fn validation_error(detail: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::validation_error(detail)),
    )
        .into_response()
}

/// リクエストされたファイル群を検証する
///
/// 件数が 1〜10 件の範囲にあり、すべて対応拡張子を持つことを確認する。
fn validate_files(files: &[String]) -> Result<(), Response> {
    if files.is_empty() {
        return Err(validation_error("files には 1 件以上のファイルが必要です"));
    }
    if files.len() > MAX_FILES_PER_REQUEST {
        return Err(validation_error(
            "files に指定できるのは最大 10 件までです",
        ));
    }
    for path in files {
        if supported_extension(path).is_none() {
            return Err(validation_error(&format!(
                "対応していないファイルです: {path}"
            )));
        }
    }
    Ok(())
}

/// POST /api/test-generation/generate
///
/// 指定ファイルの内容を取得し、テストケースサマリーを生成する。
pub async fn generate_summaries(
    State(state): State<Arc<GenerationState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    if let Err(response) = validate_files(&req.files) {
        return response;
    }

    let mut sources = Vec::with_capacity(req.files.len());
    for path in &req.files {
        let content = match state
            .github_client
            .get_file_content(&claims.github_token, &req.owner, &req.repo, path)
            .await
        {
            Ok(content) => content,
            Err(e) => return e.into_response(),
        };
        sources.push(SourceFile {
            path:    path.clone(),
            content,
        });
    }

    match state.generator.generate_summaries(&sources).await {
        Ok(summaries) => {
            tracing::info!(
                generation.files = sources.len(),
                generation.summaries = summaries.len(),
                "テストケースサマリーを生成"
            );
            Json(GenerateResponse { summaries }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/test-generation/generate-code
///
/// サマリーに対応する完全なテストコードを生成する。
pub async fn generate_code(
    State(state): State<Arc<GenerationState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateCodeRequest>,
) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let Some(extension) = supported_extension(&req.file) else {
        return validation_error(&format!("対応していないファイルです: {}", req.file));
    };

    let content = match state
        .github_client
        .get_file_content(&claims.github_token, &req.owner, &req.repo, &req.file)
        .await
    {
        Ok(content) => content,
        Err(e) => return e.into_response(),
    };

    let framework = req
        .framework
        .unwrap_or_else(|| default_framework(extension).to_string());

    let source = SourceFile {
        path: req.file,
        content,
    };

    match state
        .generator
        .generate_test_code(&source, &req.summary, &framework)
        .await
    {
        Ok(generated) => Json(generated).into_response(),
        Err(e) => e.into_response(),
    }
}

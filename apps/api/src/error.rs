//! # エラーレスポンス変換
//!
//! クライアントエラー・トークンエラーを RFC 9457 問題詳細レスポンスへ
//! 変換する。500 系は内部情報を漏らさないよう固定メッセージを返す。

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use casegen_infra::{AccessTokenClaims, TokenError, TokenIssuer};
use casegen_shared::ErrorResponse;

use crate::client::{github::GitHubError, openai::TestGenError};

impl IntoResponse for GitHubError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            GitHubError::InvalidCode => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::unauthorized("認可コードが無効または失効しています"),
            ),
            GitHubError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::unauthorized("GitHub トークンが無効です"),
            ),
            GitHubError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::not_found(&format!("リソースが見つかりません: {resource}")),
            ),
            GitHubError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::too_many_requests("GitHub API のレート制限を超過しました"),
            ),
            GitHubError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::service_unavailable("GitHub API が一時的に利用できません"),
            ),
            GitHubError::Network(_) | GitHubError::Unexpected(_) => {
                tracing::error!(error = %self, "GitHub API 呼び出しに失敗");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::bad_gateway("GitHub API の呼び出しに失敗しました"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for TestGenError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            TestGenError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::service_unavailable("テスト生成機能が設定されていません"),
            ),
            TestGenError::Unauthorized => {
                tracing::error!("OpenAI API キーが拒否された");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::bad_gateway("テスト生成サービスの認証に失敗しました"),
                )
            }
            TestGenError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::too_many_requests("テスト生成のレート制限を超過しました"),
            ),
            TestGenError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::service_unavailable("テスト生成サービスが一時的に利用できません"),
            ),
            TestGenError::MalformedResponse(detail) => {
                tracing::error!(error = %detail, "生成結果の解析に失敗");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::bad_gateway("生成結果の解析に失敗しました"),
                )
            }
            TestGenError::Network(_) | TestGenError::Unexpected(_) => {
                tracing::error!(error = %self, "OpenAI API 呼び出しに失敗");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::bad_gateway("テスト生成サービスの呼び出しに失敗しました"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// 401 問題詳細レスポンスを組み立てる
fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::unauthorized(detail))).into_response()
}

/// `Authorization: Bearer <token>` ヘッダーからトークンを取り出す
fn extract_bearer(headers: &header::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// リクエストを認証し、アクセストークンのクレームを返す
///
/// Bearer トークンの欠落・無効・期限切れはすべて 401 問題詳細として返す。
pub fn authenticate(
    token_issuer: &dyn TokenIssuer,
    headers: &header::HeaderMap,
) -> Result<AccessTokenClaims, Response> {
    let token = extract_bearer(headers)
        .ok_or_else(|| unauthorized("Authorization ヘッダーに Bearer トークンが必要です"))?;

    token_issuer.verify(token).map_err(|err| match err {
        TokenError::Expired => unauthorized("アクセストークンの有効期限が切れています"),
        TokenError::Invalid | TokenError::Creation(_) => {
            unauthorized("アクセストークンが無効です")
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use casegen_domain::{GitHubUser, GitHubUserId};
    use casegen_infra::Hs256TokenIssuer;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn headers_with_auth(value: &str) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn test_user() -> GitHubUser {
        GitHubUser {
            id:         GitHubUserId::new(42),
            login:      "octocat".to_string(),
            name:       Some("The Octocat".to_string()),
            email:      None,
            avatar_url: "https://example.com/avatar.png".to_string(),
            html_url:   "https://github.com/octocat".to_string(),
        }
    }

    #[test]
    fn test_extract_bearer_正常なヘッダーからトークンを取り出す() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_スキーム不一致はnoneを返す() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_空トークンはnoneを返す() {
        let headers = headers_with_auth("Bearer ");
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_authenticate_有効なトークンでクレームを返す() {
        let issuer = Hs256TokenIssuer::new(b"test-secret");
        let token = issuer
            .issue(&test_user(), "gho_token", Utc::now())
            .unwrap();

        let claims = authenticate(&issuer, &headers_with_auth(&format!("Bearer {token}")))
            .expect("認証に成功すること");
        assert_eq!(claims.username, "octocat");
        assert_eq!(claims.github_token, "gho_token");
    }

    #[test]
    fn test_authenticate_ヘッダー欠落は401を返す() {
        let issuer = Hs256TokenIssuer::new(b"test-secret");
        let response = authenticate(&issuer, &header::HeaderMap::new()).unwrap_err();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_改ざんトークンは401を返す() {
        let issuer = Hs256TokenIssuer::new(b"test-secret");
        let other = Hs256TokenIssuer::new(b"other-secret");
        let token = other.issue(&test_user(), "gho_token", Utc::now()).unwrap();

        let response = authenticate(&issuer, &headers_with_auth(&format!("Bearer {token}")))
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

//! # Trusted Host 検証ミドルウェア
//!
//! `Host` ヘッダーが許可リストに含まれないリクエストを 400 で拒否する。
//! Host ヘッダーインジェクション（パスワードリセット URL の偽装等）への防御。
//!
//! ## パターン形式
//!
//! - `*` — すべてのホストを許可（検証をスキップ）
//! - `example.com` — 完全一致
//! - `*.example.com` — サブドメイン一致（`example.com` 自体は含まない）
//!
//! ポート番号は比較前に除去する（`localhost:8000` は `localhost` として評価）。

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use casegen_shared::ErrorResponse;

/// Trusted Host 検証の状態
#[derive(Clone)]
pub struct TrustedHostState {
    /// 許可する Host パターンのリスト
    pub allowed_hosts: Vec<String>,
}

/// ホストが許可リストに一致するかどうか
///
/// starlette の `TrustedHostMiddleware` と同じマッチング規則。
fn host_allowed(allowed_hosts: &[String], host: &str) -> bool {
    // ポート番号を除去する
    let host = host.split(':').next().unwrap_or(host);

    allowed_hosts.iter().any(|pattern| {
        pattern == "*"
            || pattern == host
            || (pattern.starts_with('*') && host.ends_with(&pattern[1..]))
    })
}

fn invalid_host_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request("Host ヘッダーが不正です")),
    )
        .into_response()
}

/// Trusted Host 検証ミドルウェア
///
/// 許可リストに `*` が含まれる場合は検証をスキップする。
pub async fn enforce_trusted_host(
    State(state): State<TrustedHostState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.allowed_hosts.iter().any(|p| p == "*") {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok());

    match host {
        Some(host) if host_allowed(&state.allowed_hosts, host) => next.run(request).await,
        Some(host) => {
            tracing::warn!(http.host = %host, "許可されていない Host ヘッダーを拒否");
            invalid_host_response()
        }
        None => invalid_host_response(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn allowed(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case("example.com", true)]
    #[case("example.com:8000", true)]
    #[case("evil.com", false)]
    #[case("sub.example.com", false)]
    fn test_完全一致パターン(#[case] host: &str, #[case] expected: bool) {
        assert_eq!(host_allowed(&allowed(&["example.com"]), host), expected);
    }

    #[rstest]
    #[case("api.trusted.dev", true)]
    #[case("deep.api.trusted.dev", true)]
    #[case("trusted.dev", false)]
    #[case("untrusted.dev", false)]
    fn test_ワイルドカードパターン(#[case] host: &str, #[case] expected: bool) {
        assert_eq!(host_allowed(&allowed(&["*.trusted.dev"]), host), expected);
    }

    #[test]
    fn test_アスタリスクは全ホストを許可する() {
        assert!(host_allowed(&allowed(&["*"]), "anything.example"));
        assert!(host_allowed(&allowed(&["*"]), "localhost:8000"));
    }

    #[test]
    fn test_複数パターンはいずれか一致で許可する() {
        let patterns = allowed(&["localhost", "*.example.com"]);
        assert!(host_allowed(&patterns, "localhost:8000"));
        assert!(host_allowed(&patterns, "api.example.com"));
        assert!(!host_allowed(&patterns, "example.org"));
    }
}

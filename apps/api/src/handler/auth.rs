//! # 認証ハンドラ
//!
//! GitHub OAuth によるサインインとアクセストークンの検証を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/auth/github` - GitHub 認可画面へリダイレクト
//! - `POST /api/auth/github/callback` - 認可コードをアクセストークンへ交換
//! - `GET /api/auth/user` - 現在のユーザー情報を取得
//!
//! ## OAuth state
//!
//! リダイレクト時に生成したランダム state を HttpOnly Cookie に保存し、
//! コールバックで照合する（CSRF 対策）。SPA 以外のクライアントは Cookie を
//! 持たないため、Cookie が存在する場合にのみ照合を強制する。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use casegen_domain::GitHubUser;
use casegen_infra::TokenIssuer;
use casegen_shared::ErrorResponse;
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{client::github::GitHubClient, error::authenticate};

/// OAuth state Cookie 名
const STATE_COOKIE_NAME: &str = "oauth_state";

/// state の長さ（英数字）
const STATE_LENGTH: usize = 32;

/// state Cookie の有効期間（秒）
const STATE_MAX_AGE_SECS: i64 = 600;

/// GitHub の認可エンドポイント
const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// OAuth 設定
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id:    String,
    pub redirect_uri: String,
}

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub github_client: Arc<dyn GitHubClient>,
    pub token_issuer:  Arc<dyn TokenIssuer>,
    pub oauth:         OAuthSettings,
}

// --- リクエスト/レスポンス型 ---

/// コールバックリクエスト
///
/// `state` は Cookie を持たないクライアント向けに省略可能。
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub code:  String,
    pub state: Option<String>,
}

/// コールバックレスポンス
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub access_token: String,
    pub token_type:   String,
    pub user:         GitHubUser,
}

// --- ハンドラ ---

/// GET /api/auth/github
///
/// GitHub の認可画面へ 307 リダイレクトする。
/// ランダムな state を生成し、HttpOnly Cookie として保存する。
pub async fn github_login(State(state): State<Arc<AuthState>>, jar: CookieJar) -> Response {
    if state.oauth.client_id.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::service_unavailable(
                "GitHub OAuth が設定されていません",
            )),
        )
            .into_response();
    }

    let oauth_state: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect();

    let url = url::Url::parse_with_params(AUTHORIZE_URL, &[
        ("client_id", state.oauth.client_id.as_str()),
        ("redirect_uri", state.oauth.redirect_uri.as_str()),
        ("scope", "read:user repo"),
        ("state", oauth_state.as_str()),
    ])
    .expect("認可 URL の組み立てに失敗しないこと");

    let cookie = Cookie::build((STATE_COOKIE_NAME, oauth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(STATE_MAX_AGE_SECS))
        .build();

    (jar.add(cookie), Redirect::temporary(url.as_str())).into_response()
}

/// POST /api/auth/github/callback
///
/// 認可コードをアクセストークンへ交換し、ユーザー情報と JWT を返す。
/// state Cookie が存在する場合はボディの `state` と定数時間比較で照合する。
pub async fn github_callback(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Json(req): Json<CallbackRequest>,
) -> Response {
    if let Some(expected) = jar.get(STATE_COOKIE_NAME).map(|c| c.value().to_string()) {
        let provided = req.state.as_deref().unwrap_or("");
        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            tracing::warn!("OAuth state が一致しない");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("OAuth state が一致しません")),
            )
                .into_response();
        }
    }

    let github_token = match state.github_client.exchange_code(&req.code).await {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let user = match state.github_client.fetch_user(&github_token).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    let access_token = match state.token_issuer.issue(&user, &github_token, Utc::now()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "アクセストークンの発行に失敗");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error()),
            )
                .into_response();
        }
    };

    tracing::info!(user.login = %user.login, "GitHub サインイン成功");

    // state Cookie は役目を終えたので削除する
    let jar = jar.remove(Cookie::build((STATE_COOKIE_NAME, "")).path("/").build());

    (
        jar,
        Json(CallbackResponse {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }),
    )
        .into_response()
}

/// GET /api/auth/user
///
/// Bearer トークンを検証し、クレーム内の GitHub トークンで
/// 最新のユーザー情報を取得して返す。
pub async fn current_user(State(state): State<Arc<AuthState>>, headers: HeaderMap) -> Response {
    let claims = match authenticate(state.token_issuer.as_ref(), &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match state.github_client.fetch_user(&claims.github_token).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => e.into_response(),
    }
}

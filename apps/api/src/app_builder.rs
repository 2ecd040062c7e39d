//! # アプリケーション構築
//!
//! DI（クライアント・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! クライアントとトークン発行器をトレイトオブジェクトで受け取るため、
//! 統合テストはスタブを注入して同じルーターを構築できる。

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use casegen_infra::TokenIssuer;
use casegen_shared::{
    ConfigurationStatus,
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::{github::GitHubClient, openai::TestGenerator},
    config::AppConfig,
    handler::{
        AuthState,
        GenerationState,
        MetaState,
        OAuthSettings,
        RepositoryState,
        current_user,
        generate_code,
        generate_summaries,
        get_repository,
        github_callback,
        github_login,
        health_check,
        list_repositories,
        list_repository_files,
        root,
        supported_extensions,
    },
    middleware::{TrustedHostState, enforce_trusted_host, request_id::store_request_id},
};

/// CORS レイヤーを構築する
///
/// クレデンシャル付きリクエストを許可するため、オリジンとヘッダーは
/// ワイルドカードではなく明示リストで指定する（tower-http は
/// `allow_credentials(true)` とワイルドカードの併用を許さない）。
fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// DI コンテナの構築とルーター定義を行う
///
/// 依存をトレイトオブジェクトで受け取り、State → Router の順に組み立てる。
pub fn build_app(
    config: &AppConfig,
    github_client: Arc<dyn GitHubClient>,
    generator: Arc<dyn TestGenerator>,
    token_issuer: Arc<dyn TokenIssuer>,
) -> Router {
    let meta_state = Arc::new(MetaState {
        environment:   config.environment.clone(),
        configuration: ConfigurationStatus {
            github_configured: config.github_configured(),
            openai_configured: config.openai_configured(),
            jwt_configured:    config.jwt_configured(),
        },
    });

    let auth_state = Arc::new(AuthState {
        github_client: github_client.clone(),
        token_issuer:  token_issuer.clone(),
        oauth:         OAuthSettings {
            client_id:    config.github_client_id.clone(),
            redirect_uri: config.github_redirect_uri.clone(),
        },
    });

    let repository_state = Arc::new(RepositoryState {
        github_client: github_client.clone(),
        token_issuer:  token_issuer.clone(),
    });

    let generation_state = Arc::new(GenerationState {
        github_client,
        generator,
        token_issuer,
    });

    let trusted_host_state = TrustedHostState {
        allowed_hosts: config.allowed_hosts.clone(),
    };

    // ルーター構築
    // Request ID + TraceLayer により、すべての HTTP リクエストに request_id が付与されログに自動注入される
    Router::new()
        .merge(
            Router::new()
                .route("/", get(root))
                .route("/health", get(health_check))
                .with_state(meta_state),
        )
        .merge(
            Router::new()
                .route("/api/auth/github", get(github_login))
                .route("/api/auth/github/callback", post(github_callback))
                .route("/api/auth/user", get(current_user))
                .with_state(auth_state),
        )
        .merge(
            Router::new()
                // 末尾スラッシュの有無どちらでも一覧を返す
                .route("/api/repositories", get(list_repositories))
                .route("/api/repositories/", get(list_repositories))
                .route(
                    "/api/repositories/supported-extensions",
                    get(supported_extensions),
                )
                .route("/api/repositories/{owner}/{repo}", get(get_repository))
                .route(
                    "/api/repositories/{owner}/{repo}/files",
                    get(list_repository_files),
                )
                .with_state(repository_state),
        )
        .merge(
            Router::new()
                .route("/api/test-generation/generate", post(generate_summaries))
                .route("/api/test-generation/generate-code", post(generate_code))
                .with_state(generation_state),
        )
        // CORS は trusted host より外側に置く。Host 検証で拒否される
        // レスポンスにも CORS ヘッダーが付き、プリフライトは Host に
        // 依らず CORS レイヤーが応答する
        .layer(from_fn_with_state(trusted_host_state, enforce_trusted_host))
        .layer(build_cors(&config.cors_origins))
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. CanonicalLogLineLayer: リクエスト完了時に1行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 5. store_request_id: task-local に保存し、GitHub / OpenAI へのヘッダー伝播に使用
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

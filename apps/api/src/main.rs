//! # Test Case Generator API サーバー
//!
//! GitHub リポジトリのソースコードから AI でテストケースを生成する
//! API サーバー。
//!
//! ## 役割
//!
//! - **GitHub OAuth 認証**: サインインと JWT アクセストークンの発行
//! - **リポジトリ参照**: 認証ユーザーのリポジトリ・ファイル一覧の取得
//! - **テスト生成**: 選択ファイルからのテストケースサマリー / コード生成
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Browser    │────▶│     API      │────▶│  GitHub API  │
//! │   (React)    │     │  port: 8000  │     └──────────────┘
//! └──────────────┘     │              │     ┌──────────────┐
//!                      │              │────▶│  OpenAI API  │
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `8000`） |
//! | `ENVIRONMENT` | No | 実行環境（デフォルト: `development`） |
//! | `FRONTEND_URL` | No | フロントエンドの URL（CORS とリダイレクトに使用） |
//! | `CORS_ORIGINS` | No | CORS 許可オリジン（カンマ区切り） |
//! | `ALLOWED_HOSTS` | No | 許可する Host ヘッダー（カンマ区切り、デフォルト: `*`） |
//! | `GITHUB_CLIENT_ID` | No | GitHub OAuth App のクライアント ID |
//! | `GITHUB_CLIENT_SECRET` | No | GitHub OAuth App のクライアントシークレット |
//! | `GITHUB_REDIRECT_URI` | No | OAuth コールバック URL |
//! | `OPENAI_API_KEY` | No | OpenAI API キー（未設定時はテスト生成が 503） |
//! | `OPENAI_MODEL` | No | 使用モデル（デフォルト: `gpt-4o-mini`） |
//! | `JWT_SECRET_KEY` | No | JWT 署名鍵（未設定時は開発用デフォルト + 警告） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p casegen-api
//!
//! # 本番環境（環境変数を直接指定）
//! PORT=8000 JWT_SECRET_KEY=... cargo run -p casegen-api --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use casegen_api::{
    app_builder::build_app,
    client::{github::GitHubClientImpl, openai::OpenAiTestGenerator},
    config::AppConfig,
};
use casegen_infra::{Hs256TokenIssuer, TokenIssuer};
use casegen_shared::observability::TracingConfig;
use tokio::net::TcpListener;

/// API サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. ルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("api");
    casegen_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "api").entered();

    // 設定読み込み
    let config = AppConfig::from_env();

    tracing::info!("Test Case Generator API を起動します: {}:{}", config.host, config.port);
    tracing::info!("環境: {}", config.environment);
    tracing::info!("フロントエンド URL: {}", config.frontend_url);

    if !config.jwt_configured() {
        tracing::warn!("JWT_SECRET_KEY が開発用デフォルトのままです。本番環境では必ず変更してください");
    }
    if !config.github_configured() {
        tracing::warn!("GitHub OAuth が未設定のため、サインインは利用できません");
    }
    if !config.openai_configured() {
        tracing::warn!("OPENAI_API_KEY が未設定のため、テスト生成は利用できません");
    }

    // 依存関係の初期化
    // 具象型で構築し、build_app でトレイトオブジェクトへ coerce する
    let github_client = Arc::new(GitHubClientImpl::new(
        &config.github_client_id,
        &config.github_client_secret,
    ));
    let generator = Arc::new(OpenAiTestGenerator::new(
        &config.openai_api_key,
        &config.openai_model,
    ));
    let token_issuer: Arc<dyn TokenIssuer> =
        Arc::new(Hs256TokenIssuer::new(config.jwt_secret_key.as_bytes()));

    let app = build_app(&config, github_client, generator, token_issuer);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("アドレスのパースに失敗しました");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Test Case Generator API が起動しました: {}", addr);

    // Graceful shutdown は axum::serve が自動的に処理する
    axum::serve(listener, app).await?;

    Ok(())
}

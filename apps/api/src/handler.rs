//! # HTTP ハンドラ
//!
//! ルーターごとにモジュールを分割する。
//!
//! - [`meta`] — ルート (`/`) とヘルスチェック (`/health`)
//! - [`auth`] — GitHub OAuth 認証 (`/api/auth`)
//! - [`repository`] — リポジトリ参照 (`/api/repositories`)
//! - [`generation`] — テスト生成 (`/api/test-generation`)

pub mod auth;
pub mod generation;
pub mod meta;
pub mod repository;

pub use auth::{AuthState, OAuthSettings, current_user, github_callback, github_login};
pub use generation::{GenerationState, generate_code, generate_summaries};
pub use meta::{MetaState, health_check, root};
pub use repository::{
    RepositoryState,
    get_repository,
    list_repositories,
    list_repository_files,
    supported_extensions,
};

//! # CaseGen ドメイン層
//!
//! テストケース生成システムの中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 識別子は Newtype パターンでラップし、型安全性を確保
//! - **Serde 境界**: GitHub API / OpenAI API のレスポンス形状と一致させ、
//!   クライアント層での変換コードを最小化する
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain → shared
//! ```
//!
//! ドメイン層はインフラ層（HTTP クライアント、JWT）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`user`] - GitHub ユーザー
//! - [`repository`] - リポジトリ・ソースファイル・対応拡張子
//! - [`test_case`] - テストケースサマリと生成済みテストコード

pub mod error;
pub mod repository;
pub mod test_case;
pub mod user;

pub use error::DomainError;
pub use repository::{RepoFile, RepoOwner, Repository, SUPPORTED_EXTENSIONS, supported_extension};
pub use test_case::{GeneratedTest, TestCaseSummary, TestCategory};
pub use user::{GitHubUser, GitHubUserId};

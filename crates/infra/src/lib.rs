//! # CaseGen インフラ層
//!
//! 外部システムとの境界にある技術的関心事を担当する層。
//!
//! ## 責務
//!
//! - **アクセストークン**: HS256 JWT の発行と検証
//!
//! GitHub / OpenAI への HTTP クライアントは api クレートの `client`
//! モジュールに置く（ハンドラのスタブ差し替えと同じ粒度でテストするため）。
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。

pub mod token;

pub use token::{AccessTokenClaims, Hs256TokenIssuer, TokenError, TokenIssuer};

//! # アクセストークン（HS256 JWT）
//!
//! GitHub OAuth 完了後にフロントエンドへ渡すアクセストークンの
//! 発行と検証を提供する。
//!
//! ## クレームの設計
//!
//! トークンには GitHub のアクセストークンをそのまま埋め込む。
//! サーバー側にセッションストアを持たないため、リポジトリ参照時は
//! クレーム内の GitHub トークンで上流 API を呼び出す。

use casegen_domain::user::GitHubUser;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// アクセストークンの有効期間
const TOKEN_TTL_HOURS: i64 = 24;

/// アクセストークンのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// GitHub ユーザー ID（文字列化した数値）
    pub sub: String,
    /// GitHub ログイン名
    pub username: String,
    /// GitHub アクセストークン（上流 API 呼び出しに使用）
    pub github_token: String,
    /// 発行時刻（Unix 秒）
    pub iat: i64,
    /// 有効期限（Unix 秒）
    pub exp: i64,
}

/// トークン発行・検証で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// 有効期限切れ
    #[error("トークンの有効期限が切れています")]
    Expired,

    /// 署名不一致・形式不正など
    #[error("トークンが不正です")]
    Invalid,

    /// 発行失敗（クレームのシリアライズ失敗など）
    #[error("トークンの発行に失敗しました: {0}")]
    Creation(String),
}

/// アクセストークンの発行・検証を担当するトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
pub trait TokenIssuer: Send + Sync {
    /// アクセストークンを発行する
    fn issue(
        &self,
        user: &GitHubUser,
        github_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>;

    /// アクセストークンを検証し、クレームを取り出す
    ///
    /// # Errors
    ///
    /// - 有効期限切れの場合は [`TokenError::Expired`]
    /// - 署名不一致・形式不正の場合は [`TokenError::Invalid`]
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError>;
}

/// HS256 によるトークン発行・検証の実装
pub struct Hs256TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl:          Duration,
}

impl Hs256TokenIssuer {
    /// 共有鍵からインスタンスを作成する（有効期間はデフォルトの 24 時間）
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// 有効期間を指定してインスタンスを作成する（テスト用途）
    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenIssuer for Hs256TokenIssuer {
    fn issue(
        &self,
        user: &GitHubUser,
        github_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            username: user.login.clone(),
            github_token: github_token.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        Ok(data.claims)
    }
}

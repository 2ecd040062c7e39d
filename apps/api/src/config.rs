//! # API サーバー設定
//!
//! 環境変数から API サーバーの設定を読み込む。
//!
//! GitHub / OpenAI のクレデンシャルは未設定でも起動できる
//! （`/health` の `configuration` ブロックで未設定を報告する）。

use std::env;

/// 開発用のデフォルト JWT 署名鍵
///
/// この値のまま運用してはいけない。`/health` は `jwt_configured: false` を報告し、
/// 起動時に WARN ログが出力される。
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 実行環境（`development` / `production` など）
    pub environment: String,
    /// フロントエンドの URL（CORS とリダイレクト先のデフォルト）
    pub frontend_url: String,
    /// CORS 許可オリジン
    pub cors_origins: Vec<String>,
    /// 許可する Host ヘッダー（`*` で全許可、`*.example.com` 形式に対応）
    pub allowed_hosts: Vec<String>,
    /// GitHub OAuth アプリのクライアント ID
    pub github_client_id: String,
    /// GitHub OAuth アプリのクライアントシークレット
    pub github_client_secret: String,
    /// OAuth コールバック先（フロントエンドの `/callback` ページ）
    pub github_redirect_uri: String,
    /// OpenAI API キー
    pub openai_api_key: String,
    /// 使用する OpenAI モデル
    pub openai_model: String,
    /// JWT 署名鍵
    pub jwt_secret_key: String,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|_| vec![frontend_url.clone()]);

        let allowed_hosts = env::var("ALLOWED_HOSTS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let github_redirect_uri = env::var("GITHUB_REDIRECT_URI")
            .unwrap_or_else(|_| format!("{frontend_url}/callback"));

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT は有効なポート番号である必要があります"),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            frontend_url,
            cors_origins,
            allowed_hosts,
            github_client_id: env::var("GITHUB_CLIENT_ID").unwrap_or_default(),
            github_client_secret: env::var("GITHUB_CLIENT_SECRET").unwrap_or_default(),
            github_redirect_uri,
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            jwt_secret_key: env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
        }
    }

    /// 開発環境かどうか
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// GitHub OAuth のクレデンシャルが設定されているか
    pub fn github_configured(&self) -> bool {
        !self.github_client_id.is_empty()
    }

    /// OpenAI API キーが設定されているか
    pub fn openai_configured(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    /// JWT 署名鍵がデフォルト値から変更されているか
    pub fn jwt_configured(&self) -> bool {
        self.jwt_secret_key != DEFAULT_JWT_SECRET
    }
}

/// カンマ区切りの環境変数をリストにパースする
///
/// 各要素は前後の空白を除去し、空要素は捨てる。
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    // テスト間で環境変数の競合を避けるため、
    // 純粋なパース関数とフラグ判定のみを検証する

    use pretty_assertions::assert_eq;

    use super::*;

    fn config_with(jwt: &str, github: &str, openai: &str) -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            allowed_hosts: vec!["*".to_string()],
            github_client_id: github.to_string(),
            github_client_secret: String::new(),
            github_redirect_uri: "http://localhost:3000/callback".to_string(),
            openai_api_key: openai.to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            jwt_secret_key: jwt.to_string(),
        }
    }

    #[test]
    fn test_parse_listがカンマ区切りを分割する() {
        assert_eq!(
            parse_list("http://localhost:3000, https://app.example.com"),
            vec![
                "http://localhost:3000".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_listが空要素を捨てる() {
        assert_eq!(parse_list("a,,b, ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_list(""), Vec::<String>::new());
    }

    #[test]
    fn test_jwt_configuredはデフォルト鍵のときfalse() {
        assert!(!config_with(DEFAULT_JWT_SECRET, "", "").jwt_configured());
        assert!(config_with("real-secret", "", "").jwt_configured());
    }

    #[test]
    fn test_github_configuredはclient_id未設定のときfalse() {
        assert!(!config_with("s", "", "").github_configured());
        assert!(config_with("s", "Iv1.abc", "").github_configured());
    }

    #[test]
    fn test_openai_configuredはキー未設定のときfalse() {
        assert!(!config_with("s", "", "").openai_configured());
        assert!(config_with("s", "", "sk-test").openai_configured());
    }

    #[test]
    fn test_is_developmentの判定() {
        let mut config = config_with("s", "", "");
        assert!(config.is_development());
        config.environment = "production".to_string();
        assert!(!config.is_development());
    }
}

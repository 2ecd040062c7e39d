//! # OpenAI テスト生成クライアント
//!
//! Chat Completions API でテストケースサマリーとテストコードを生成する。
//!
//! LLM には JSON での応答を指示するが、実際にはマークダウンのコード
//! フェンスで包まれて返ることがあるため、パース前にフェンスを除去する。

use async_trait::async_trait;
use casegen_domain::{GeneratedTest, TestCaseSummary, TestCategory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::middleware::request_id::inject_request_id;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// テスト生成エラー
#[derive(Debug, Clone, Error)]
pub enum TestGenError {
    /// API キーが設定されていない
    #[error("OpenAI API キーが設定されていません")]
    NotConfigured,

    /// API キーが無効（401）
    #[error("OpenAI の認証に失敗しました")]
    Unauthorized,

    /// レート制限超過（429）
    #[error("OpenAI API のレート制限を超過しました")]
    RateLimited,

    /// OpenAI が一時的に利用不可
    #[error("OpenAI API が一時的に利用できません")]
    ServiceUnavailable,

    /// LLM の応答を期待する JSON として解釈できなかった
    #[error("生成結果の解析に失敗しました: {0}")]
    MalformedResponse(String),

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for TestGenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            TestGenError::ServiceUnavailable
        } else {
            TestGenError::Network(err.to_string())
        }
    }
}

/// 生成対象のソースファイル
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path:    String,
    pub content: String,
}

/// テスト生成トレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait TestGenerator: Send + Sync {
    /// ソースファイル群からテストケースサマリーを生成する
    async fn generate_summaries(
        &self,
        files: &[SourceFile],
    ) -> Result<Vec<TestCaseSummary>, TestGenError>;

    /// サマリーに対応する完全なテストコードを生成する
    async fn generate_test_code(
        &self,
        file: &SourceFile,
        summary: &TestCaseSummary,
        framework: &str,
    ) -> Result<GeneratedTest, TestGenError>;
}

// --- Chat Completions DTO ---

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role:    &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model:       &'a str,
    messages:    Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

// --- LLM 応答ペイロード ---

#[derive(Debug, Deserialize)]
struct SummariesPayload {
    summaries: Vec<RawSummary>,
}

/// LLM が返すサマリー 1 件
///
/// `category` は指示どおりに返らないことがある（`edge_case` や大文字など）
/// ため文字列で受けて正規化する。
#[derive(Debug, Deserialize)]
struct RawSummary {
    id:          Option<u32>,
    title:       String,
    description: String,
    category:    Option<String>,
    file:        Option<String>,
}

#[derive(Debug, Deserialize)]
struct CodePayload {
    file_name: Option<String>,
    framework: Option<String>,
    code:      String,
}

/// LLM 応答からコードフェンスを除去する
///
/// ````` ```json ... ``` ````` または ````` ``` ... ``` ````` で包まれた
/// 本文を取り出す。フェンスがなければそのまま返す。
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 言語タグ（json 等）を 1 行目として読み飛ばす
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// LLM が返したカテゴリー文字列を [`TestCategory`] へ正規化する
///
/// 大文字小文字とアンダースコアの揺れを許容し、解釈不能なら `Unit` に倒す。
fn normalize_category(raw: Option<&str>) -> TestCategory {
    raw.map(|s| s.trim().to_ascii_lowercase().replace('_', "-"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(TestCategory::Unit)
}

/// ファイル拡張子からデフォルトのテストフレームワークを推定する
pub fn default_framework(extension: &str) -> &'static str {
    match extension {
        ".py" => "pytest",
        ".js" | ".jsx" | ".ts" | ".tsx" => "jest",
        ".rs" => "cargo test",
        ".go" => "go test",
        ".java" | ".kt" | ".scala" => "junit",
        ".rb" => "rspec",
        ".cs" => "xunit",
        ".php" => "phpunit",
        ".swift" => "xctest",
        _ => "generic",
    }
}

/// OpenAI によるテスト生成実装
pub struct OpenAiTestGenerator {
    client:   reqwest::Client,
    api_key:  String,
    model:    String,
    base_url: String,
}

impl OpenAiTestGenerator {
    /// 新しい OpenAiTestGenerator を作成する
    ///
    /// `api_key` が空の場合、各メソッドは [`TestGenError::NotConfigured`] を返す。
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client:   reqwest::Client::new(),
            api_key:  api_key.to_string(),
            model:    model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// ベース URL を差し替える（互換 API やモックサーバー向け）
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Chat Completions を 1 回呼び出し、応答本文を返す
    async fn complete(&self, system: &str, user: String) -> Result<String, TestGenError> {
        if self.api_key.is_empty() {
            return Err(TestGenError::NotConfigured);
        }

        let request = ChatRequest {
            model:       &self.model,
            messages:    vec![
                ChatMessage {
                    role:    "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role:    "user",
                    content: user,
                },
            ],
            temperature: 0.2,
        };

        let builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request);
        let response = inject_request_id(builder).send().await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.json::<ChatResponse>().await?;
                body.choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| {
                        TestGenError::MalformedResponse("choices が空です".to_string())
                    })
            }
            reqwest::StatusCode::UNAUTHORIZED => Err(TestGenError::Unauthorized),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(TestGenError::RateLimited),
            status if status.is_server_error() => Err(TestGenError::ServiceUnavailable),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(TestGenError::Unexpected(format!(
                    "予期しないステータス {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait]
impl TestGenerator for OpenAiTestGenerator {
    async fn generate_summaries(
        &self,
        files: &[SourceFile],
    ) -> Result<Vec<TestCaseSummary>, TestGenError> {
        let system = "You are an expert software test engineer. \
                      Respond with JSON only, no prose.";

        let mut user = String::from(
            "Analyze the following source files and propose test cases.\n\
             Respond with a JSON object of the form:\n\
             {\"summaries\": [{\"id\": 1, \"title\": ..., \"description\": ..., \
             \"category\": \"unit\" | \"integration\" | \"edge-case\", \
             \"file\": <source file path>}]}\n\n",
        );
        for file in files {
            user.push_str(&format!("--- {} ---\n{}\n\n", file.path, file.content));
        }

        let content = self.complete(system, user).await?;
        let payload: SummariesPayload = serde_json::from_str(strip_code_fences(&content))
            .map_err(|e| TestGenError::MalformedResponse(e.to_string()))?;

        let fallback_file = files.first().map(|f| f.path.clone()).unwrap_or_default();
        let summaries = payload
            .summaries
            .into_iter()
            .enumerate()
            .map(|(i, raw)| TestCaseSummary {
                id:          raw.id.unwrap_or(i as u32 + 1),
                title:       raw.title,
                description: raw.description,
                category:    normalize_category(raw.category.as_deref()),
                file:        raw.file.unwrap_or_else(|| fallback_file.clone()),
            })
            .collect();
        Ok(summaries)
    }

    async fn generate_test_code(
        &self,
        file: &SourceFile,
        summary: &TestCaseSummary,
        framework: &str,
    ) -> Result<GeneratedTest, TestGenError> {
        let system = "You are an expert software test engineer. \
                      Respond with JSON only, no prose.";

        let user = format!(
            "Write a complete, runnable test file using {framework}.\n\
             Test case: {title}\n\
             Description: {description}\n\
             Category: {category}\n\
             Respond with a JSON object of the form:\n\
             {{\"file_name\": ..., \"framework\": ..., \"code\": ...}}\n\n\
             --- {path} ---\n{content}\n",
            title = summary.title,
            description = summary.description,
            category = summary.category,
            path = file.path,
            content = file.content,
        );

        let content = self.complete(system, user).await?;
        let payload: CodePayload = serde_json::from_str(strip_code_fences(&content))
            .map_err(|e| TestGenError::MalformedResponse(e.to_string()))?;

        Ok(GeneratedTest {
            file_name: payload
                .file_name
                .unwrap_or_else(|| default_test_file_name(&file.path)),
            framework: payload.framework.unwrap_or_else(|| framework.to_string()),
            code:      payload.code,
        })
    }
}

/// ソースファイルパスからテストファイル名のデフォルトを組み立てる
///
/// 例: `src/calc.py` → `test_calc.py`
fn default_test_file_name(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    format!("test_{name}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("{\"a\": 1}", "{\"a\": 1}")]
    #[case("```json\n{\"a\": 1}\n```", "{\"a\": 1}")]
    #[case("```\n{\"a\": 1}\n```", "{\"a\": 1}")]
    #[case("  ```json\n{\"a\": 1}\n```  ", "{\"a\": 1}")]
    fn test_コードフェンス除去(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[rstest]
    #[case(Some("unit"), TestCategory::Unit)]
    #[case(Some("Integration"), TestCategory::Integration)]
    #[case(Some("edge_case"), TestCategory::EdgeCase)]
    #[case(Some("EDGE-CASE"), TestCategory::EdgeCase)]
    #[case(Some("performance"), TestCategory::Unit)]
    #[case(None, TestCategory::Unit)]
    fn test_カテゴリー正規化(#[case] raw: Option<&str>, #[case] expected: TestCategory) {
        assert_eq!(normalize_category(raw), expected);
    }

    #[rstest]
    #[case(".py", "pytest")]
    #[case(".ts", "jest")]
    #[case(".rs", "cargo test")]
    #[case(".scala", "junit")]
    #[case(".h", "generic")]
    fn test_デフォルトフレームワーク推定(#[case] ext: &str, #[case] expected: &str) {
        assert_eq!(default_framework(ext), expected);
    }

    #[test]
    fn test_サマリーペイロードのデシリアライズと補完() {
        let json = r#"{
            "summaries": [
                {"title": "加算の基本動作", "description": "正の整数同士の加算を検証する", "category": "unit"},
                {"id": 5, "title": "境界値", "description": "整数オーバーフロー近傍を検証する", "category": "edge_case", "file": "src/calc.py"}
            ]
        }"#;
        let payload: SummariesPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.summaries.len(), 2);
        assert_eq!(payload.summaries[0].id, None);
        assert_eq!(payload.summaries[1].id, Some(5));
        assert_eq!(payload.summaries[1].file.as_deref(), Some("src/calc.py"));
    }

    #[test]
    fn test_デフォルトテストファイル名() {
        assert_eq!(default_test_file_name("src/calc.py"), "test_calc.py");
        assert_eq!(default_test_file_name("main.rs"), "test_main.rs");
    }
}

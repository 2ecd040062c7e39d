//! # テストケース
//!
//! LLM が生成するテストケースサマリと、その後に生成される
//! テストコードを表現する。
//!
//! ## 生成は 2 段階
//!
//! 1. ソースファイル群 → [`TestCaseSummary`] のリスト（ユーザーが選別する）
//! 2. 選別したサマリ → [`GeneratedTest`]（完全なテストファイル）

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// テストカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestCategory {
    /// 単体テスト
    Unit,
    /// 結合テスト
    Integration,
    /// 境界値・異常系テスト
    EdgeCase,
}

impl TestCategory {
    /// kebab-case の文字列表現を返す
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::EdgeCase => "edge-case",
        }
    }
}

impl std::fmt::Display for TestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TestCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit" => Ok(Self::Unit),
            "integration" => Ok(Self::Integration),
            "edge-case" => Ok(Self::EdgeCase),
            _ => Err(DomainError::Validation(format!(
                "不正なテストカテゴリ: {}",
                s
            ))),
        }
    }
}

/// テストケースサマリ
///
/// LLM が提案するテストケースの概要。ユーザーはこのリストから
/// コード生成したいケースを選ぶ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseSummary {
    /// 生成バッチ内での連番
    pub id: u32,
    /// テストケースのタイトル
    pub title: String,
    /// 何を検証するかの説明
    pub description: String,
    /// テストカテゴリ
    pub category: TestCategory,
    /// 対象ファイルのパス
    pub file: String,
}

/// 生成済みテストコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    /// 推奨ファイル名（`test_auth.py` など）
    pub file_name: String,
    /// 使用テストフレームワーク（`pytest`, `jest` など）
    pub framework: String,
    /// テストファイルの完全なソースコード
    pub code:      String,
}

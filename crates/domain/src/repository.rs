//! # リポジトリとソースファイル
//!
//! GitHub リポジトリのメタデータと、テスト生成の対象となる
//! ソースファイルを表現する。
//!
//! ## Serde 境界
//!
//! [`Repository`] / [`RepoOwner`] のフィールド名は GitHub API
//! （`GET /user/repos`, `GET /repos/{owner}/{repo}`）のレスポンスと一致させる。
//! [`RepoFile`] は git tree のエントリから対応拡張子のものだけを抽出した
//! このシステム独自の型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// テスト生成に対応するファイル拡張子
///
/// git tree のフィルタリングと `supported-extensions`
/// エンドポイントの両方から参照される唯一の定義。
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".cpp", ".c", ".h", ".cs", ".go", ".rs", ".rb",
    ".php", ".swift", ".kt", ".scala",
];

/// パスが対応拡張子を持つ場合、その拡張子を返す
///
/// 拡張子の比較は小文字に正規化して行う（`Main.JAVA` も対象になる）。
/// ドットで始まる隠しファイル（`.gitignore` など）は拡張子を持たないとみなす。
pub fn supported_extension(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit('/').next()?;
    let dot = file_name.rfind('.')?;
    if dot == 0 {
        // `.gitignore` のような隠しファイル
        return None;
    }

    let ext = file_name[dot..].to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.iter().find(|e| **e == ext).copied()
}

/// リポジトリ所有者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    /// 所有者のログイン名
    pub login: String,
}

/// GitHub リポジトリ
///
/// GitHub API のリポジトリオブジェクトの必要部分のみを持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// GitHub の数値 ID
    pub id: i64,
    /// リポジトリ名（`Hello-World`）
    pub name: String,
    /// 完全名（`octocat/Hello-World`）
    pub full_name: String,
    /// 所有者
    pub owner: RepoOwner,
    /// プライベートリポジトリかどうか
    pub private: bool,
    /// 説明文
    pub description: Option<String>,
    /// リポジトリページ URL
    pub html_url: String,
    /// デフォルトブランチ（`main` など）
    pub default_branch: String,
    /// 主要言語（GitHub の言語判定）
    pub language: Option<String>,
    /// 最終更新日時
    pub updated_at: Option<DateTime<Utc>>,
}

/// テスト生成対象のソースファイル
///
/// git tree のエントリのうち、対応拡張子を持つ blob から構築される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    /// リポジトリルートからの相対パス
    pub path:      String,
    /// ファイル名（パスの最終要素）
    pub name:      String,
    /// 拡張子（`.py` など、ドット付き）
    pub extension: String,
    /// ファイルサイズ（バイト）
    pub size:      u64,
}

impl RepoFile {
    /// パスから対応ファイルを構築する
    ///
    /// 対応拡張子を持たないパスの場合は `None` を返す。
    pub fn from_path(path: &str, size: u64) -> Option<Self> {
        let extension = supported_extension(path)?;
        let name = path.rsplit('/').next().unwrap_or(path);

        Some(Self {
            path:      path.to_string(),
            name:      name.to_string(),
            extension: extension.to_string(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("src/main.py", Some(".py"))]
    #[case("src/lib.rs", Some(".rs"))]
    #[case("app/components/Button.tsx", Some(".tsx"))]
    #[case("Main.JAVA", Some(".java"))]
    #[case("README.md", None)]
    #[case("Dockerfile", None)]
    #[case(".gitignore", None)]
    #[case("src/.hidden", None)]
    #[case("", None)]
    fn test_supported_extensionの判定(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(supported_extension(path), expected);
    }

    #[test]
    fn test_repo_fileが対応ファイルから構築される() {
        let file = RepoFile::from_path("src/services/auth.py", 2048).unwrap();

        assert_eq!(file.path, "src/services/auth.py");
        assert_eq!(file.name, "auth.py");
        assert_eq!(file.extension, ".py");
        assert_eq!(file.size, 2048);
    }

    #[test]
    fn test_repo_fileは非対応ファイルでnoneを返す() {
        assert_eq!(RepoFile::from_path("docs/guide.md", 100), None);
    }

    #[test]
    fn test_repositoryがgithub_apiレスポンスからデシリアライズできる() {
        // GitHub API `GET /repos/{owner}/{repo}` のレスポンス抜粋
        let json = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat" },
            "private": false,
            "description": "This your first repo!",
            "html_url": "https://github.com/octocat/Hello-World",
            "default_branch": "master",
            "language": "C",
            "updated_at": "2011-01-26T19:14:43Z"
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();

        assert_eq!(repo.full_name, "octocat/Hello-World");
        assert_eq!(repo.owner.login, "octocat");
        assert_eq!(repo.default_branch, "master");
        assert_eq!(repo.language.as_deref(), Some("C"));
    }
}

//! # 外部サービスクライアント
//!
//! GitHub API / OpenAI API への通信を担当する。
//! すべてトレイトで定義し、テスト時にスタブへ差し替えられるようにする。

pub mod github;
pub mod openai;

//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// Markdownの出力モード
///
/// 取り込みに成功したワークブックをどのような単位でMarkdown文書にするかを指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputMode {
    /// すべてのワークブックを1つの文書にまとめる（デフォルト）
    ///
    /// ファイル名は`combined-survey-results.md`で固定です。
    ///
    /// # 出力例
    ///
    /// ```markdown
    /// # Combined Survey Results
    ///
    /// ## Survey: feedback.xlsx
    ///
    /// # Survey Results - feedback.xlsx
    /// ...
    /// ---
    /// ```
    #[default]
    Combined,

    /// ワークブックごとに1つの文書を出力する
    ///
    /// ファイル名は元のファイル名から生成します（例: `feedback.xlsx` → `feedback.md`）。
    Separate,
}

impl OutputMode {
    /// 文字列からモードを解釈する（`combined` / `separate`、大文字小文字を区別しない）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "combined" => Some(OutputMode::Combined),
            "separate" => Some(OutputMode::Separate),
            _ => None,
        }
    }
}

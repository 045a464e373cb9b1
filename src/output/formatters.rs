//! Output Formatters Implementation
//!
//! 各出力モードの実装を提供するモジュール。

use super::transcript::TranscriptRenderer;
use crate::types::{MarkdownDocument, Upload};

/// 結合モードの文書タイトル
pub const COMBINED_TITLE: &str = "Combined Survey Results";

/// 結合モードのファイル名
pub const COMBINED_FILENAME: &str = "combined-survey-results.md";

/// 結合モード用のワークブック区切り
const SECTION_SEPARATOR: &str = "---\n\n";

/// 分割モードのフォーマッター
///
/// 取り込みに成功したワークブックごとに1つの文書を生成します。
/// 処理中・失敗のアップロードは出力しません。
pub struct SeparateFormatter;

impl SeparateFormatter {
    pub(crate) fn render(
        &self,
        uploads: &[Upload],
        renderer: &TranscriptRenderer,
    ) -> Vec<MarkdownDocument> {
        uploads
            .iter()
            .filter(|upload| upload.is_success())
            .map(|upload| {
                MarkdownDocument::new(markdown_file_name(upload.name()), renderer.render(upload))
            })
            .collect()
    }
}

/// 結合モードのフォーマッター
///
/// 常に1つの文書を生成します。区切り線の有無は入力リスト上の位置で決まり、
/// 実際に出力されたセクション数には依存しません。
/// そのため末尾のアップロードが失敗している場合、最後に出力されたセクションの後にも
/// 区切り線が残ります。
pub struct CombinedFormatter;

impl CombinedFormatter {
    pub(crate) fn render(
        &self,
        uploads: &[Upload],
        renderer: &TranscriptRenderer,
    ) -> Vec<MarkdownDocument> {
        let mut markdown = format!("# {}\n\n", COMBINED_TITLE);

        for (index, upload) in uploads.iter().enumerate() {
            if !upload.is_success() {
                continue;
            }

            markdown.push_str(&format!("## Survey: {}\n\n", upload.name()));
            markdown.push_str(&renderer.render(upload));

            // FIXME: 後続がすべて失敗の場合も区切り線が出力される（入力位置基準）
            if index < uploads.len() - 1 {
                markdown.push_str(SECTION_SEPARATOR);
            }
        }

        vec![MarkdownDocument::new(COMBINED_FILENAME, markdown)]
    }
}

/// ファイル名に使用できない文字を除去し、空白の連続をハイフン1つに置換する
///
/// 除去対象: `< > : " / \ | ? *` および制御文字（U+0000〜U+001F）
pub fn sanitize_file_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !('\u{0000}'..='\u{001F}').contains(c))
        .collect();

    let mut sanitized = String::with_capacity(stripped.len());
    let mut in_whitespace = false;
    for c in stripped.chars() {
        if is_separator_space(c) {
            if !in_whitespace {
                sanitized.push('-');
            }
            in_whitespace = true;
        } else {
            sanitized.push(c);
            in_whitespace = false;
        }
    }

    sanitized
}

/// ファイル名中で区切りとして扱う空白文字
///
/// Unicodeの空白からU+0085（NEL）を除き、U+FEFF（BOM）を加えた集合です。
fn is_separator_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{000B}' | '\u{000C}' | '\r' | ' ' | '\u{00A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

/// 元のファイル名から出力ファイル名を生成する
///
/// 末尾の`.xlsx`（大文字小文字を区別しない）を`.md`に置換してからサニタイズします。
pub fn markdown_file_name(original: &str) -> String {
    let stem_len = original.len().saturating_sub(".xlsx".len());
    let renamed = match original.get(stem_len..) {
        Some(ext) if ext.eq_ignore_ascii_case(".xlsx") => format!("{}.md", &original[..stem_len]),
        _ => original.to_string(),
    };

    sanitize_file_name(&renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Survey: Q1/2024.md"), "My-Survey-Q12024.md");
        // タブと改行は制御文字として先に除去される
        assert_eq!(sanitize_file_name("a\tb\n c"), "ab-c");
        assert_eq!(sanitize_file_name("<>:\"/\\|?*"), "");
        assert_eq!(sanitize_file_name("plain.md"), "plain.md");
    }

    #[test]
    fn test_control_characters_are_stripped_before_collapsing() {
        // \x01は除去されるので、前後の空白は1つの連続として扱われる
        assert_eq!(sanitize_file_name("a \u{1} b"), "a-b");
    }

    #[test]
    fn test_separator_space_set() {
        assert_eq!(sanitize_file_name("a\u{FEFF}b"), "a-b");
        assert_eq!(sanitize_file_name("a\u{3000}\u{00A0}b"), "a-b");
        assert_eq!(sanitize_file_name("a\u{0085}b"), "a\u{0085}b");
    }

    #[test]
    fn test_markdown_file_name() {
        assert_eq!(
            markdown_file_name("My Survey: Q1/2024.xlsx"),
            "My-Survey-Q12024.md"
        );
        assert_eq!(markdown_file_name("Results.XLSX"), "Results.md");
        assert_eq!(markdown_file_name("notes.txt"), "notes.txt");
        assert_eq!(markdown_file_name("x"), "x");
    }

    #[test]
    fn test_markdown_file_name_multibyte() {
        assert_eq!(markdown_file_name("アンケート 結果.xlsx"), "アンケート-結果.md");
        // 境界が文字の途中になる場合もパニックしない
        assert_eq!(markdown_file_name("日本"), "日本");
    }
}

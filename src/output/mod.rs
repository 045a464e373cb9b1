//! Output Module
//!
//! Markdown文字起こしエンジン。Strategy Patternで出力モードを抽象化します。
//!
//! 描画処理は決定的で、同じ入力からは常にバイト単位で同一の文書を生成します。
//! エラーを返すことはなく、処理中・失敗のアップロードは読み飛ばします。

mod archive;
mod formatters;
mod transcript;

use crate::api::OutputMode;
use crate::types::{MarkdownDocument, Upload};

pub use archive::{bundle_documents, DownloadArtifact, ARCHIVE_FILENAME};
pub use formatters::*;

use transcript::TranscriptRenderer;

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub enum BatchFormatter {
    Combined,
    Separate,
}

impl BatchFormatter {
    /// 出力モードからフォーマッターを生成
    pub fn from_mode(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Combined => BatchFormatter::Combined,
            OutputMode::Separate => BatchFormatter::Separate,
        }
    }

    /// アップロードのリストを文書のリストに変換する
    pub fn render(&self, uploads: &[Upload]) -> Vec<MarkdownDocument> {
        let renderer = TranscriptRenderer::new();
        match self {
            BatchFormatter::Combined => CombinedFormatter.render(uploads, &renderer),
            BatchFormatter::Separate => SeparateFormatter.render(uploads, &renderer),
        }
    }
}

/// アップロード1件をMarkdown文字列に変換する
///
/// 出力は常に`# Survey Results - {ファイル名}`で始まります。
///
/// # 使用例
///
/// ```rust
/// use surveymd::{render_workbook, CellValue, Sheet, Upload, WorkbookData};
///
/// let sheet = Sheet::new(vec![
///     vec![CellValue::from("Name")],
///     vec![CellValue::from("Ada")],
/// ]);
/// let upload = Upload::succeeded("feedback.xlsx", 0, WorkbookData::new().with_sheet("Sheet1", sheet));
///
/// let markdown = render_workbook(&upload);
/// assert!(markdown.starts_with("# Survey Results - feedback.xlsx"));
/// assert!(markdown.contains("**Name**: Ada"));
/// ```
pub fn render_workbook(upload: &Upload) -> String {
    TranscriptRenderer::new().render(upload)
}

/// アップロードのリストを指定モードで文書のリストに変換する
///
/// - `Separate`: 成功したアップロードごとに1文書（成功がなければ空のリスト）
/// - `Combined`: 常に1文書（成功がなければタイトルのみ）
pub fn render_batch(uploads: &[Upload], mode: OutputMode) -> Vec<MarkdownDocument> {
    BatchFormatter::from_mode(mode).render(uploads)
}

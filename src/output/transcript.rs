//! Transcript Rendering
//!
//! 1つのワークブックをMarkdownの文字起こしに変換するモジュール。
//! ヘッダー行を質問、以降の各行を参加者の回答として出力します。

use crate::formatter::CellFormatter;
use crate::types::{Sheet, Upload, WorkbookData, EMPTY_CELL};

/// ワークブック単位の文字起こしレンダラー
#[derive(Debug, Default)]
pub(crate) struct TranscriptRenderer {
    formatter: CellFormatter,
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self {
            formatter: CellFormatter::new(),
        }
    }

    /// アップロード1件をMarkdownに変換
    ///
    /// 見出しは常に出力します。本文は取り込みに成功している場合のみ出力します。
    pub fn render(&self, upload: &Upload) -> String {
        let mut markdown = format!("# Survey Results - {}\n\n", upload.name());

        if let Some(data) = upload.data() {
            self.render_workbook_body(data, &mut markdown);
        }

        markdown
    }

    fn render_workbook_body(&self, data: &WorkbookData, markdown: &mut String) {
        let multi_sheet = data.sheet_count() > 1;

        for sheet_name in data.sheet_names() {
            if multi_sheet {
                markdown.push_str(&format!("## {}\n\n", sheet_name));
            }

            match data.sheet(sheet_name) {
                Some(sheet) if sheet.len() > 1 => self.render_responses(sheet, markdown),
                Some(sheet) if sheet.len() == 1 => {
                    markdown.push_str("*Only headers found, no participant responses*\n\n");
                }
                _ => markdown.push_str("*No data found in this sheet*\n\n"),
            }
        }
    }

    fn render_responses(&self, sheet: &Sheet, markdown: &mut String) {
        // 質問文は全参加者で共通なので先に解決しておく
        let questions: Vec<(usize, String)> = sheet
            .header()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter_map(|(col_idx, header)| {
                self.formatter
                    .question_text(header)
                    .map(|text| (col_idx, text))
            })
            .collect();

        let responses = sheet.responses();
        for (participant_idx, response) in responses.iter().enumerate() {
            markdown.push_str(&format!("### Participant {}\n\n", participant_idx + 1));

            for (col_idx, question) in &questions {
                let answer = response.get(*col_idx).unwrap_or(&EMPTY_CELL);
                let formatted = self.formatter.format_answer(answer);
                markdown.push_str(&format!("**{}**: {}\n\n", question, formatted));
            }
        }

        markdown.push_str(&format!("*Total participants: {}*\n\n", responses.len()));
    }
}

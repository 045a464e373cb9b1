//! Preview Module
//!
//! アップロードしたシートの内容を確認するためのプレビュー表を構築するモジュール。
//! 文字起こしとは異なり、セルの内容は100文字に切り詰め、行数も制限します。

use std::io::Write;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::error::SurveyMdError;
use crate::formatter::CellFormatter;
use crate::types::Sheet;

/// プレビューで表示する回答行数のデフォルト値
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// シートのプレビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetPreview {
    /// ヘッダー（空のヘッダーは`Column {n}`）
    pub headers: Vec<String>,
    /// 表示する回答行（各行はヘッダーと同じ列数）
    pub rows: Vec<Vec<String>>,
    /// 回答行の総数
    pub total_rows: usize,
}

impl SheetPreview {
    /// シートからプレビューを構築する
    ///
    /// # 引数
    ///
    /// * `sheet` - 対象シート
    /// * `max_rows` - 表示する回答行の最大数
    ///
    /// # 戻り値
    ///
    /// シートに行がない場合は`None`（表示上は`No data to preview`）
    pub fn build(sheet: &Sheet, max_rows: usize) -> Option<Self> {
        let header = sheet.header()?;
        let formatter = CellFormatter::new();

        let headers: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(col_idx, cell)| formatter.preview_header(cell, col_idx))
            .collect();

        let rows = sheet
            .responses()
            .iter()
            .take(max_rows)
            .map(|row| {
                (0..headers.len())
                    .map(|col_idx| {
                        let value = row.get(col_idx).cloned().unwrap_or_default();
                        formatter.preview_cell(&value)
                    })
                    .collect()
            })
            .collect();

        Some(Self {
            headers,
            rows,
            total_rows: sheet.responses().len(),
        })
    }

    /// 表示しきれない行がある場合の注記（例: `Showing 10 of 25 rows`）
    pub fn summary(&self) -> Option<String> {
        if self.total_rows > self.rows.len() {
            Some(format!(
                "Showing {} of {} rows",
                self.rows.len(),
                self.total_rows
            ))
        } else {
            None
        }
    }

    /// プレビューをMarkdownテーブルとして出力する
    ///
    /// 列幅は表示幅（全角文字は2）で揃えます。
    pub fn render_markdown<W: Write>(&self, writer: &mut W) -> Result<(), SurveyMdError> {
        if self.headers.is_empty() {
            return Ok(());
        }

        let formatter = CellFormatter::new();
        let escape = |cells: &[String]| -> Vec<String> {
            cells.iter().map(|c| formatter.escape_table_cell(c.trim())).collect()
        };

        let header = escape(self.headers.as_slice());
        let body: Vec<Vec<String>> = self.rows.iter().map(|row| escape(row.as_slice())).collect();

        // 1. 列幅の計算（最小幅は3文字）
        let mut col_widths = vec![3; header.len()];
        for row in std::iter::once(&header).chain(body.iter()) {
            for (col_idx, cell) in row.iter().enumerate() {
                col_widths[col_idx] = col_widths[col_idx].max(cell.width());
            }
        }

        // 2. 各行の出力
        Self::write_row(writer, &header, &col_widths)?;
        let separator: Vec<String> = col_widths.iter().map(|w| "-".repeat(w + 2)).collect();
        writeln!(writer, "|{}|", separator.join("|"))?;
        for row in &body {
            Self::write_row(writer, row, &col_widths)?;
        }

        if let Some(summary) = self.summary() {
            writeln!(writer)?;
            writeln!(writer, "*{}*", summary)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// プレビューをMarkdown文字列として取得する
    pub fn to_markdown(&self) -> Result<String, SurveyMdError> {
        let mut buffer = Vec::new();
        self.render_markdown(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            SurveyMdError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// プレビューをJSONとして取得する
    pub fn to_json(&self) -> Result<String, SurveyMdError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn write_row<W: Write>(
        writer: &mut W,
        cells: &[String],
        col_widths: &[usize],
    ) -> Result<(), SurveyMdError> {
        write!(writer, "|")?;
        for (cell, width) in cells.iter().zip(col_widths) {
            let padding = width.saturating_sub(cell.width());
            write!(writer, " {}{} |", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

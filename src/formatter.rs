//! Formatter Module
//!
//! セル値のフォーマット処理を提供するモジュール。
//! 書式情報は使わず、値の種類と範囲だけで日付シリアル値を判定します。

use chrono::{Duration, NaiveDate};

use crate::types::CellValue;

/// 回答が空の場合のプレースホルダー
pub(crate) const NO_RESPONSE: &str = "*No response*";

/// プレビューでのセル内容の最大文字数
pub(crate) const PREVIEW_MAX_CHARS: usize = 100;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
/// 文字起こし（Markdown）とプレビューで規則が異なる点に注意してください。
/// Markdownには回答全文を出力し、プレビューでは表示を切り詰めます。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self {
            date_formatter: DateFormatter,
        }
    }

    /// ヘッダーセルを質問文に変換
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - トリム済みの質問文
    /// * `None` - ヘッダーが空（空文字列、空白のみ、0、false）の場合。この列は出力しない
    pub fn question_text(&self, header: &CellValue) -> Option<String> {
        if header.is_falsy() {
            return None;
        }

        let text = header.to_text().trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// 回答セルをMarkdown出力用にフォーマット
    ///
    /// - 空セル・空文字列: `*No response*`
    /// - 20000 < 数値 < 60000: 日付シリアル値として`YYYY-MM-DD HH:MM`
    /// - それ以外: 文字列化してトリム（切り詰めなし）
    pub fn format_answer(&self, answer: &CellValue) -> String {
        if answer.is_absent() {
            return NO_RESPONSE.to_string();
        }

        if let Some(serial) = answer.as_date_serial() {
            if let Some(formatted) = self.date_formatter.format(serial) {
                return formatted;
            }
        }

        answer.to_text().trim().to_string()
    }

    /// プレビュー表のヘッダーセルをフォーマット
    ///
    /// ヘッダーが空の場合は`Column {n}`（1始まり）を表示します。
    pub fn preview_header(&self, header: &CellValue, col_idx: usize) -> String {
        if header.is_falsy() {
            format!("Column {}", col_idx + 1)
        } else {
            header.to_text()
        }
    }

    /// プレビュー表のセルをフォーマット
    ///
    /// 日付シリアル値は変換し、それ以外は先頭100文字に切り詰めます。
    pub fn preview_cell(&self, value: &CellValue) -> String {
        if let Some(serial) = value.as_date_serial() {
            if let Some(formatted) = self.date_formatter.format(serial) {
                return formatted;
            }
        }

        if value.is_falsy() {
            return String::new();
        }

        value.to_text().chars().take(PREVIEW_MAX_CHARS).collect()
    }

    /// Markdownテーブル用の特殊文字をエスケープ
    pub fn escape_table_cell(&self, s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('|', "\\|")
            .replace("\r\n", "<br>")
            .replace('\n', "<br>")
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を`YYYY-MM-DD HH:MM`（UTC）に変換します。
#[derive(Debug, Default)]
pub(crate) struct DateFormatter;

/// シリアル値25569 = 1970-01-01
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

const SECONDS_PER_DAY: f64 = 86400.0;

impl DateFormatter {
    /// 日付値をフォーマット
    ///
    /// # 変換手順
    ///
    /// 1. `floor(serial - 25569)`日を1970-01-01（UTC）に加算する
    ///    （シリアル値0は1899-12-30に相当）
    /// 2. 小数部を秒に換算し（切り捨て）、時・分を求める。秒は捨てる
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - フォーマット済み日時文字列
    /// * `None` - 値が非有限、または日付計算がオーバーフローした場合
    pub fn format(&self, serial_value: f64) -> Option<String> {
        if !serial_value.is_finite() {
            return None;
        }

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        let days = (serial_value - UNIX_EPOCH_SERIAL).floor() as i64;
        let date = epoch.checked_add_signed(Duration::try_days(days)?)?;

        let fractional_day = serial_value - serial_value.floor();
        let total_seconds = (SECONDS_PER_DAY * fractional_day).floor() as u32;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;

        let datetime = date.and_hms_opt(hours, minutes, 0)?;
        Some(datetime.format("%Y-%m-%d %H:%M").to_string())
    }
}

//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};
use std::io::Cursor;
use tracing::debug;

use crate::error::SurveyMdError;
use crate::types::{CellValue, Sheet, WorkbookData};

/// ワークブックパーサー
///
/// メモリ上に読み込んだXLSXファイルを解析します。
/// 書式や数式は扱わず、セルのスカラー値のみを抽出します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `buffer` - XLSXファイル全体のバイト列
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(SurveyMdError::Parse)` - ZIPコンテナやXMLが不正な場合
    pub fn open(buffer: Vec<u8>) -> Result<Self, SurveyMdError> {
        let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer))
            .map_err(|e: XlsxError| SurveyMdError::Parse(e.into()))?;

        Ok(Self { workbook })
    }

    /// すべてのシート名を取得（ワークブック順）
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シートをパースして、セルのグリッドを抽出
    ///
    /// 先頭行をヘッダー行として扱いますが、この段階では型変換を行いません。
    /// 行はシートの使用範囲の幅に揃えられ、値のないセルは`CellValue::Empty`になります。
    pub fn parse_sheet(&mut self, sheet_name: &str) -> Result<Sheet, SurveyMdError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e: XlsxError| SurveyMdError::Parse(e.into()))?;

        Ok(Self::range_to_sheet(&range))
    }

    /// すべてのシートをパースする
    pub fn parse_all(&mut self) -> Result<WorkbookData, SurveyMdError> {
        let mut data = WorkbookData::new();

        for sheet_name in self.sheet_names() {
            let sheet = self.parse_sheet(&sheet_name)?;
            debug!(sheet = %sheet_name, rows = sheet.len(), "parsed worksheet");
            data.push_sheet(sheet_name, sheet);
        }

        Ok(data)
    }

    fn range_to_sheet(range: &Range<Data>) -> Sheet {
        let rows = range
            .rows()
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();

        Sheet::new(rows)
    }

    /// calamineのセル値をスカラー値に変換
    ///
    /// 日付書式付きのセルはシリアル値（数値）のまま扱います。
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::Error(e) => CellValue::String(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}


// 実際のXLSXファイルを使ったテストは統合テスト（tests/）で実装します。

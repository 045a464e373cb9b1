//! Parser Module
//!
//! calamineを使用したExcelファイル解析の実装。
//! メモリ上のバイト列からシート名とセルのグリッドを抽出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;

//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::IngestError;

/// 日付シリアル値とみなす数値の下限（この値を含まない）
pub(crate) const DATE_SERIAL_MIN: f64 = 20000.0;

/// 日付シリアル値とみなす数値の上限（この値を含まない）
pub(crate) const DATE_SERIAL_MAX: f64 = 60000.0;

/// セルの値を表す列挙型
///
/// スカラー値のみを扱います。数値は型付けされず、日付かどうかは
/// 描画時にヒューリスティックで判定します。
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 空セル
    #[default]
    Empty,
}

impl CellValue {
    /// 値が欠落しているか（空セルまたは空文字列）
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 値が「偽」とみなされるか（空、空文字列、0、NaN、false）
    ///
    /// ヘッダーセルやプレビューの表示判定で使用します。
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !*b,
        }
    }

    /// 日付シリアル値らしい数値であれば、その値を返す
    ///
    /// 20000より大きく60000より小さい数値を日付シリアル値とみなします。
    /// 書式情報による裏付けはありません。
    pub fn as_date_serial(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if *n > DATE_SERIAL_MIN && *n < DATE_SERIAL_MAX => Some(*n),
            _ => None,
        }
    }

    /// 値を文字列として取得（書式適用前）
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // -0も"0"として扱う
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

pub(crate) static EMPTY_CELL: CellValue = CellValue::Empty;

/// シート（行の順序付き列）
///
/// 0行目はヘッダー行（質問）、1行目以降は回答行（参加者）です。
/// 回答行の列インデックスはヘッダー行の同じ列インデックスに対応します。
/// 回答行がヘッダーより短い場合、不足するセルは空として扱います。
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// 行データからシートを生成
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// すべての行（ヘッダー行を含む）
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 行数（ヘッダー行を含む）
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 行が1つもないか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ヘッダー行（質問）
    pub fn header(&self) -> Option<&[CellValue]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// 回答行（参加者）
    pub fn responses(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// セルの値を取得（範囲外は空セル）
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// 取り込みに成功したワークブックのデータ
///
/// シート名はワークブック内の順序を保持します。シート名の一意性は
/// XLSX形式によって保証されます。
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkbookData {
    sheet_names: Vec<String>,
    sheets: HashMap<String, Sheet>,
}

impl WorkbookData {
    /// 空のワークブックデータを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを末尾に追加する
    pub fn push_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        let name = name.into();
        if self.sheets.insert(name.clone(), sheet).is_none() {
            self.sheet_names.push(name);
        }
    }

    /// ビルダー形式でシートを追加する
    pub fn with_sheet(mut self, name: impl Into<String>, sheet: Sheet) -> Self {
        self.push_sheet(name, sheet);
        self
    }

    /// シート名（ワークブック順）
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// シート名からシートを取得
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    /// シート数
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }
}

static NEXT_UPLOAD_ID: AtomicU64 = AtomicU64::new(1);

/// アップロードの識別子
///
/// プロセス内で一意です。セッション中のアップロードの生存期間にわたって変わりません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UploadId(u64);

impl UploadId {
    /// 新しい識別子を払い出す
    pub(crate) fn next() -> Self {
        Self(NEXT_UPLOAD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

/// 取り込みの状態
///
/// 遷移は`Uploading → Success`または`Uploading → Error`のみで、逆方向には戻りません。
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    /// 処理中（データなし）
    Uploading,

    /// 成功（シートデータを保持）
    Success(WorkbookData),

    /// 失敗（理由を保持）
    Error(IngestError),
}

impl UploadStatus {
    /// 状態のラベル（`uploading` / `success` / `error`）
    pub fn label(&self) -> &'static str {
        match self {
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success(_) => "success",
            UploadStatus::Error(_) => "error",
        }
    }
}

/// 1ファイル分の取り込み結果
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    id: UploadId,
    name: String,
    size: u64,
    status: UploadStatus,
}

impl Upload {
    /// 処理中のアップロードを生成（識別子を払い出す）
    pub fn uploading(name: impl Into<String>, size: u64) -> Self {
        Self {
            id: UploadId::next(),
            name: name.into(),
            size,
            status: UploadStatus::Uploading,
        }
    }

    /// 取り込み済みのワークブックからアップロードを生成
    ///
    /// パイプラインを経由せずに描画処理を利用する場合に使用します。
    pub fn succeeded(name: impl Into<String>, size: u64, data: WorkbookData) -> Self {
        let mut upload = Self::uploading(name, size);
        upload.status = UploadStatus::Success(data);
        upload
    }

    /// 失敗したアップロードを生成
    pub fn failed(name: impl Into<String>, size: u64, error: IngestError) -> Self {
        let mut upload = Self::uploading(name, size);
        upload.status = UploadStatus::Error(error);
        upload
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    /// 元のファイル名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ファイルサイズ（バイト）
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, UploadStatus::Success(_))
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.status, UploadStatus::Uploading)
    }

    /// 成功時のワークブックデータ
    pub fn data(&self) -> Option<&WorkbookData> {
        match &self.status {
            UploadStatus::Success(data) => Some(data),
            _ => None,
        }
    }

    /// 失敗時のエラー
    pub fn error(&self) -> Option<&IngestError> {
        match &self.status {
            UploadStatus::Error(error) => Some(error),
            _ => None,
        }
    }

    /// サイズの表示用ラベル（例: `12.5 KB`）
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }

    /// 処理中の状態を確定させる
    ///
    /// 既に確定している場合、または`Uploading`への遷移の場合は何もせず`false`を返します。
    pub(crate) fn settle(&mut self, status: UploadStatus) -> bool {
        if self.is_settled() || matches!(status, UploadStatus::Uploading) {
            return false;
        }
        self.status = status;
        true
    }
}

/// Markdown出力（ファイル名と内容の組）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownDocument {
    pub filename: String,
    pub content: String,
}

impl MarkdownDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// 取り込みの進捗（完了数, 総数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// 処理中のファイルが残っているか
    pub fn is_in_flight(&self) -> bool {
        self.total > 0 && self.completed < self.total
    }

    /// すべてのファイルの処理が完了したか
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parsing files: {} of {}", self.completed, self.total)
    }
}

//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! エラーは2系統に分かれます。
//!
//! - [`SurveyMdError`]: パイプライン構築やアーカイブ生成など、呼び出し側へ返すエラー
//! - [`IngestError`]: ファイル単位の取り込み失敗。呼び出し側へは伝播せず、
//!   該当ファイルの結果（[`crate::UploadStatus::Error`]）に添付されます

use thiserror::Error;

/// surveymdクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Zip`: ZIPアーカイブの生成中に発生したエラー
/// - `Json`: プレビューのJSON出力中に発生したエラー
/// - `Config`: 設定の検証に失敗したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use surveymd::{PipelineBuilder, SurveyMdError};
///
/// match PipelineBuilder::new().with_max_concurrent(0).build() {
///     Err(SurveyMdError::Config(msg)) => println!("設定エラー: {}", msg),
///     _ => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum SurveyMdError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがワークブックを解析する際に発生したエラーです。
    /// 取り込みパイプラインでは[`IngestError::DecodeFailure`]に変換されます。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// ZIPアーカイブの生成エラー
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSONシリアライズのエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `PipelineBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、同時実行数や最大ファイルサイズが0の場合です。
    #[error("Configuration error: {0}")]
    Config(String),
}

/// ファイル単位の取り込みエラー
///
/// `Display`はユーザーに表示するメッセージそのものです。
/// 解析・読み込み失敗の詳細は[`IngestError::detail`]で取得できます（ログ用）。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// 拡張子が`.xlsx`ではない
    #[error("Only .xlsx files are allowed")]
    InvalidExtension,

    /// ファイルサイズが上限を超えている
    #[error("File size must be under {}", size_limit_label(.limit))]
    FileTooLarge {
        /// 実際のファイルサイズ（バイト）
        size: u64,
        /// 上限（バイト）
        limit: u64,
    },

    /// バイナリをワークブックとして解析できなかった
    #[error("Failed to parse Excel file")]
    DecodeFailure(String),

    /// バイト列の読み込みに失敗した
    #[error("File reading failed")]
    ReadFailure(String),
}

impl IngestError {
    /// 失敗の詳細（ログ出力用）
    pub fn detail(&self) -> Option<&str> {
        match self {
            IngestError::DecodeFailure(detail) | IngestError::ReadFailure(detail) => {
                Some(detail.as_str())
            }
            _ => None,
        }
    }
}

const MEBIBYTE: u64 = 1024 * 1024;

/// 上限サイズの表示（MiB単位で割り切れる場合は`10MB`、それ以外はバイト数）
fn size_limit_label(limit: &u64) -> String {
    let limit = *limit;
    if limit >= MEBIBYTE && limit % MEBIBYTE == 0 {
        format!("{}MB", limit / MEBIBYTE)
    } else {
        format!("{} bytes", limit)
    }
}

impl From<SurveyMdError> for IngestError {
    fn from(err: SurveyMdError) -> Self {
        match err {
            SurveyMdError::Io(e) => IngestError::ReadFailure(e.to_string()),
            other => IngestError::DecodeFailure(other.to_string()),
        }
    }
}

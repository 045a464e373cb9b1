//! Security Module
//!
//! アップロード候補の検証を実装するモジュール。
//! バイナリの解析より前に、ファイル名とサイズだけで同期的に判定します。

use crate::error::IngestError;

/// 入力ファイルの最大サイズのデフォルト値（10MB）
pub(crate) const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// セキュリティ設定
///
/// ファイル処理時の制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 10MB (10_485_760 bytes)
    pub max_input_file_size: u64,
    /// 受け付ける拡張子（小文字、ドット付き）
    pub allowed_extension: &'static str,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: DEFAULT_MAX_INPUT_FILE_SIZE,
            allowed_extension: ".xlsx",
        }
    }
}

/// アップロード候補の検証
///
/// # 引数
///
/// * `name` - 元のファイル名
/// * `size` - ファイルサイズ（バイト）
/// * `config` - セキュリティ設定
///
/// # 戻り値
///
/// * `Ok(())` - 受け付け可能な場合
/// * `Err(IngestError::InvalidExtension)` - 拡張子が`.xlsx`でない場合（大文字小文字を区別しない）
/// * `Err(IngestError::FileTooLarge)` - サイズが上限を超える場合
pub(crate) fn validate_candidate(
    name: &str,
    size: u64,
    config: &SecurityConfig,
) -> Result<(), IngestError> {
    if !name.to_lowercase().ends_with(config.allowed_extension) {
        return Err(IngestError::InvalidExtension);
    }

    if size > config.max_input_file_size {
        return Err(IngestError::FileTooLarge {
            size,
            limit: config.max_input_file_size,
        });
    }

    Ok(())
}

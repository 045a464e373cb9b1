//! Builder Module
//!
//! Fluent Builder APIを提供し、`IngestPipeline`インスタンスを段階的に構築する。

use std::fmt;
use std::sync::Arc;

use crate::error::SurveyMdError;
use crate::pipeline::{CalamineDecoder, IngestPipeline, WorkbookDecoder};
use crate::security::SecurityConfig;

/// 同時にデコードするファイル数のデフォルト値
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// 取り込み処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    /// 同時にデコードするファイル数の上限
    pub max_concurrent: usize,

    /// 入力ファイルの検証設定
    pub security: SecurityConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `IngestPipeline`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use surveymd::PipelineBuilder;
///
/// # fn main() -> Result<(), surveymd::SurveyMdError> {
/// let pipeline = PipelineBuilder::new()
///     .with_max_concurrent(2)
///     .with_max_file_size(5 * 1024 * 1024)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder {
    /// 内部設定（構築中）
    config: IngestConfig,

    /// ワークブックのデコーダー（未指定ならcalamine）
    decoder: Option<Arc<dyn WorkbookDecoder>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("custom_decoder", &self.decoder.is_some())
            .finish()
    }
}

impl PipelineBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 同時デコード数: 3
    /// - 最大ファイルサイズ: 10MB (10,485,760 bytes)
    /// - デコーダー: calamine
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
            decoder: None,
        }
    }

    /// 同時にデコードするファイル数の上限を指定する
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.config.max_concurrent = max_concurrent;
        self
    }

    /// 受け付けるファイルサイズの上限（バイト）を指定する
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// ワークブックのデコーダーを差し替える
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use surveymd::{IngestError, PipelineBuilder, WorkbookData, WorkbookDecoder};
    ///
    /// struct EmptyDecoder;
    ///
    /// impl WorkbookDecoder for EmptyDecoder {
    ///     fn decode(&self, _buffer: Vec<u8>) -> Result<WorkbookData, IngestError> {
    ///         Ok(WorkbookData::new())
    ///     }
    /// }
    ///
    /// let builder = PipelineBuilder::new().with_decoder(EmptyDecoder);
    /// ```
    pub fn with_decoder<D: WorkbookDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// 設定を検証し、`IngestPipeline`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(IngestPipeline)`: 設定が有効な場合
    /// * `Err(SurveyMdError::Config)`: 同時デコード数または最大ファイルサイズが0の場合
    pub fn build(self) -> Result<IngestPipeline, SurveyMdError> {
        if self.config.max_concurrent == 0 {
            return Err(SurveyMdError::Config(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        if self.config.security.max_input_file_size == 0 {
            return Err(SurveyMdError::Config(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        let decoder = self
            .decoder
            .unwrap_or_else(|| Arc::new(CalamineDecoder));

        Ok(IngestPipeline::new(self.config, decoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = PipelineBuilder::new();
        assert_eq!(builder.config.max_concurrent, 3);
        assert_eq!(builder.config.security.max_input_file_size, 10_485_760);
        assert!(builder.decoder.is_none());
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = PipelineBuilder::new()
            .with_max_concurrent(1)
            .with_max_file_size(42);
        assert_eq!(builder.config.max_concurrent, 1);
        assert_eq!(builder.config.security.max_input_file_size, 42);
    }

    #[test]
    fn test_build_success() {
        let pipeline = PipelineBuilder::new().build().unwrap();
        assert_eq!(pipeline.max_concurrent(), 3);
    }

    #[test]
    fn test_build_with_zero_concurrency() {
        match PipelineBuilder::new().with_max_concurrent(0).build() {
            Err(SurveyMdError::Config(msg)) => assert!(msg.contains("max_concurrent")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_zero_file_size() {
        match PipelineBuilder::new().with_max_file_size(0).build() {
            Err(SurveyMdError::Config(msg)) => assert!(msg.contains("max_file_size")),
            _ => panic!("Expected Config error"),
        }
    }
}

//! Ingestion Pipeline
//!
//! アップロード候補を検証し、ワークブックをデコードして、ファイルごとの結果を
//! 完了順に通知するモジュール。
//!
//! 同時にデコードするファイル数は固定サイズのワーカープール（rayon）で制限します。
//! 各ワーカーは結果を1本のチャネルに送信し、受信側の[`Ingestion`]だけが
//! 進捗カウンタを更新します。

use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::builder::IngestConfig;
use crate::error::{IngestError, SurveyMdError};
use crate::parser::WorkbookParser;
use crate::security::validate_candidate;
use crate::types::{Progress, Upload, UploadStatus, WorkbookData};

/// アップロード候補のファイル
///
/// ファイル名・サイズは検証に、バイト列はデコードに使用します。
pub trait FileSource: Send + 'static {
    /// 元のファイル名
    fn name(&self) -> &str;

    /// ファイルサイズ（バイト）
    fn size(&self) -> u64;

    /// ファイル全体を読み込む
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

impl<T: FileSource + ?Sized> FileSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        (**self).read_bytes()
    }
}

/// メモリ上のファイル
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// ディスク上のファイル
///
/// 名前とサイズは`open`時のメタデータから取得し、内容はデコード直前に読み込みます。
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl LocalFile {
    /// ファイルのメタデータを読み込む
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path,
            name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// ワークブックのデコーダー
///
/// バイト列をシート名とグリッドに変換します。ワーカースレッドから並行に呼び出されます。
pub trait WorkbookDecoder: Send + Sync {
    fn decode(&self, buffer: Vec<u8>) -> Result<WorkbookData, IngestError>;
}

/// calamineによるデコーダー（デフォルト）
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineDecoder;

impl WorkbookDecoder for CalamineDecoder {
    fn decode(&self, buffer: Vec<u8>) -> Result<WorkbookData, IngestError> {
        let mut parser = WorkbookParser::open(buffer)?;
        Ok(parser.parse_all()?)
    }
}

/// 取り込みパイプライン
///
/// `PipelineBuilder`で構築します。呼び出しごとに独立したワーカープールを使用するため、
/// 呼び出し間で状態を共有しません。
pub struct IngestPipeline {
    config: IngestConfig,
    decoder: Arc<dyn WorkbookDecoder>,
}

impl IngestPipeline {
    pub(crate) fn new(config: IngestConfig, decoder: Arc<dyn WorkbookDecoder>) -> Self {
        Self { config, decoder }
    }

    /// 同時にデコードするファイル数の上限
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    /// 受け付けるファイルサイズの上限（バイト）
    pub fn max_file_size(&self) -> u64 {
        self.config.security.max_input_file_size
    }

    /// ファイルの取り込みを開始する
    ///
    /// 各候補は即座に`Uploading`として登録され（[`Ingestion::submitted`]）、
    /// 検証に失敗したものはデコードせずにエラーとして確定します。
    /// 結果は完了順に[`Ingestion`]から取り出せます。入力順とは一致しません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Ingestion)` - 取り込み結果のイテレータ
    /// * `Err(SurveyMdError::Config)` - ワーカープールを起動できなかった場合
    pub fn ingest<I>(&self, candidates: I) -> Result<Ingestion, SurveyMdError>
    where
        I: IntoIterator,
        I::Item: FileSource,
    {
        let candidates: Vec<I::Item> = candidates.into_iter().collect();
        let total = candidates.len();

        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrent)
            .thread_name(|index| format!("surveymd-ingest-{}", index))
            .panic_handler(|_| error!("ingestion worker panicked"))
            .build()
            .map_err(|e| {
                SurveyMdError::Config(format!("Failed to start ingestion workers: {}", e))
            })?;

        info!(
            total,
            max_concurrent = self.config.max_concurrent,
            "ingestion started"
        );

        let (sender, receiver) = mpsc::channel();
        let mut submitted = Vec::with_capacity(total);

        for source in candidates {
            let upload = Upload::uploading(source.name(), source.size());
            submitted.push(upload.clone());

            if let Err(error) =
                validate_candidate(source.name(), source.size(), &self.config.security)
            {
                warn!(file = %source.name(), id = %upload.id(), %error, "rejected upload");
                // 受信側はIngestionが保持しているので送信は失敗しない
                let _ = sender.send(settle(upload, UploadStatus::Error(error)));
                continue;
            }

            let sender = sender.clone();
            let decoder = Arc::clone(&self.decoder);
            workers.spawn(move || {
                // ファイル単位の失敗として確定させ、必ず1件の結果を送信する
                let status = panic::catch_unwind(AssertUnwindSafe(|| {
                    process_file(&source, decoder.as_ref())
                }))
                .unwrap_or_else(|_| {
                    UploadStatus::Error(IngestError::ReadFailure("upload panicked".to_string()))
                });
                let _ = sender.send(settle(upload, status));
            });
        }

        Ok(Ingestion {
            submitted,
            receiver,
            progress: Progress::new(0, total),
            _workers: workers,
        })
    }
}

fn settle(mut upload: Upload, status: UploadStatus) -> Upload {
    upload.settle(status);
    upload
}

/// 1ファイルを読み込み、デコードする（ワーカースレッドで実行）
fn process_file<S: FileSource>(source: &S, decoder: &dyn WorkbookDecoder) -> UploadStatus {
    let started = Instant::now();
    debug!(file = %source.name(), "decode started");

    let buffer = match panic::catch_unwind(AssertUnwindSafe(|| source.read_bytes())) {
        Ok(Ok(buffer)) => buffer,
        Ok(Err(e)) => {
            warn!(file = %source.name(), error = %e, "failed to read upload");
            return UploadStatus::Error(IngestError::ReadFailure(e.to_string()));
        }
        Err(_) => {
            warn!(file = %source.name(), "file source panicked while reading");
            return UploadStatus::Error(IngestError::ReadFailure(
                "file source panicked".to_string(),
            ));
        }
    };

    let decoded = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(buffer)))
        .unwrap_or_else(|_| Err(IngestError::DecodeFailure("decoder panicked".to_string())));

    match decoded {
        Ok(data) => {
            debug!(
                file = %source.name(),
                sheets = data.sheet_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "decode finished"
            );
            UploadStatus::Success(data)
        }
        Err(error) => {
            warn!(
                file = %source.name(),
                detail = error.detail().unwrap_or_default(),
                "failed to decode upload"
            );
            UploadStatus::Error(error)
        }
    }
}

/// 取り込み1件分の完了通知
#[derive(Debug, Clone, PartialEq)]
pub struct IngestEvent {
    /// 確定した取り込み結果
    pub upload: Upload,
    /// この通知時点の進捗
    pub progress: Progress,
}

/// 進行中の取り込み
///
/// ファイルの処理が完了するたびに[`IngestEvent`]を1つ返すイテレータです。
/// すべてのファイルが確定すると`None`を返します。
/// 途中で破棄しても、実行中のデコードは中断されません。
pub struct Ingestion {
    submitted: Vec<Upload>,
    receiver: Receiver<Upload>,
    progress: Progress,
    _workers: rayon::ThreadPool,
}

impl Ingestion {
    /// 投入されたすべての候補（`Uploading`状態、入力順）
    pub fn submitted(&self) -> &[Upload] {
        &self.submitted
    }

    /// 現在の進捗
    pub fn progress(&self) -> Progress {
        self.progress
    }
}

impl Iterator for Ingestion {
    type Item = IngestEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.progress.is_complete() {
            return None;
        }

        let upload = self.receiver.recv().ok()?;
        self.progress.completed += 1;

        debug!(
            file = %upload.name(),
            status = upload.status().label(),
            completed = self.progress.completed,
            total = self.progress.total,
            "upload settled"
        );
        if self.progress.is_complete() {
            info!(total = self.progress.total, "ingestion finished");
        }

        Some(IngestEvent {
            upload,
            progress: self.progress,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.progress.total - self.progress.completed;
        (0, Some(remaining))
    }
}

//! Session Module
//!
//! アップロード一覧・進捗・プレビュー選択・出力モードを保持する最上位のオーケストレーター。
//! 取り込みパイプラインと文字起こしエンジンはこのセッションから呼び出されます。

use tracing::{debug, info};

use crate::api::OutputMode;
use crate::error::SurveyMdError;
use crate::output::{render_batch, DownloadArtifact};
use crate::pipeline::{FileSource, IngestEvent, IngestPipeline};
use crate::preview::{SheetPreview, DEFAULT_PREVIEW_ROWS};
use crate::types::{MarkdownDocument, Progress, Upload, UploadId};

/// 変換セッション
///
/// # 使用例
///
/// ```rust,no_run
/// use surveymd::{LocalFile, OutputMode, PipelineBuilder, Session};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = Session::new(PipelineBuilder::new().build()?);
/// session.add_files(vec![LocalFile::open("feedback.xlsx")?])?;
/// session.set_output_mode(OutputMode::Separate);
///
/// for document in session.convert() {
///     println!("{}", document.filename);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Session {
    pipeline: IngestPipeline,
    uploads: Vec<Upload>,
    progress: Progress,
    preview: Option<(UploadId, String)>,
    output_mode: OutputMode,
}

impl Session {
    pub fn new(pipeline: IngestPipeline) -> Self {
        Self {
            pipeline,
            uploads: Vec::new(),
            progress: Progress::default(),
            preview: None,
            output_mode: OutputMode::default(),
        }
    }

    /// ファイルを取り込む
    ///
    /// すべての候補を`Uploading`として一覧に追加した後、完了した順に結果を反映します。
    pub fn add_files<I>(&mut self, candidates: I) -> Result<(), SurveyMdError>
    where
        I: IntoIterator,
        I::Item: FileSource,
    {
        self.add_files_with(candidates, |_| {})
    }

    /// ファイルを取り込み、1件完了するごとに`observer`を呼び出す
    ///
    /// `observer`には完了したアップロードとその時点の進捗が渡されます。
    pub fn add_files_with<I, F>(&mut self, candidates: I, mut observer: F) -> Result<(), SurveyMdError>
    where
        I: IntoIterator,
        I::Item: FileSource,
        F: FnMut(&IngestEvent),
    {
        let ingestion = self.pipeline.ingest(candidates)?;
        self.uploads.extend(ingestion.submitted().iter().cloned());
        self.progress = ingestion.progress();

        for event in ingestion {
            observer(&event);
            self.progress = event.progress;

            let id = event.upload.id();
            match self.uploads.iter_mut().find(|u| u.id() == id) {
                Some(entry) if !entry.is_settled() => *entry = event.upload,
                Some(_) => debug!(%id, "ignoring result for settled upload"),
                None => debug!(%id, "ignoring result for removed upload"),
            }
        }

        info!(
            uploads = self.uploads.len(),
            successes = self.uploads.iter().filter(|u| u.is_success()).count(),
            "files added"
        );
        Ok(())
    }

    /// アップロード一覧（追加順）
    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    pub fn upload(&self, id: UploadId) -> Option<&Upload> {
        self.uploads.iter().find(|u| u.id() == id)
    }

    /// 直近の取り込みの進捗
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// 処理中の表示（例: `Parsing files: 1 of 3`）。処理中でなければ`None`
    pub fn status_line(&self) -> Option<String> {
        self.progress
            .is_in_flight()
            .then(|| self.progress.to_string())
    }

    /// 成功したアップロードが1件以上あるか
    pub fn has_success(&self) -> bool {
        self.uploads.iter().any(Upload::is_success)
    }

    /// アップロードを一覧から削除する
    ///
    /// 削除したアップロードがプレビュー中であれば、プレビューも閉じます。
    pub fn remove(&mut self, id: UploadId) -> Option<Upload> {
        let index = self.uploads.iter().position(|u| u.id() == id)?;
        if matches!(&self.preview, Some((selected, _)) if *selected == id) {
            self.preview = None;
        }
        debug!(%id, "upload removed");
        Some(self.uploads.remove(index))
    }

    /// すべてのアップロードを削除する
    pub fn clear(&mut self) {
        debug!(uploads = self.uploads.len(), "session cleared");
        self.uploads.clear();
        self.preview = None;
        self.progress = Progress::default();
    }

    /// プレビューの表示を切り替える
    ///
    /// 別のアップロードを選ぶと、その最初のシートを表示します。
    /// 表示中のアップロードを再度選ぶとプレビューを閉じます。
    /// 成功していないアップロードはプレビューできません。
    pub fn toggle_preview(&mut self, id: UploadId) {
        if matches!(&self.preview, Some((selected, _)) if *selected == id) {
            self.preview = None;
            return;
        }

        self.preview = self
            .upload(id)
            .and_then(Upload::data)
            .and_then(|data| data.sheet_names().first().cloned())
            .map(|sheet| (id, sheet));
    }

    /// プレビュー中のシートを切り替える
    ///
    /// プレビュー中のワークブックにそのシートがない場合は`false`を返します。
    pub fn select_sheet(&mut self, sheet: &str) -> bool {
        let Some((id, _)) = &self.preview else {
            return false;
        };

        let exists = self
            .upload(*id)
            .and_then(Upload::data)
            .map_or(false, |data| data.sheet(sheet).is_some());
        if exists {
            let id = *id;
            self.preview = Some((id, sheet.to_string()));
        }
        exists
    }

    /// プレビュー中のアップロードとシート名
    pub fn preview_selection(&self) -> Option<(UploadId, &str)> {
        self.preview
            .as_ref()
            .map(|(id, sheet)| (*id, sheet.as_str()))
    }

    /// プレビュー中のシートのプレビュー表
    ///
    /// 何も選択していない場合、またはシートが空の場合は`None`
    pub fn preview(&self) -> Option<SheetPreview> {
        let (id, sheet) = self.preview_selection()?;
        let sheet = self.upload(id)?.data()?.sheet(sheet)?;
        SheetPreview::build(sheet, DEFAULT_PREVIEW_ROWS)
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        debug!(?mode, "output mode changed");
        self.output_mode = mode;
    }

    /// 成功したアップロードをMarkdown文書に変換する
    pub fn convert(&self) -> Vec<MarkdownDocument> {
        let successes: Vec<Upload> = self
            .uploads
            .iter()
            .filter(|u| u.is_success())
            .cloned()
            .collect();
        render_batch(&successes, self.output_mode)
    }

    /// 変換結果をダウンロード用の成果物にまとめる
    ///
    /// 成功したアップロードがない場合（分割モード）は`None`
    pub fn download(&self) -> Result<Option<DownloadArtifact>, SurveyMdError> {
        DownloadArtifact::from_documents(&self.convert())
    }
}

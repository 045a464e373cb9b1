//! Delivery Packaging
//!
//! 生成したMarkdown文書をダウンロード用の成果物にまとめるモジュール。
//! 文書が1つならそのまま、複数ならZIPアーカイブに格納します。

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::SurveyMdError;
use crate::types::MarkdownDocument;

/// 複数文書をまとめたアーカイブのファイル名
pub const ARCHIVE_FILENAME: &str = "survey-markdown-files.zip";

/// ダウンロード用の成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadArtifact {
    /// 単一のMarkdown文書
    Markdown(MarkdownDocument),

    /// 複数文書のZIPアーカイブ
    Archive {
        /// アーカイブのファイル名
        filename: String,
        /// ZIPのバイト列
        bytes: Vec<u8>,
    },
}

impl DownloadArtifact {
    /// 文書リストから成果物を生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(None)` - 文書が1つもない場合
    /// * `Ok(Some(DownloadArtifact::Markdown))` - 文書が1つの場合
    /// * `Ok(Some(DownloadArtifact::Archive))` - 文書が複数の場合
    /// * `Err(SurveyMdError)` - アーカイブの生成に失敗した場合
    pub fn from_documents(documents: &[MarkdownDocument]) -> Result<Option<Self>, SurveyMdError> {
        match documents {
            [] => Ok(None),
            [single] => Ok(Some(DownloadArtifact::Markdown(single.clone()))),
            many => Ok(Some(DownloadArtifact::Archive {
                filename: ARCHIVE_FILENAME.to_string(),
                bytes: bundle_documents(many)?,
            })),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            DownloadArtifact::Markdown(document) => &document.filename,
            DownloadArtifact::Archive { filename, .. } => filename,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            DownloadArtifact::Markdown(document) => document.content.as_bytes(),
            DownloadArtifact::Archive { bytes, .. } => bytes,
        }
    }

    /// MIMEタイプ
    pub fn content_type(&self) -> &'static str {
        match self {
            DownloadArtifact::Markdown(_) => "text/markdown",
            DownloadArtifact::Archive { .. } => "application/zip",
        }
    }
}

/// 文書をZIPアーカイブにまとめる
///
/// 同名のファイルが複数ある場合は後に追加された内容で上書きします。
/// エントリの順序は各ファイル名の初出順です。
pub fn bundle_documents(documents: &[MarkdownDocument]) -> Result<Vec<u8>, SurveyMdError> {
    let mut entries: Vec<&MarkdownDocument> = Vec::with_capacity(documents.len());
    for document in documents {
        match entries.iter_mut().find(|e| e.filename == document.filename) {
            Some(existing) => *existing = document,
            None => entries.push(document),
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in &entries {
        zip.start_file(entry.filename.as_str(), options)?;
        zip.write_all(entry.content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    debug!(entries = entries.len(), bytes = bytes.len(), "bundled markdown documents");

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_no_documents() {
        assert!(DownloadArtifact::from_documents(&[]).unwrap().is_none());
    }

    #[test]
    fn test_single_document_is_not_archived() {
        let doc = MarkdownDocument::new("a.md", "# A");
        let artifact = DownloadArtifact::from_documents(std::slice::from_ref(&doc))
            .unwrap()
            .unwrap();
        assert_eq!(artifact, DownloadArtifact::Markdown(doc));
        assert_eq!(artifact.filename(), "a.md");
        assert_eq!(artifact.bytes(), b"# A");
        assert_eq!(artifact.content_type(), "text/markdown");
    }

    #[test]
    fn test_multiple_documents_are_zipped() {
        let docs = vec![
            MarkdownDocument::new("a.md", "# A"),
            MarkdownDocument::new("b.md", "# B"),
        ];
        let artifact = DownloadArtifact::from_documents(&docs).unwrap().unwrap();
        assert_eq!(artifact.filename(), "survey-markdown-files.zip");
        assert_eq!(artifact.content_type(), "application/zip");
        assert_eq!(read_entry(artifact.bytes(), "a.md"), "# A");
        assert_eq!(read_entry(artifact.bytes(), "b.md"), "# B");
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let docs = vec![
            MarkdownDocument::new("same.md", "first"),
            MarkdownDocument::new("other.md", "other"),
            MarkdownDocument::new("same.md", "second"),
        ];
        let bytes = bundle_documents(&docs).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&bytes, "same.md"), "second");
    }
}

//! surveymd - Survey workbook to Markdown transcript converter
//!
//! This crate ingests survey exports saved as Excel workbooks (XLSX) and turns
//! each participant row into a readable "Question: Answer" transcript, either
//! as one document per workbook or as one combined document.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use surveymd::{render_batch, LocalFile, OutputMode, PipelineBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Decode up to three workbooks at a time (the default)
//!     let pipeline = PipelineBuilder::new().build()?;
//!
//!     let files = vec![LocalFile::open("feedback.xlsx")?];
//!     let mut uploads = Vec::new();
//!     for event in pipeline.ingest(files)? {
//!         eprintln!("{}", event.progress);
//!         uploads.push(event.upload);
//!     }
//!
//!     for document in render_batch(&uploads, OutputMode::Combined) {
//!         std::fs::write(&document.filename, &document.content)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Session
//!
//! [`Session`] keeps the upload list, preview selection and output mode
//! together, the way an interactive front end would use them:
//!
//! ```rust,no_run
//! use surveymd::{InMemoryFile, OutputMode, PipelineBuilder, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(PipelineBuilder::new().build()?);
//! let bytes = std::fs::read("feedback.xlsx")?;
//! session.add_files(vec![InMemoryFile::new("feedback.xlsx", bytes)])?;
//!
//! session.set_output_mode(OutputMode::Separate);
//! if let Some(artifact) = session.download()? {
//!     std::fs::write(artifact.filename(), artifact.bytes())?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Rendering without ingestion
//!
//! ```rust
//! use surveymd::{render_workbook, CellValue, Sheet, Upload, WorkbookData};
//!
//! let sheet = Sheet::new(vec![
//!     vec![CellValue::from("Submitted"), CellValue::from("Comment")],
//!     vec![CellValue::from(44197.5), CellValue::Empty],
//! ]);
//! let upload = Upload::succeeded("results.xlsx", 0, WorkbookData::new().with_sheet("Form1", sheet));
//!
//! let markdown = render_workbook(&upload);
//! assert!(markdown.contains("**Submitted**: 2021-01-01 12:00"));
//! assert!(markdown.contains("**Comment**: *No response*"));
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod output;
mod parser;
mod pipeline;
mod preview;
mod security;
mod session;
mod types;

// 公開API
pub use api::OutputMode;
pub use builder::{PipelineBuilder, DEFAULT_MAX_CONCURRENT};
pub use error::{IngestError, SurveyMdError};
pub use output::{
    bundle_documents, markdown_file_name, render_batch, render_workbook, sanitize_file_name,
    DownloadArtifact, ARCHIVE_FILENAME, COMBINED_FILENAME,
};
pub use pipeline::{
    CalamineDecoder, FileSource, InMemoryFile, IngestEvent, IngestPipeline, Ingestion, LocalFile,
    WorkbookDecoder,
};
pub use preview::{SheetPreview, DEFAULT_PREVIEW_ROWS};
pub use session::Session;
pub use types::{
    CellValue, MarkdownDocument, Progress, Sheet, Upload, UploadId, UploadStatus, WorkbookData,
};

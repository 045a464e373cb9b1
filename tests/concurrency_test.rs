//! Concurrency Tests
//!
//! 取り込みパイプラインの同時実行数の上限、完了順の通知、進捗の単調増加を検証します。

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use surveymd::{
    CellValue, InMemoryFile, IngestError, IngestEvent, PipelineBuilder, Progress, Sheet,
    WorkbookData, WorkbookDecoder,
};

/// 同時に実行中のデコード数を記録するデコーダー
///
/// バイト列の先頭をスリープ時間（10ms単位）として扱います。
#[derive(Clone, Default)]
struct TrackingDecoder {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl WorkbookDecoder for TrackingDecoder {
    fn decode(&self, buffer: Vec<u8>) -> Result<WorkbookData, IngestError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = buffer.first().copied().unwrap_or(1);
        thread::sleep(Duration::from_millis(u64::from(delay) * 10));

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(WorkbookData::new().with_sheet(
            "Sheet1",
            Sheet::new(vec![vec![CellValue::from("Q")]]),
        ))
    }
}

fn files(count: usize, delay: u8) -> Vec<InMemoryFile> {
    (0..count)
        .map(|i| InMemoryFile::new(format!("survey-{}.xlsx", i), vec![delay]))
        .collect()
}

#[test]
fn test_default_concurrency_never_exceeds_three() {
    let decoder = TrackingDecoder::default();
    let pipeline = PipelineBuilder::new()
        .with_decoder(decoder.clone())
        .build()
        .unwrap();

    let events: Vec<IngestEvent> = pipeline.ingest(files(10, 3)).unwrap().collect();

    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|e| e.upload.is_success()));
    let peak = decoder.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {}", peak);
    assert!(peak >= 1);
}

#[test]
fn test_custom_concurrency_limit() {
    let decoder = TrackingDecoder::default();
    let pipeline = PipelineBuilder::new()
        .with_max_concurrent(1)
        .with_decoder(decoder.clone())
        .build()
        .unwrap();

    let count = pipeline.ingest(files(4, 1)).unwrap().count();

    assert_eq!(count, 4);
    assert_eq!(decoder.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_progress_is_monotonic_and_completes() {
    let pipeline = PipelineBuilder::new()
        .with_decoder(TrackingDecoder::default())
        .build()
        .unwrap();

    let mut ingestion = pipeline.ingest(files(7, 1)).unwrap();
    assert_eq!(ingestion.progress(), Progress::new(0, 7));
    assert!(ingestion.progress().is_in_flight());

    let mut previous = 0;
    for event in ingestion.by_ref() {
        assert_eq!(event.progress.total, 7);
        assert_eq!(event.progress.completed, previous + 1);
        previous = event.progress.completed;
    }

    assert_eq!(ingestion.progress(), Progress::new(7, 7));
    assert!(!ingestion.progress().is_in_flight());
    assert_eq!(ingestion.progress().to_string(), "Parsing files: 7 of 7");
}

#[test]
fn test_results_arrive_in_completion_order() {
    let pipeline = PipelineBuilder::new()
        .with_decoder(TrackingDecoder::default())
        .build()
        .unwrap();

    // 先頭のファイルだけ極端に遅い
    let candidates = vec![
        InMemoryFile::new("slow.xlsx", vec![50]),
        InMemoryFile::new("fast.xlsx", vec![1]),
    ];
    let names: Vec<String> = pipeline
        .ingest(candidates)
        .unwrap()
        .map(|e| e.upload.name().to_string())
        .collect();

    assert_eq!(names, ["fast.xlsx", "slow.xlsx"]);
}

#[test]
fn test_every_submission_settles_exactly_once() {
    let pipeline = PipelineBuilder::new()
        .with_decoder(TrackingDecoder::default())
        .with_max_file_size(1)
        .build()
        .unwrap();

    let mut candidates = files(5, 1);
    candidates.push(InMemoryFile::new("notes.csv", vec![1]));
    candidates.push(InMemoryFile::new("large.xlsx", vec![1, 1]));

    let ingestion = pipeline.ingest(candidates).unwrap();
    let submitted: HashSet<_> = ingestion.submitted().iter().map(|u| u.id()).collect();
    let events: Vec<IngestEvent> = ingestion.collect();

    let settled: HashSet<_> = events.iter().map(|e| e.upload.id()).collect();
    assert_eq!(events.len(), 7);
    assert_eq!(settled, submitted);
    assert_eq!(events.iter().filter(|e| e.upload.is_success()).count(), 5);
}

#[test]
fn test_independent_invocations() {
    let decoder = TrackingDecoder::default();
    let pipeline = PipelineBuilder::new()
        .with_decoder(decoder.clone())
        .build()
        .unwrap();

    let first = pipeline.ingest(files(3, 1)).unwrap();
    let second = pipeline.ingest(files(2, 1)).unwrap();

    assert_eq!(second.count(), 2);
    assert_eq!(first.count(), 3);
}

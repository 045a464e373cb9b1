//! Boundary Tests for surveymd
//!
//! 文字起こしの境界条件（日付判定の範囲、空セル、短い行、ヘッダーの扱い）と、
//! ファイル名サニタイズ・描画の性質を検証します。

use proptest::prelude::*;
use surveymd::{
    markdown_file_name, render_batch, render_workbook, sanitize_file_name, CellValue,
    IngestError, OutputMode, Sheet, Upload, WorkbookData,
};

fn single_answer(answer: CellValue) -> String {
    let sheet = Sheet::new(vec![vec![CellValue::from("Q")], vec![answer]]);
    let upload = Upload::succeeded("b.xlsx", 0, WorkbookData::new().with_sheet("S", sheet));
    let markdown = render_workbook(&upload);

    let start = markdown.find("**Q**: ").unwrap() + "**Q**: ".len();
    let end = start + markdown[start..].find("\n\n").unwrap();
    markdown[start..end].to_string()
}

#[test]
fn test_date_heuristic_bounds_are_exclusive() {
    assert_eq!(single_answer(CellValue::from(20000.0)), "20000");
    assert_eq!(single_answer(CellValue::from(60000.0)), "60000");
    assert_eq!(single_answer(CellValue::from(19999.5)), "19999.5");
}

#[test]
fn test_date_serial_conversion() {
    assert_eq!(single_answer(CellValue::from(44197.0)), "2021-01-01 00:00");
    assert_eq!(single_answer(CellValue::from(25569.0)), "1970-01-01 00:00");
    // 秒は切り捨て
    assert_eq!(single_answer(CellValue::from(25569.999)), "1970-01-01 23:58");
    assert_eq!(single_answer(CellValue::from(20000.5)).len(), "YYYY-MM-DD HH:MM".len());
}

#[test]
fn test_date_heuristic_ignores_strings() {
    assert_eq!(single_answer(CellValue::from("44197")), "44197");
}

#[test]
fn test_scalar_answers() {
    assert_eq!(single_answer(CellValue::Empty), "*No response*");
    assert_eq!(single_answer(CellValue::from("")), "*No response*");
    assert_eq!(single_answer(CellValue::from(0.0)), "0");
    assert_eq!(single_answer(CellValue::from(-0.0)), "0");
    assert_eq!(single_answer(CellValue::from(3.25)), "3.25");
    assert_eq!(single_answer(CellValue::from(true)), "true");
    assert_eq!(single_answer(CellValue::from(false)), "false");
    assert_eq!(single_answer(CellValue::from("  padded\t")), "padded");
}

#[test]
fn test_long_answers_are_not_truncated() {
    let long = "x".repeat(500);
    assert_eq!(single_answer(CellValue::from(long.clone())), long);
}

#[test]
fn test_short_rows_render_placeholders() {
    let sheet = Sheet::new(vec![
        vec![CellValue::from("A"), CellValue::from("B"), CellValue::from("C")],
        vec![CellValue::from("only a")],
    ]);
    let upload = Upload::succeeded("s.xlsx", 0, WorkbookData::new().with_sheet("S", sheet));
    let markdown = render_workbook(&upload);

    assert!(markdown.contains("**A**: only a\n\n**B**: *No response*\n\n**C**: *No response*\n\n"));
}

#[test]
fn test_falsy_headers_are_skipped() {
    let sheet = Sheet::new(vec![
        vec![
            CellValue::from("Kept"),
            CellValue::from(0.0),
            CellValue::from(false),
            CellValue::from("   "),
            CellValue::from(2024.0),
        ],
        vec![
            CellValue::from("a"),
            CellValue::from("b"),
            CellValue::from("c"),
            CellValue::from("d"),
            CellValue::from("e"),
        ],
    ]);
    let upload = Upload::succeeded("h.xlsx", 0, WorkbookData::new().with_sheet("S", sheet));
    let markdown = render_workbook(&upload);

    assert!(markdown.contains("**Kept**: a\n\n**2024**: e\n\n"));
    for hidden in ["b", "c", "d"] {
        assert!(!markdown.contains(&format!(": {}\n", hidden)));
    }
}

#[test]
fn test_participant_count_matches_rows() {
    let mut rows = vec![vec![CellValue::from("Q")]];
    rows.extend((0..25).map(|i| vec![CellValue::from(i as f64)]));
    let upload = Upload::succeeded(
        "many.xlsx",
        0,
        WorkbookData::new().with_sheet("S", Sheet::new(rows)),
    );
    let markdown = render_workbook(&upload);

    assert_eq!(markdown.matches("### Participant ").count(), 25);
    assert!(markdown.contains("### Participant 25\n\n"));
    assert!(markdown.ends_with("*Total participants: 25*\n\n"));
}

#[test]
fn test_failed_and_uploading_render_heading_only() {
    let failed = Upload::failed("f.xlsx", 0, IngestError::InvalidExtension);
    assert_eq!(render_workbook(&failed), "# Survey Results - f.xlsx\n\n");

    let pending = Upload::uploading("p.xlsx", 0);
    assert_eq!(render_workbook(&pending), "# Survey Results - p.xlsx\n\n");
}

#[test]
fn test_markdown_file_name() {
    assert_eq!(markdown_file_name("Survey Results.xlsx"), "Survey-Results.md");
    assert_eq!(markdown_file_name("UPPER.XLSX"), "UPPER.md");
    assert_eq!(markdown_file_name("no-extension"), "no-extension");
    assert_eq!(markdown_file_name("Q1: Team?.xlsx"), "Q1-Team.md");
    assert_eq!(markdown_file_name("日本語 アンケート.xlsx"), "日本語-アンケート.md");
}

fn arbitrary_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        any::<bool>().prop_map(CellValue::Bool),
        (-1.0e6f64..1.0e6).prop_map(CellValue::Number),
        "[a-zA-Z0-9 ]{0,12}".prop_map(CellValue::String),
    ]
}

fn arbitrary_upload() -> impl Strategy<Value = Upload> {
    (
        "[a-z]{1,8}\\.xlsx",
        prop::collection::vec(prop::collection::vec(arbitrary_cell(), 0..4), 0..5),
        any::<bool>(),
    )
        .prop_map(|(name, rows, ok)| {
            if ok {
                Upload::succeeded(name, 0, WorkbookData::new().with_sheet("S", Sheet::new(rows)))
            } else {
                Upload::failed(name, 0, IngestError::DecodeFailure("bad".to_string()))
            }
        })
}

proptest! {
    #[test]
    fn prop_sanitized_names_are_safe(name in "\\PC*") {
        let sanitized = sanitize_file_name(&name);
        prop_assert!(!sanitized.chars().any(|c| "<>:\"/\\|?*".contains(c)));
        prop_assert!(!sanitized.chars().any(|c| c.is_whitespace()));
        let has_control = sanitized.chars().any(|c| (c as u32) < 0x20);
        prop_assert!(!has_control, "control character left in {:?}", sanitized);
    }

    #[test]
    fn prop_sanitize_is_idempotent(name in "\\PC*") {
        let once = sanitize_file_name(&name);
        prop_assert_eq!(sanitize_file_name(&once), once.clone());
    }

    #[test]
    fn prop_workbook_heading_always_first(upload in arbitrary_upload()) {
        let markdown = render_workbook(&upload);
        let heading = format!("# Survey Results - {}\n\n", upload.name());
        prop_assert!(markdown.starts_with(&heading));
    }

    #[test]
    fn prop_separate_emits_one_document_per_success(
        uploads in prop::collection::vec(arbitrary_upload(), 0..6)
    ) {
        let documents = render_batch(&uploads, OutputMode::Separate);
        let successes = uploads.iter().filter(|u| u.is_success()).count();
        prop_assert_eq!(documents.len(), successes);
    }

    #[test]
    fn prop_combined_is_deterministic(uploads in prop::collection::vec(arbitrary_upload(), 0..6)) {
        let first = render_batch(&uploads, OutputMode::Combined);
        let second = render_batch(&uploads, OutputMode::Combined);
        prop_assert_eq!(first.len(), 1);
        prop_assert!(first[0].content.starts_with("# Combined Survey Results\n\n"));
        prop_assert_eq!(first, second);
    }
}

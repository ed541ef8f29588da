//! Cross-module pipeline tests: raw-stream reconstruction, naive merging,
//! and XY-cut/paragraph assembly run back-to-back on synthetic pages,
//! without spawning any external tool.

use foliate_core::cancellation::CancellationToken;
use foliate_core::naive_merge::{naive_merge, PipelineParams};
use foliate_core::model::{Page, Word};
use foliate_core::reconstruct::reconstruct;
use foliate_core::xycut::segment_into_paragraphs;

fn page_for_report() -> Page {
    Page::new(
        1,
        1000.0,
        1000.0,
        vec![
            Word::new(0.0, 0.0, 40.0, 10.0, "2012"),
            Word::new(45.0, 0.0, 40.0, 10.0, "MAY."),
            Word::new(0.0, 30.0, 30.0, 10.0, "Two"),
            Word::new(35.0, 30.0, 40.0, 10.0, "words"),
        ],
    )
}

// Invariant 1: every output word stays within the page bounds through the
// whole raw -> naive chain.
#[test]
fn words_stay_within_page_bounds_through_raw_and_naive_stages() {
    let page = page_for_report();
    let cancel = CancellationToken::new();
    let reconstructed = reconstruct(&page, &["2012 MAY.".to_string()], &cancel).unwrap();
    let merged = naive_merge(&reconstructed, &PipelineParams::default());

    for word in &merged.data {
        assert!(word.x >= -1e-3 && word.x + word.w <= merged.width + 1e-3);
        assert!(word.y >= -1e-3 && word.y + word.h <= merged.height + 1e-3);
    }
}

#[test]
fn raw_then_naive_then_xycut_produces_reading_order_paragraphs() {
    let page = page_for_report();
    let cancel = CancellationToken::new();

    let reconstructed = reconstruct(&page, &["2012 MAY.".to_string()], &cancel).unwrap();
    assert!(reconstructed.data.iter().any(|w| w.t == "2012 MAY."));

    let merged = naive_merge(&reconstructed, &PipelineParams::default());
    let paragraphs = segment_into_paragraphs(merged.data, &cancel).unwrap();

    assert!(!paragraphs.is_empty());
    let joined = paragraphs.join(" ");
    assert!(joined.contains("2012"));
}

#[test]
fn single_word_page_produces_one_paragraph_equal_to_its_text() {
    let page = Page::new(1, 100.0, 100.0, vec![Word::new(0.0, 0.0, 10.0, 10.0, "solo")]);
    let cancel = CancellationToken::new();
    let paragraphs = segment_into_paragraphs(page.data, &cancel).unwrap();
    assert_eq!(paragraphs, vec!["solo".to_string()]);
}

#[test]
fn cancellation_mid_pipeline_surfaces_cancelled_error() {
    let page = page_for_report();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = reconstruct(&page, &[], &cancel).unwrap_err();
    assert!(matches!(err, foliate_core::FoliateError::Cancelled));
}

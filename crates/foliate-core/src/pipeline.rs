//! Orchestrates the fixed per-page stage order: bbox extraction → raw-stream
//! reconstruction → naive merge → font annotation → XY-cut → paragraph
//! assembly. See `run_page` for the single entry point.

use tracing::info_span;

use crate::adapters::{bbox, fontxml, rawtext};
use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::naive_merge::{self, PipelineParams};
use crate::xycut;

/// Runs every stage over one page of `pdf_path`, returning its paragraphs in
/// reading order. Mirrors §5's "raw → naive → fonts → xy-cut → assembly"
/// ordering; `cancel` is checked between each stage.
pub fn run_page(pdf_path: &str, page: u32, params: &PipelineParams, cancel: &CancellationToken) -> Result<Vec<String>> {
    let span = info_span!("page", page);
    let _enter = span.enter();

    cancel.check()?;
    let bbox_page = bbox::extract_page(pdf_path, page)?;
    tracing::debug!(words = bbox_page.data.len(), "bbox extraction complete");

    cancel.check()?;
    let raw_lines = rawtext::extract_lines(pdf_path, page)?;
    let reconstructed = crate::reconstruct::reconstruct(&bbox_page, &raw_lines, cancel)?;
    tracing::debug!(words = reconstructed.data.len(), "raw-stream reconstruction complete");

    cancel.check()?;
    let merged = naive_merge::naive_merge(&reconstructed, params);
    tracing::debug!(words = merged.data.len(), "naive merge complete");

    cancel.check()?;
    let font_entries = fontxml::extract_font_entries(pdf_path, page)?;
    let annotated = fontxml::annotate_fonts(merged, &font_entries);

    cancel.check()?;
    let paragraphs = xycut::segment_into_paragraphs(annotated.data, cancel)?;
    tracing::debug!(paragraphs = paragraphs.len(), "xy-cut and assembly complete");

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_before_any_stage_surfaces_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_page("/nonexistent.pdf", 1, &PipelineParams::default(), &cancel).unwrap_err();
        assert!(matches!(err, crate::error::FoliateError::Cancelled));
    }
}

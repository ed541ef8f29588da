//! Raw-text adapter: runs `pdftotext -raw` and splits its output into lines,
//! preserving content-stream order for the raw-stream reconstructor.

use crate::adapters::process::run_writing_to_tempfile;
use crate::error::Result;

/// `pdftotext` writes to the `<text-file>` argument, not stdout, unless that
/// argument is the literal `-`; this goes through the same scoped-tempfile
/// helper `bbox::extract_page` uses rather than relying on stdout capture.
pub fn extract_lines(pdf_path: &str, page: u32) -> Result<Vec<String>> {
    let page_str = page.to_string();
    let text = run_writing_to_tempfile("pdftotext", &["-raw", "-f", &page_str, "-l", &page_str, pdf_path])?;
    Ok(text.lines().map(str::to_string).collect())
}

//! Bbox text adapter: parses `pdftotext -bbox`'s XML contract into pages of
//! words, then transforms them into crop-box-local space and drops anything
//! that falls outside the page.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::adapters::boxinfo::fetch_box_info;
use crate::adapters::process::run_writing_to_tempfile;
use crate::error::{FoliateError, Result};
use crate::geometry::Rectangle;
use crate::model::{Page, Word};

/// One `<page>` element's worth of raw (not-yet-crop-box-transformed) data.
struct RawPage {
    page: u32,
    width: f64,
    height: f64,
    words: Vec<Word>,
}

/// Runs `pdftotext -bbox` on `pdf_path` for `page` and returns it already
/// translated into crop-box-local coordinates with invisible words dropped.
pub fn extract_page(pdf_path: &str, page: u32) -> Result<Page> {
    let page_str = page.to_string();
    let xml = run_writing_to_tempfile("pdftotext", &["-bbox", "-f", &page_str, "-l", &page_str, pdf_path])?;
    let raw = parse_word_bboxes(&xml)?
        .into_iter()
        .next()
        .ok_or(FoliateError::ExternalToolFailed { tool: "pdftotext", status: None, stderr: "no <page> element in bbox output".into() })?;

    let boxes = fetch_box_info(pdf_path, page)?;
    let crop = boxes.crop.ok_or(FoliateError::ExternalToolFailed {
        tool: "pdfinfo",
        status: None,
        stderr: "no CropBox reported".into(),
    })?;

    Ok(transform_to_crop_box_space(raw, crop))
}

/// Parses the `<doc><page width height><word xMin xMax yMin yMax>text</word>…</page></doc>`
/// document into one `RawPage` per `<page>`, tolerating `xMin`/`xmin` case variance.
fn parse_word_bboxes(xml: &str) -> Result<Vec<RawPage>> {
    let mut reader = Reader::from_str(xml);

    let mut pages = Vec::new();
    let mut page_num = 0u32;

    let mut cur_width = 0.0;
    let mut cur_height = 0.0;
    let mut cur_words: Vec<Word> = Vec::new();
    let mut in_page = false;

    let mut pending: Option<(f64, f64, f64, f64)> = None;
    let mut pending_text = String::new();

    loop {
        match reader.read_event().map_err(|e| FoliateError::ExternalToolFailed {
            tool: "pdftotext",
            status: None,
            stderr: format!("malformed bbox XML: {e}"),
        })? {
            Event::Eof => break,
            Event::Start(tag) if tag.local_name().as_ref() == b"page" => {
                let mut width = 0.0;
                let mut height = 0.0;
                for attr in tag.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default();
                    match attr.key.local_name().as_ref() {
                        b"width" => width = value.parse().unwrap_or(0.0),
                        b"height" => height = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
                page_num += 1;
                cur_width = width;
                cur_height = height;
                cur_words = Vec::new();
                in_page = true;
            }
            Event::End(tag) if tag.local_name().as_ref() == b"page" => {
                if in_page {
                    pages.push(RawPage { page: page_num, width: cur_width, height: cur_height, words: std::mem::take(&mut cur_words) });
                }
                in_page = false;
            }
            Event::Start(tag) if in_page && tag.local_name().as_ref() == b"word" => {
                pending = word_bbox(&tag);
                pending_text.clear();
            }
            Event::Empty(tag) if in_page && tag.local_name().as_ref() == b"word" => {
                if let Some((x, y, w, h)) = word_bbox(&tag) {
                    cur_words.push(Word::new(x, y, w, h, ""));
                }
            }
            Event::Text(text) if pending.is_some() => {
                pending_text.push_str(&text.unescape().unwrap_or_default());
            }
            Event::End(tag) if in_page && tag.local_name().as_ref() == b"word" => {
                if let Some((x, y, w, h)) = pending.take() {
                    cur_words.push(Word::new(x, y, w, h, std::mem::take(&mut pending_text)));
                }
            }
            _ => {}
        }
    }

    Ok(pages)
}

/// Reads `xMin`/`xMax`/`yMin`/`yMax` off a `<word>` tag, tolerating the
/// lowercase spellings some `pdftotext` builds emit.
fn word_bbox(tag: &quick_xml::events::BytesStart<'_>) -> Option<(f64, f64, f64, f64)> {
    let mut min_x = None;
    let mut max_x = None;
    let mut min_y = None;
    let mut max_y = None;
    for attr in tag.attributes().flatten() {
        let value: f64 = attr.unescape_value().unwrap_or_default().parse().unwrap_or(0.0);
        match attr.key.local_name().as_ref().to_ascii_lowercase().as_slice() {
            b"xmin" => min_x = Some(value),
            b"xmax" => max_x = Some(value),
            b"ymin" => min_y = Some(value),
            b"ymax" => max_y = Some(value),
            _ => {}
        }
    }
    match (min_x, max_x, min_y, max_y) {
        (Some(x0), Some(x1), Some(y0), Some(y1)) => Some((x0, y0, x1 - x0, y1 - y0)),
        _ => None,
    }
}

fn transform_to_crop_box_space(raw: RawPage, crop: (f64, f64, f64, f64)) -> Page {
    let (x0, y0, x1, y1) = crop;
    let width = x1 - x0;
    let height = y1 - y0;

    let translated: Vec<Word> = raw
        .words
        .into_iter()
        .map(|mut w| {
            w.x -= x0;
            w.y -= y0;
            w
        })
        .collect();

    let world = Rectangle::new(0.0, 0.0, width, height);
    let visible = translated.into_iter().filter(|w| w.rectangle().intersect(&world).is_some()).collect();

    Page::new(raw.page, width, height, visible)
}

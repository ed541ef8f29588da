//! Font-XML adapter: parses `pdftohtml -xml` into font-annotated text
//! fragments, and `annotate_fonts` votes those fragments' fonts onto the
//! words a bbox/naive-merge pipeline already produced.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::adapters::boxinfo::fetch_box_info;
use crate::adapters::process::run_capturing_stdout;
use crate::error::{FoliateError, Result};
use crate::model::{FontSpec, Page};

/// One `<text>` element, already translated into crop-box-local space.
pub struct FontTextEntry {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub font: FontSpec,
}

/// Runs `pdftohtml -i -xml -zoom 1 -stdout` for `page` and returns its text
/// fragments translated into crop-box-local coordinates, with fragments
/// that fall entirely outside the page already dropped.
pub fn extract_font_entries(pdf_path: &str, page: u32) -> Result<Vec<FontTextEntry>> {
    let page_str = page.to_string();
    let stdout = run_capturing_stdout(
        "pdftohtml",
        &["-i", "-xml", "-zoom", "1", "-f", &page_str, "-l", &page_str, "-stdout", pdf_path],
    )?;
    let xml = String::from_utf8_lossy(&stdout).into_owned();

    let boxes = fetch_box_info(pdf_path, page)?;
    let crop = boxes.crop.ok_or(FoliateError::ExternalToolFailed {
        tool: "pdfinfo",
        status: None,
        stderr: "no CropBox reported".into(),
    })?;

    parse_font_xml(&xml, crop)
}

/// Parses a `<pdf2xml><page width height><fontspec id size color/>…
/// <text top left width height font="id">…</text>…</page></pdf2xml>`
/// document, applying the zero-width workaround and the out-of-page filter.
fn parse_font_xml(xml: &str, crop: (f64, f64, f64, f64)) -> Result<Vec<FontTextEntry>> {
    let (crop_x, crop_y, _, _) = crop;

    let mut reader = Reader::from_str(xml);

    let mut page_width = 0.0;
    let mut page_height = 0.0;
    let mut fontspecs: HashMap<String, FontSpec> = HashMap::new();
    let mut entries = Vec::new();

    let mut pending: Option<(f64, f64, f64, f64, String)> = None;

    loop {
        match reader.read_event().map_err(|e| FoliateError::ExternalToolFailed {
            tool: "pdftohtml",
            status: None,
            stderr: format!("malformed font XML: {e}"),
        })? {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) if tag.local_name().as_ref() == b"page" => {
                for attr in tag.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default();
                    match attr.key.local_name().as_ref() {
                        b"width" => page_width = value.parse().unwrap_or(0.0),
                        b"height" => page_height = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
            }
            Event::Start(tag) | Event::Empty(tag) if tag.local_name().as_ref() == b"fontspec" => {
                let mut id = None;
                let mut size = None;
                let mut color = None;
                for attr in tag.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    match attr.key.local_name().as_ref() {
                        b"id" => id = Some(value),
                        b"size" => size = value.parse::<i32>().ok(),
                        b"color" => color = Some(value.trim_start_matches('#').to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(size), Some(color)) = (id, size, color) {
                    fontspecs.insert(id, FontSpec::new(size, color));
                }
            }
            Event::Start(tag) if tag.local_name().as_ref() == b"text" => {
                pending = text_attrs(&tag);
            }
            Event::Empty(tag) if tag.local_name().as_ref() == b"text" => {
                if let Some((top, left, width, height, font_id)) = text_attrs(&tag) {
                    push_entry(&mut entries, &fontspecs, top, left, width, height, &font_id, crop_x, crop_y, page_width, page_height);
                }
            }
            Event::End(tag) if tag.local_name().as_ref() == b"text" => {
                if let Some((top, left, width, height, font_id)) = pending.take() {
                    push_entry(&mut entries, &fontspecs, top, left, width, height, &font_id, crop_x, crop_y, page_width, page_height);
                }
            }
            _ => {}
        }
    }

    Ok(entries)
}

#[allow(clippy::too_many_arguments)]
fn push_entry(
    entries: &mut Vec<FontTextEntry>,
    fontspecs: &HashMap<String, FontSpec>,
    top: f64,
    left: f64,
    width: f64,
    height: f64,
    font_id: &str,
    crop_x: f64,
    crop_y: f64,
    page_width: f64,
    page_height: f64,
) {
    // pdftohtml sometimes reports a zero width; treat it as square.
    let width = if width == 0.0 { height } else { width };

    if (top >= page_height || top + height <= 0.0) || (left + width <= 0.0 || left > page_width) {
        return;
    }

    let Some(font) = fontspecs.get(font_id) else { return };

    entries.push(FontTextEntry {
        top: top - crop_y,
        left: left - crop_x,
        width,
        height,
        font: font.clone(),
    });
}

fn text_attrs(tag: &quick_xml::events::BytesStart<'_>) -> Option<(f64, f64, f64, f64, String)> {
    let mut top = None;
    let mut left = None;
    let mut width = None;
    let mut height = None;
    let mut font = None;
    for attr in tag.attributes().flatten() {
        let raw = attr.unescape_value().unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"top" => top = raw.parse().ok(),
            b"left" => left = raw.parse().ok(),
            b"width" => width = raw.parse().ok(),
            b"height" => height = raw.parse().ok(),
            b"font" => font = Some(raw.into_owned()),
            _ => {}
        }
    }
    Some((top?, left?, width?, height?, font?))
}

/// Votes each font-XML fragment's font onto the page word whose box
/// contains the fragment's centre point, then assigns each voted-on word
/// the plurality winner among its votes. Words nothing voted for, or whose
/// winning font only ties, keep whatever font they already carried.
pub fn annotate_fonts(mut page: Page, entries: &[FontTextEntry]) -> Page {
    let mut votes: HashMap<usize, Vec<(FontSpec, u32)>> = HashMap::new();

    for entry in entries {
        let center_x = entry.left + entry.width / 2.0;
        let center_y = entry.top + entry.height / 2.0;

        let Some(word_ix) = page.data.iter().position(|w| {
            w.x <= center_x && center_x <= w.x + w.w && w.y <= center_y && center_y <= w.y + w.h
        }) else {
            continue;
        };

        let counter = votes.entry(word_ix).or_default();
        match counter.iter_mut().find(|(font, _)| *font == entry.font) {
            Some((_, count)) => *count += 1,
            None => counter.push((entry.font.clone(), 1)),
        }
    }

    for (word_ix, counter) in votes {
        if let Some((font, _)) = counter.into_iter().max_by_key(|(_, count)| *count) {
            page.data[word_ix].font = Some(font);
        }
    }

    page.with_refreshed_fonts()
}

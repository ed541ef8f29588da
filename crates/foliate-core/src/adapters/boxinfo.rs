//! Box-info adapter: parses `pdfinfo -box`'s `MediaBox: x0 y0 x1 y1`-style
//! lines into the five page-box 4-tuples.

use crate::adapters::process::run_capturing_stdout;
use crate::error::Result;

/// `(x0, y0, x1, y1)` for one of a page's five boxes.
pub type BoxRect = (f64, f64, f64, f64);

#[derive(Debug, Clone, Copy, Default)]
pub struct BoxInfo {
    pub media: Option<BoxRect>,
    pub crop: Option<BoxRect>,
    pub bleed: Option<BoxRect>,
    pub trim: Option<BoxRect>,
    pub art: Option<BoxRect>,
}

pub fn fetch_box_info(pdf_path: &str, page: u32) -> Result<BoxInfo> {
    let page_str = page.to_string();
    let stdout = run_capturing_stdout(
        "pdfinfo",
        &["-box", "-f", &page_str, "-l", &page_str, pdf_path],
    )?;
    Ok(parse_box_info(&String::from_utf8_lossy(&stdout)))
}

fn parse_box_info(text: &str) -> BoxInfo {
    let mut info = BoxInfo::default();
    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        let slot = match parts[0] {
            "MediaBox:" => &mut info.media,
            "CropBox:" => &mut info.crop,
            "BleedBox:" => &mut info.bleed,
            "TrimBox:" => &mut info.trim,
            "ArtBox:" => &mut info.art,
            _ => continue,
        };
        *slot = parse_rect(&parts[1..5]);
    }
    info
}

fn parse_rect(fields: &[&str]) -> Option<BoxRect> {
    if fields.len() != 4 {
        return None;
    }
    let x0 = fields[0].parse().ok()?;
    let y0 = fields[1].parse().ok()?;
    let x1 = fields[2].parse().ok()?;
    let y1 = fields[3].parse().ok()?;
    Some((x0, y0, x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // S1: media=(0,0,683.15,853.23), crop=(36.85,36.85,646.30,816.38).
    #[test]
    fn s1_parses_media_and_crop_boxes() {
        let text = "Page size:      683.15 x 853.23 pts\n\
                     MediaBox:           0.00     0.00   683.15   853.23\n\
                     CropBox:            36.85    36.85   646.30   816.38\n";
        let info = parse_box_info(text);
        assert_eq!(info.media, Some((0.0, 0.0, 683.15, 853.23)));
        assert_eq!(info.crop, Some((36.85, 36.85, 646.30, 816.38)));
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let info = parse_box_info("Producer: some tool\nPages: 1\n");
        assert!(info.media.is_none());
        assert!(info.crop.is_none());
    }
}

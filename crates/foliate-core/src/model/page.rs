//! `Page`: a page number, crop-box dimensions, and an ordered word list.

use serde::{Deserialize, Serialize};

use crate::model::font::FontSpec;
use crate::model::word::Word;

/// A page, already transformed into crop-box-local coordinates. `fonts`,
/// when present, is the deduplicated set of `FontSpec`s referenced by
/// `data`; a missing `fonts` array on the wire deserializes to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub width: f64,
    pub height: f64,
    pub data: Vec<Word>,
    #[serde(default)]
    pub fonts: Vec<FontSpec>,
}

impl Page {
    pub fn new(page: u32, width: f64, height: f64, data: Vec<Word>) -> Self {
        let fonts = collect_fonts(&data);
        Self { page, width, height, data, fonts }
    }

    /// Rebuilds `fonts` from the fonts actually referenced by `data`,
    /// deduplicated by value. Pipeline stages that replace `data` call this
    /// to keep the font-set invariant (every word's font is an element of
    /// the page's font set) after each stage.
    pub fn with_refreshed_fonts(mut self) -> Self {
        self.fonts = collect_fonts(&self.data);
        self
    }
}

fn collect_fonts(words: &[Word]) -> Vec<FontSpec> {
    let mut seen = Vec::new();
    for word in words {
        if let Some(font) = &word.font {
            if !seen.contains(font) {
                seen.push(font.clone());
            }
        }
    }
    seen
}

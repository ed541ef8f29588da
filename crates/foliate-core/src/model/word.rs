//! `Word`: a rectangle with text, derived orientation, and an optional font.

use serde::{Deserialize, Serialize};

use crate::geometry::Rectangle;
use crate::model::font::FontSpec;

/// The layout direction a word's box suggests, purely from its own shape.
/// A single character (or a square box) carries no directional signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Unknown,
    Landscape,
    Portrait,
}

fn orientation_of(w: f64, h: f64, text: &str) -> Orientation {
    if text.chars().count() <= 1 || w == h {
        Orientation::Unknown
    } else if w > h {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// A text-bearing rectangle: the `TextRectangle` of the spec, folded
/// directly into `Word` since nothing in this crate needs a bare
/// text-rectangle without an (optional) font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub t: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
}

impl Word {
    pub fn new(x: f64, y: f64, w: f64, h: f64, t: impl Into<String>) -> Self {
        Self { x, y, w, h, t: t.into(), font: None }
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn rectangle(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.w, self.h)
    }

    pub fn orientation(&self) -> Orientation {
        orientation_of(self.w, self.h, &self.t)
    }

    /// Extent along the given reading direction: width for left-to-right,
    /// height for top-to-bottom. Used by the font-size-proxy rules in
    /// naive merging and by paragraph assembly's `avg_char_size`.
    pub fn extent_landscape(&self) -> f64 {
        self.h
    }

    pub fn extent_portrait(&self) -> f64 {
        self.w
    }
}

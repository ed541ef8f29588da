//! Naive geometric merger (component N): joins adjacent word boxes on the
//! same baseline or column by orientation, gap, angle, and font-size
//! compatibility alone.

use tracing::debug;

use crate::geometry::Point;
use crate::model::{Orientation, Page, Word};

/// cos(5°). Two centroids are "aligned" with an axis when the cosine of
/// the angle their connecting vector makes with that axis is at least this.
const ANGLE_SIMILARITY: f64 = 0.9961946980917455;

/// Tunables for the naive merge pass, mirroring `LAParams`-style parameter
/// structs: a plain `Default`-able config rather than free function args.
#[derive(Debug, Clone, Copy)]
pub struct PipelineParams {
    pub normalize_width: f64,
    pub min_dist: f64,
    pub font_ratio: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self { normalize_width: 1000.0, min_dist: 3.0, font_ratio: 0.9 }
    }
}

/// Runs the naive merger to a fixed point: repeatedly scans all unmerged
/// pairs and merges any compatible ones, restarting after every merge
/// round, until a full pass finds nothing to merge.
pub fn naive_merge(page: &Page, params: &PipelineParams) -> Page {
    if page.width == 0.0 {
        return page.clone();
    }

    let scale = params.normalize_width / page.width;
    let mut words: Vec<Word> = page.data.iter().map(|w| scale_word(w, scale)).collect();

    loop {
        let mut merged_any = false;
        let mut is_merged = vec![false; words.len()];
        let mut next_round: Vec<Word> = Vec::new();

        for i in 0..words.len() {
            if is_merged[i] {
                continue;
            }
            let mut current = words[i].clone();
            for j in (i + 1)..words.len() {
                if is_merged[j] {
                    continue;
                }
                if let Some(merged) = try_merge(&current, &words[j], params) {
                    current = merged;
                    is_merged[j] = true;
                    merged_any = true;
                }
            }
            next_round.push(current);
        }

        words = next_round;
        if !merged_any {
            break;
        }
    }

    debug!(merged_count = words.len(), "naive merge converged");
    let words: Vec<Word> = words.into_iter().map(|w| scale_word(&w, 1.0 / scale)).collect();
    Page::new(page.page, page.width, page.height, words).with_refreshed_fonts()
}

fn scale_word(word: &Word, factor: f64) -> Word {
    let mut scaled = Word::new(word.x * factor, word.y * factor, word.w * factor, word.h * factor, word.t.clone());
    scaled.font = word.font.clone();
    scaled
}

fn try_merge(a: &Word, b: &Word, params: &PipelineParams) -> Option<Word> {
    let o1 = a.orientation();
    let o2 = b.orientation();

    if o1 == Orientation::Unknown && o2 == Orientation::Unknown {
        let may_portrait = may_merge_in_portrait_direction(a, b, params);
        let may_landscape = may_merge_in_landscape_direction(a, b, params);

        return if may_portrait && may_landscape {
            // Tie-break: tentative union decides the orientation to merge along.
            let union = a.rectangle().union(&b.rectangle());
            if union.h > union.w {
                Some(merge_in_portrait_direction(a, b))
            } else {
                Some(merge_in_landscape_direction(a, b))
            }
        } else if may_portrait {
            Some(merge_in_portrait_direction(a, b))
        } else if may_landscape {
            Some(merge_in_landscape_direction(a, b))
        } else {
            None
        };
    }

    if o1 == Orientation::Portrait || o2 == Orientation::Portrait {
        if may_merge_in_portrait_direction(a, b, params) {
            return Some(merge_in_portrait_direction(a, b));
        }
    }

    if o1 == Orientation::Landscape || o2 == Orientation::Landscape {
        if may_merge_in_landscape_direction(a, b, params) {
            return Some(merge_in_landscape_direction(a, b));
        }
    }

    None
}

fn centroid(w: &Word) -> Point {
    Point::new(w.x + w.w / 2.0, w.y + w.h / 2.0)
}

fn may_merge_in_landscape_direction(a: &Word, b: &Word, params: &PipelineParams) -> bool {
    if a.orientation() == Orientation::Portrait || b.orientation() == Orientation::Portrait {
        return false;
    }

    let ra = a.rectangle();
    let rb = b.rectangle();
    let dx = ra.x_norm(&rb);
    let dy = ra.y_norm(&rb);
    if dx > params.min_dist || dy != 0.0 {
        return false;
    }

    let v = centroid(a) - centroid(b);
    let cos = v.x.abs() / (v.x * v.x + v.y * v.y).sqrt();
    if cos < ANGLE_SIMILARITY {
        return false;
    }

    // Landscape font-size proxy: height.
    font_ratio_compatible(a.h, b.h, params)
}

fn may_merge_in_portrait_direction(a: &Word, b: &Word, params: &PipelineParams) -> bool {
    if a.orientation() == Orientation::Landscape || b.orientation() == Orientation::Landscape {
        return false;
    }

    let ra = a.rectangle();
    let rb = b.rectangle();
    let dy = ra.y_norm(&rb);
    let dx = ra.x_norm(&rb);
    if dy > params.min_dist || dx != 0.0 {
        return false;
    }

    let v = centroid(a) - centroid(b);
    let cos = v.y.abs() / (v.x * v.x + v.y * v.y).sqrt();
    if cos < ANGLE_SIMILARITY {
        return false;
    }

    // Portrait font-size proxy: width.
    font_ratio_compatible(a.w, b.w, params)
}

fn font_ratio_compatible(size1: f64, size2: f64, params: &PipelineParams) -> bool {
    let ratio = size1 / size2;
    ratio >= params.font_ratio && ratio <= 1.0 / params.font_ratio
}

fn merge_in_landscape_direction(a: &Word, b: &Word) -> Word {
    let rect = a.rectangle().union(&b.rectangle());
    let text = if a.x <= b.x { format!("{}{}", a.t, b.t) } else { format!("{}{}", b.t, a.t) };
    Word::new(rect.x, rect.y, rect.w, rect.h, text)
}

fn merge_in_portrait_direction(a: &Word, b: &Word) -> Word {
    let rect = a.rectangle().union(&b.rectangle());
    let text = if a.y <= b.y { format!("{}{}", a.t, b.t) } else { format!("{}{}", b.t, a.t) };
    Word::new(rect.x, rect.y, rect.w, rect.h, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    // S7: one landscape word, one portrait word: never merge.
    #[test]
    fn s7_refuses_to_merge_incompatible_orientations() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 200.0, 100.0, "AB"),
                Word::new(0.5, 0.5, 100.0, 200.0, "CD"),
            ],
        );
        let out = naive_merge(&page, &PipelineParams::default());
        assert_eq!(out.data.len(), 2);
    }

    #[test]
    fn merges_adjacent_landscape_words_on_the_same_baseline() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 40.0, 10.0, "AB"),
                Word::new(41.0, 0.0, 40.0, 10.0, "CD"),
            ],
        );
        let out = naive_merge(&page, &PipelineParams::default());
        assert_eq!(out.data.len(), 1);
        assert_eq!(out.data[0].t, "ABCD");
    }

    #[test]
    fn does_not_merge_across_large_gap() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 40.0, 10.0, "AB"),
                Word::new(200.0, 0.0, 40.0, 10.0, "CD"),
            ],
        );
        let out = naive_merge(&page, &PipelineParams::default());
        assert_eq!(out.data.len(), 2);
    }

    #[test]
    fn merges_stacked_portrait_words() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 10.0, 40.0, "AB"),
                Word::new(0.0, 41.0, 10.0, 40.0, "CD"),
            ],
        );
        let out = naive_merge(&page, &PipelineParams::default());
        assert_eq!(out.data.len(), 1);
        assert_eq!(out.data[0].t, "ABCD");
    }

    #[test]
    fn refuses_merge_when_font_size_ratio_out_of_band() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 40.0, 5.0, "AB"),
                Word::new(41.0, 0.0, 40.0, 50.0, "CD"),
            ],
        );
        let out = naive_merge(&page, &PipelineParams::default());
        assert_eq!(out.data.len(), 2);
    }
}

//! DocumentSpace tree and the recursive XY-cut itself (component X):
//! partitions a page into a reading-order tree by alternately searching for
//! the widest vertical, then widest horizontal, whitespace gap.

use crate::cancellation::CancellationToken;
use crate::error::{FoliateError, Result};
use crate::geometry::{Interval, IntervalList, Rectangle};
use crate::model::{Orientation, Word};

use super::stat::WordStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingDirection {
    LeftToRight,
    TopToBottom,
}

/// A node in the XY-cut tree: either a leaf holding its words, or an
/// internal node whose children are ordered exactly as reading order
/// dictates.
pub struct DocumentSpace {
    pub words: Vec<Word>,
    pub subspaces: Option<Vec<DocumentSpace>>,
}

impl DocumentSpace {
    pub(crate) fn new(words: Vec<Word>) -> Self {
        Self { words, subspaces: None }
    }

    pub fn reading_direction(&self) -> Result<ReadingDirection> {
        match self.words.len() {
            0 => Err(FoliateError::EmptySpace),
            1 => match self.words[0].orientation() {
                Orientation::Unknown => Err(FoliateError::UndetectableOrientation),
                Orientation::Landscape => Ok(ReadingDirection::LeftToRight),
                Orientation::Portrait => Ok(ReadingDirection::TopToBottom),
            },
            _ => {
                let stat = WordStatistics::compute(&self.words);
                if stat.horizontal_word_count > stat.vertical_word_count {
                    Ok(ReadingDirection::LeftToRight)
                } else {
                    Ok(ReadingDirection::TopToBottom)
                }
            }
        }
    }

    /// Depth-first, in reading order: every leaf's word list, in the order
    /// paragraphs should be emitted.
    pub fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a [Word]>) {
        match &self.subspaces {
            None => out.push(&self.words),
            Some(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn world_bbox(&self) -> (f64, f64, f64, f64) {
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for word in &self.words {
            x0 = x0.min(word.x);
            y0 = y0.min(word.y);
            x1 = x1.max(word.x + word.w);
            y1 = y1.max(word.y + word.h);
        }
        (x0, y0, x1, y1)
    }

    pub fn enumerate_vertical_cuts(&self, min_size: f64, scale: f64, offset: f64) -> Vec<Rectangle> {
        let (_x0, y0, _x1, y1) = self.world_bbox();
        let mut intervals = IntervalList::new();
        for word in &self.words {
            intervals.add(scaled_interval(word.x, word.x + word.w, scale, offset));
        }
        intervals
            .gaps()
            .into_iter()
            .filter(|gap| gap.length() >= min_size)
            .map(|gap| Rectangle::new(gap.begin, y0, gap.length(), y1 - y0))
            .collect()
    }

    pub fn enumerate_horizontal_cuts(&self, min_size: f64, scale: f64, offset: f64) -> Vec<Rectangle> {
        let (x0, _y0, x1, _y1) = self.world_bbox();
        let mut intervals = IntervalList::new();
        for word in &self.words {
            intervals.add(scaled_interval(word.y, word.y + word.h, scale, offset));
        }
        intervals
            .gaps()
            .into_iter()
            .filter(|gap| gap.length() >= min_size)
            .map(|gap| Rectangle::new(x0, gap.begin, x1 - x0, gap.length()))
            .collect()
    }

    pub fn get_widest_vertical_cut(&self, min_size: f64, scale: f64, offset: f64) -> Option<Rectangle> {
        widest(self.enumerate_vertical_cuts(min_size, scale, offset), |r| r.w)
    }

    pub fn get_widest_horizontal_cut(&self, min_size: f64, scale: f64, offset: f64) -> Option<Rectangle> {
        widest(self.enumerate_horizontal_cuts(min_size, scale, offset), |r| r.h)
    }

    /// Splits into two subspaces by `cut_point` (an x coordinate); words
    /// whose centre falls exactly on the line raise `CutThroughWord`.
    pub fn cut_vertically(&mut self, cut_point: f64, left_first: bool) -> Result<()> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for word in self.words.drain(..) {
            let center = word.x + word.w / 2.0;
            if center > cut_point {
                right.push(word);
            } else if center < cut_point {
                left.push(word);
            } else {
                return Err(FoliateError::CutThroughWord);
            }
        }
        self.subspaces = Some(if left_first {
            vec![DocumentSpace::new(left), DocumentSpace::new(right)]
        } else {
            vec![DocumentSpace::new(right), DocumentSpace::new(left)]
        });
        Ok(())
    }

    pub fn cut_horizontally(&mut self, cut_point: f64, up_first: bool) -> Result<()> {
        let mut up = Vec::new();
        let mut down = Vec::new();
        for word in self.words.drain(..) {
            let center = word.y + word.h / 2.0;
            if center > cut_point {
                down.push(word);
            } else if center < cut_point {
                up.push(word);
            } else {
                return Err(FoliateError::CutThroughWord);
            }
        }
        self.subspaces = Some(if up_first {
            vec![DocumentSpace::new(up), DocumentSpace::new(down)]
        } else {
            vec![DocumentSpace::new(down), DocumentSpace::new(up)]
        });
        Ok(())
    }

    /// Clusters by y-midpoint gaps, top to bottom; a space with no internal
    /// gaps returns a single cluster holding every word. `scale` shrinks
    /// each word's y-projection about its centre before gaps are searched
    /// (the XY-cut recursion uses 1.0 — no shrink; paragraph assembly
    /// uses 0.5 to split more eagerly into line-like segments).
    pub fn segment_words_horizontally(&self, scale: f64) -> Vec<Vec<Word>> {
        let cuts = self.enumerate_horizontal_cuts(0.0, scale, 0.0);
        if cuts.is_empty() {
            return vec![self.words.clone()];
        }

        let mut boundaries = vec![0.0];
        boundaries.extend(cuts.iter().map(|c| c.y + c.h / 2.0));
        boundaries.push(f64::INFINITY);

        boundaries
            .windows(2)
            .map(|pair| {
                let (y1, y2) = (pair[0], pair[1]);
                self.words
                    .iter()
                    .filter(|w| {
                        let mid = w.y + w.h / 2.0;
                        y1 <= mid && mid <= y2
                    })
                    .cloned()
                    .collect()
            })
            .collect()
    }

    /// Clusters by x-midpoint gaps, right to left (reading columns in
    /// top-to-bottom direction are read right to left). See
    /// `segment_words_horizontally` for `scale`'s meaning.
    pub fn segment_words_vertically(&self, scale: f64) -> Vec<Vec<Word>> {
        let cuts = self.enumerate_vertical_cuts(0.0, scale, 0.0);
        if cuts.is_empty() {
            return vec![self.words.clone()];
        }

        let mut boundaries = vec![0.0];
        boundaries.extend(cuts.iter().map(|c| c.x + c.w / 2.0));
        boundaries.push(f64::INFINITY);
        boundaries.reverse();

        boundaries
            .windows(2)
            .map(|pair| {
                let (x1, x2) = (pair[0], pair[1]);
                self.words
                    .iter()
                    .filter(|w| {
                        let mid = w.x + w.w / 2.0;
                        x2 <= mid && mid <= x1
                    })
                    .cloned()
                    .collect()
            })
            .collect()
    }
}

fn scaled_interval(begin: f64, end: f64, scale: f64, offset: f64) -> Interval {
    let (begin, end) = if scale != 1.0 {
        let new_begin = (begin * (1.0 + scale) + end * (1.0 - scale)) * 0.5;
        let new_end = (begin * (1.0 - scale) + end * (1.0 + scale)) * 0.5;
        (new_begin, new_end)
    } else {
        (begin, end)
    };
    Interval::new(begin + offset, end + offset)
}

/// Widest-by-key, keeping the first maximum on ties (matching the
/// original's `max(*cuts, key=...)` first-occurrence behavior).
fn widest(cuts: Vec<Rectangle>, key: impl Fn(&Rectangle) -> f64) -> Option<Rectangle> {
    let mut iter = cuts.into_iter();
    let mut best = iter.next()?;
    let mut best_key = key(&best);
    for cut in iter {
        let k = key(&cut);
        if k > best_key {
            best = cut;
            best_key = k;
        }
    }
    Some(best)
}

/// Builds the XY-cut tree for `words` (a non-empty page's words),
/// checking `cancel` before descending into each recursion level.
pub fn build_tree(words: Vec<Word>, cancel: &CancellationToken) -> Result<DocumentSpace> {
    let mut root = DocumentSpace::new(words);
    cut(&mut root, cancel)?;
    Ok(root)
}

fn cut(space: &mut DocumentSpace, cancel: &CancellationToken) -> Result<()> {
    cancel.check()?;

    if space.words.len() <= 1 {
        return Ok(());
    }

    match space.reading_direction()? {
        ReadingDirection::LeftToRight => cut_left_to_right(space, cancel),
        ReadingDirection::TopToBottom => cut_top_to_bottom(space, cancel),
    }
}

fn recurse_children(space: &mut DocumentSpace, cancel: &CancellationToken) -> Result<()> {
    if let Some(children) = &mut space.subspaces {
        for child in children.iter_mut() {
            cut(child, cancel)?;
        }
    }
    Ok(())
}

fn coalesce_clusters(clusters: Vec<Vec<Word>>) -> Option<Vec<Vec<Word>>> {
    if clusters.len() == 1 {
        return None;
    }
    if clusters.iter().any(|c| c.len() == 1) {
        return None;
    }

    let mut subspaces: Vec<Vec<Word>> = vec![clusters[0].clone()];
    for cluster in clusters.into_iter().skip(1) {
        let prev_len = subspaces.last().unwrap().len();
        let curr_len = cluster.len();
        let both_solitary = prev_len == 1 && curr_len == 1;
        let both_multi = prev_len > 1 && curr_len > 1;
        if both_solitary || both_multi {
            subspaces.last_mut().unwrap().extend(cluster);
        } else {
            subspaces.push(cluster);
        }
    }

    if subspaces.len() == 1 {
        None
    } else {
        Some(subspaces)
    }
}

fn cut_left_to_right(space: &mut DocumentSpace, cancel: &CancellationToken) -> Result<()> {
    if let Some(cut) = space.get_widest_vertical_cut(0.0, 0.9, 0.0) {
        space.cut_vertically(cut.x, true)?;
        return recurse_children(space, cancel);
    }

    let min_size = 2.0 * WordStatistics::compute(&space.words).median_height;
    if let Some(cut) = space.get_widest_horizontal_cut(min_size, 1.0, 0.0) {
        space.cut_horizontally(cut.y, true)?;
        return recurse_children(space, cancel);
    }

    let clusters = space.segment_words_horizontally(1.0);
    if let Some(subspaces) = coalesce_clusters(clusters) {
        space.subspaces = Some(subspaces.into_iter().map(DocumentSpace::new).collect());
        recurse_children(space, cancel)
    } else {
        Ok(())
    }
}

fn cut_top_to_bottom(space: &mut DocumentSpace, cancel: &CancellationToken) -> Result<()> {
    if let Some(cut) = space.get_widest_horizontal_cut(0.0, 0.9, 0.0) {
        space.cut_horizontally(cut.y, true)?;
        return recurse_children(space, cancel);
    }

    let min_size = 2.0 * WordStatistics::compute(&space.words).median_width;
    if let Some(cut) = space.get_widest_vertical_cut(min_size, 1.0, 0.0) {
        space.cut_vertically(cut.x, false)?;
        return recurse_children(space, cancel);
    }

    let clusters = space.segment_words_vertically(1.0);
    if let Some(subspaces) = coalesce_clusters(clusters) {
        space.subspaces = Some(subspaces.into_iter().map(DocumentSpace::new).collect());
        recurse_children(space, cancel)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(x: f64, y: f64, w: f64, h: f64, t: &str) -> Word {
        Word::new(x, y, w, h, t)
    }

    #[test]
    fn reading_direction_empty_is_error() {
        let space = DocumentSpace::new(vec![]);
        assert!(matches!(space.reading_direction(), Err(FoliateError::EmptySpace)));
    }

    #[test]
    fn reading_direction_single_unknown_word_is_error() {
        let space = DocumentSpace::new(vec![word(0.0, 0.0, 10.0, 10.0, "x")]);
        assert!(matches!(space.reading_direction(), Err(FoliateError::UndetectableOrientation)));
    }

    #[test]
    fn reading_direction_single_landscape_word_is_left_to_right() {
        let space = DocumentSpace::new(vec![word(0.0, 0.0, 20.0, 10.0, "ab")]);
        assert_eq!(space.reading_direction().unwrap(), ReadingDirection::LeftToRight);
    }

    // S2-derived: add [40,50],[20,30],[0,10] as word x-intervals -> 2 gaps.
    #[test]
    fn s2_vertical_cuts_expose_interval_list_gaps() {
        let space = DocumentSpace::new(vec![
            word(40.0, 0.0, 10.0, 10.0, "ab"),
            word(20.0, 0.0, 10.0, 10.0, "cd"),
            word(0.0, 0.0, 10.0, 10.0, "ef"),
        ]);
        let cuts = space.enumerate_vertical_cuts(0.0, 1.0, 0.0);
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0].x, 10.0);
        assert_eq!(cuts[1].x, 30.0);
    }

    // S6: six words in a 3-column layout; widest vertical cut splits 2 vs 4.
    #[test]
    fn s6_xycut_column_scenario() {
        let words = vec![
            word(0.0, 0.0, 50.0, 20.0, "aa"),
            word(0.0, 100.0, 50.0, 20.0, "bb"),
            word(500.0, 0.0, 50.0, 20.0, "cc"),
            word(500.0, 100.0, 50.0, 20.0, "dd"),
            word(1000.0, 0.0, 50.0, 20.0, "ee"),
            word(1000.0, 100.0, 50.0, 20.0, "ff"),
        ];
        let cancel = CancellationToken::new();
        let tree = build_tree(words, &cancel).unwrap();
        let mut leaves = Vec::new();
        tree.collect_leaves(&mut leaves);
        assert!(leaves.len() >= 2);
        assert_eq!(leaves.iter().map(|l| l.len()).sum::<usize>(), 6);
    }

    #[test]
    fn cut_through_word_is_rejected() {
        let mut space = DocumentSpace::new(vec![word(0.0, 0.0, 10.0, 10.0, "ab")]);
        assert!(matches!(space.cut_vertically(5.0, true), Err(FoliateError::CutThroughWord)));
    }

    #[test]
    fn coalesce_keeps_solitary_clusters_apart_from_multi_clusters() {
        let solitary = vec![word(0.0, 0.0, 10.0, 10.0, "a")];
        let multi = vec![word(0.0, 0.0, 10.0, 10.0, "b"), word(20.0, 0.0, 10.0, 10.0, "c")];
        let clusters = vec![solitary.clone(), multi.clone()];
        // A solitary cluster adjacent to a multi cluster never merges, so
        // `any cluster len==1` triggers the leaf termination directly.
        assert!(coalesce_clusters(clusters).is_none());
    }

    #[test]
    fn coalesce_merges_two_multi_word_clusters() {
        let a = vec![word(0.0, 0.0, 10.0, 10.0, "a"), word(20.0, 0.0, 10.0, 10.0, "b")];
        let b = vec![word(40.0, 0.0, 10.0, 10.0, "c"), word(60.0, 0.0, 10.0, 10.0, "d")];
        let c = vec![word(80.0, 0.0, 10.0, 10.0, "e"), word(100.0, 0.0, 10.0, 10.0, "f")];
        let merged = coalesce_clusters(vec![a, b, c]);
        assert!(merged.is_none() || merged.unwrap().len() == 1);
    }
}

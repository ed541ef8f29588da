//! `Stream`/`Match`: the per-page data structures the raw-stream
//! reconstructor uses to associate words with content-stream lines.

use std::collections::HashMap;

use crate::geometry::Point;

/// A witness that `matches[i]` covers `stream[start..end]`. Indices refer
/// back into the reconstructor's flat word/stream arrays rather than
/// pointers, so `Word`/`Stream` never reference each other directly.
#[derive(Debug, Clone, Copy)]
pub struct Match {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// One content-stream text line, plus the matches currently believed to
/// tile it.
#[derive(Debug, Clone)]
pub struct Stream {
    pub text: String,
    pub matches: Vec<Match>,
}

impl Stream {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), matches: Vec::new() }
    }

    /// Every (possibly overlapping) start offset at which `needle` occurs
    /// in this stream. Advances by one *char* past each match so a
    /// multi-byte match (e.g. a CJK word) never lands the next search slice
    /// on a non-char boundary.
    pub fn find_all(&self, needle: &str) -> Vec<usize> {
        if needle.is_empty() {
            return Vec::new();
        }
        let mut starts = Vec::new();
        let mut search_from = 0;
        while search_from <= self.text.len() {
            match self.text[search_from..].find(needle) {
                Some(rel) => {
                    let start = search_from + rel;
                    starts.push(start);
                    let advance = self.text[start..].chars().next().map_or(1, char::len_utf8);
                    search_from = start + advance;
                }
                None => break,
            }
        }
        starts
    }

    /// True iff `self.matches` tile every non-space byte of the stream
    /// exactly once, leaving space bytes uncovered or covered (either is
    /// fine — only a double cover or an uncovered non-space byte fails).
    pub fn may_merge(&self) -> bool {
        may_reconstruct_by(&self.text, &self.matches)
    }

    /// Attempts to replace `self.matches` with a subset that tiles the
    /// stream exactly, using `word_centroids` (indexed by `Match::index`)
    /// to score candidate subsets. Mutates `self.matches` and returns
    /// `true` on success; leaves `self.matches` untouched on failure.
    /// Results are memoized in `cache`, keyed by stream text + match set,
    /// per the per-page (never global) cache this stage requires.
    pub fn discard_outliers(
        &mut self,
        word_centroids: &HashMap<usize, Point>,
        cache: &mut HashMap<String, Option<Vec<Match>>>,
    ) -> bool {
        let num_matches = self.matches.len();
        if !(3..=30).contains(&num_matches) {
            return false;
        }

        let key = cache_key(&self.text, &self.matches);
        if let Some(cached) = cache.get(&key) {
            if let Some(best) = cached {
                self.matches = best.clone();
                return true;
            }
            return false;
        }

        let target_mask = target_mask(&self.text);
        let combos = enumerate_tiling_combinations(&self.text, &self.matches, &target_mask);

        let mut best_cost = f64::INFINITY;
        let mut best: Option<Vec<usize>> = None;

        for combo in &combos {
            if combo.len() <= 1 {
                continue;
            }
            if has_duplicate_word(&self.matches, combo) {
                continue;
            }
            if !co_monotonic_in_start_and_x(&self.matches, combo, word_centroids) {
                continue;
            }

            let points: Vec<Point> = combo
                .iter()
                .map(|&ix| word_centroids[&self.matches[ix].index])
                .collect();
            let (slope, _intercept) = linear_regression(&points);
            let slope = match slope {
                Some(s) => s,
                None => f64::INFINITY,
            };
            let x_variance = variance(&points.iter().map(|p| p.x).collect::<Vec<_>>());
            let cost = (slope.abs() + 1.0e-6) * x_variance;

            if cost < best_cost {
                best_cost = cost;
                best = Some(combo.clone());
            }
        }

        match best {
            Some(indices) => {
                let new_matches: Vec<Match> = indices.iter().map(|&ix| self.matches[ix]).collect();
                cache.insert(key, Some(new_matches.clone()));
                self.matches = new_matches;
                true
            }
            None => {
                cache.insert(key, None);
                false
            }
        }
    }
}

fn may_reconstruct_by(stream: &str, matches: &[Match]) -> bool {
    if matches.is_empty() {
        return false;
    }
    let bytes = stream.as_bytes();
    let mut counter = vec![0u32; bytes.len()];
    for m in matches {
        for c in counter.iter_mut().take(m.end).skip(m.start) {
            *c += 1;
        }
    }
    for (ix, &count) in counter.iter().enumerate() {
        if count > 1 {
            return false;
        }
        if count == 0 && bytes[ix] != b' ' {
            return false;
        }
    }
    true
}

fn target_mask(stream: &str) -> Vec<bool> {
    stream.bytes().map(|b| b != b' ').collect()
}

fn cache_key(stream: &str, matches: &[Match]) -> String {
    let indices: Vec<String> = matches.iter().map(|m| m.index.to_string()).collect();
    format!("[{}][{}]", stream, indices.join(","))
}

/// Enumerates every subset of `matches` (by index into `matches`) whose
/// covered bytes exactly equal `target_mask`, with no byte covered twice.
/// Bounded by the `num_matches <= 30` guard in `discard_outliers`.
fn enumerate_tiling_combinations(
    stream: &str,
    matches: &[Match],
    target_mask: &[bool],
) -> Vec<Vec<usize>> {
    let mut results = Vec::new();
    for start_ix in 0..matches.len() {
        let mut mask = vec![false; stream.len()];
        for i in matches[start_ix].start..matches[start_ix].end {
            mask[i] = true;
        }
        recursive_find_combination(matches, vec![start_ix], mask, start_ix + 1, target_mask, &mut results);
    }
    results
}

fn recursive_find_combination(
    matches: &[Match],
    current: Vec<usize>,
    mask: Vec<bool>,
    next_ix: usize,
    target_mask: &[bool],
    results: &mut Vec<Vec<usize>>,
) {
    if mask == target_mask {
        results.push(current);
        return;
    }

    for match_ix in next_ix..matches.len() {
        let candidate = &matches[match_ix];
        let mut next_mask = mask.clone();
        let mut ok = true;
        for i in candidate.start..candidate.end {
            if next_mask[i] {
                ok = false;
                break;
            }
            next_mask[i] = true;
        }
        if ok {
            let mut next_current = current.clone();
            next_current.push(match_ix);
            recursive_find_combination(matches, next_current, next_mask, match_ix + 1, target_mask, results);
        }
    }
}

fn has_duplicate_word(matches: &[Match], combo: &[usize]) -> bool {
    let mut seen = std::collections::HashSet::new();
    for &ix in combo {
        if !seen.insert(matches[ix].index) {
            return true;
        }
    }
    false
}

fn co_monotonic_in_start_and_x(
    matches: &[Match],
    combo: &[usize],
    word_centroids: &HashMap<usize, Point>,
) -> bool {
    let mut by_start: Vec<usize> = combo.to_vec();
    by_start.sort_by_key(|&ix| matches[ix].start);

    let mut by_x: Vec<usize> = combo.to_vec();
    by_x.sort_by(|&a, &b| {
        let xa = word_centroids[&matches[a].index].x;
        let xb = word_centroids[&matches[b].index].x;
        xa.partial_cmp(&xb).unwrap()
    });

    by_start == by_x
}

/// Simple linear regression `y = a*x + b`. Returns `(None, _)` when every
/// point shares the same x (a vertical line has no slope).
fn linear_regression(points: &[Point]) -> (Option<f64>, Option<f64>) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let denominator: f64 = points.iter().map(|p| (p.x - mean_x).powi(2)).sum();
    if denominator == 0.0 {
        return (None, None);
    }

    let numerator: f64 = points.iter().map(|p| (p.x - mean_x) * (p.y - mean_y)).sum();
    let a = numerator / denominator;
    let b = mean_y - a * mean_x;
    (Some(a), Some(b))
}

fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let mean_sq = values.iter().map(|v| v * v).sum::<f64>() / n;
    mean_sq - mean * mean
}

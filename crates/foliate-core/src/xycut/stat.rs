//! Word statistics (component S): single-pass width/height mean, variance,
//! and median, plus orientation counts, used by the XY-cut to choose a
//! reading direction and cut thresholds.

use crate::model::{Orientation, Word};

#[derive(Debug, Clone, Copy, Default)]
pub struct WordStatistics {
    pub count: usize,
    pub avg_width: f64,
    pub avg_height: f64,
    pub var_width: f64,
    pub var_height: f64,
    pub median_width: f64,
    pub median_height: f64,
    pub horizontal_word_count: usize,
    pub vertical_word_count: usize,
}

impl WordStatistics {
    pub fn compute(words: &[Word]) -> Self {
        let mut stats = WordStatistics { count: words.len(), ..Default::default() };
        if words.is_empty() {
            return stats;
        }

        for word in words {
            stats.avg_width += word.w;
            stats.var_width += word.w * word.w;
            stats.avg_height += word.h;
            stats.var_height += word.h * word.h;

            match word.orientation() {
                Orientation::Landscape => stats.horizontal_word_count += 1,
                Orientation::Portrait => stats.vertical_word_count += 1,
                Orientation::Unknown => {}
            }
        }

        let n = stats.count as f64;
        stats.avg_width /= n;
        stats.var_width = stats.var_width / n - stats.avg_width * stats.avg_width;
        stats.avg_height /= n;
        stats.var_height = stats.var_height / n - stats.avg_height * stats.avg_height;

        stats.median_width = median(words.iter().map(|w| w.w));
        stats.median_height = median(words.iter().map(|w| w.h));

        stats
    }
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_word_list_is_all_zero() {
        let stats = WordStatistics::compute(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg_width, 0.0);
    }

    #[test]
    fn mean_and_variance_match_formula() {
        let words = vec![
            Word::new(0.0, 0.0, 2.0, 4.0, "ab"),
            Word::new(0.0, 0.0, 4.0, 8.0, "cd"),
        ];
        let stats = WordStatistics::compute(&words);
        assert_eq!(stats.avg_width, 3.0);
        // E[X^2] - E[X]^2 = (4+16)/2 - 9 = 10 - 9 = 1
        assert_eq!(stats.var_width, 1.0);
        assert_eq!(stats.avg_height, 6.0);
    }

    #[test]
    fn median_of_odd_count_picks_middle() {
        let words = vec![
            Word::new(0.0, 0.0, 1.0, 1.0, "a"),
            Word::new(0.0, 0.0, 5.0, 1.0, "b"),
            Word::new(0.0, 0.0, 3.0, 1.0, "c"),
        ];
        let stats = WordStatistics::compute(&words);
        assert_eq!(stats.median_width, 3.0);
    }

    #[test]
    fn median_of_even_count_averages_middle_two() {
        let words = vec![
            Word::new(0.0, 0.0, 1.0, 1.0, "a"),
            Word::new(0.0, 0.0, 2.0, 1.0, "b"),
            Word::new(0.0, 0.0, 3.0, 1.0, "c"),
            Word::new(0.0, 0.0, 4.0, 1.0, "d"),
        ];
        let stats = WordStatistics::compute(&words);
        assert_eq!(stats.median_width, 2.5);
    }

    #[test]
    fn counts_orientations_correctly() {
        let words = vec![
            Word::new(0.0, 0.0, 200.0, 100.0, "ab"),
            Word::new(0.0, 0.0, 100.0, 200.0, "cd"),
            Word::new(0.0, 0.0, 100.0, 100.0, "ef"),
        ];
        let stats = WordStatistics::compute(&words);
        assert_eq!(stats.horizontal_word_count, 1);
        assert_eq!(stats.vertical_word_count, 1);
    }
}

//! Paragraph assembly (component O): turns one XY-cut leaf's words into a
//! single paragraph string, inserting Western word-spacing and paragraph
//! breaks from font-change and indentation heuristics.

use crate::model::{FontSpec, Word};

use super::space::{DocumentSpace, ReadingDirection};

/// Formats a leaf's words into the paragraph text §4.O describes. Assumes
/// `words` came from one XY-cut leaf (so `reading_direction` only needs to
/// succeed for >= 2 words; a single word short-circuits before it's asked).
pub fn extract_words(words: &[Word]) -> String {
    if words.len() == 1 {
        return words[0].t.clone();
    }
    if words.is_empty() {
        return String::new();
    }

    let space = DocumentSpace::new(words.to_vec());
    let direction = space.reading_direction().unwrap_or(ReadingDirection::TopToBottom);

    let total_chars: usize = words.iter().map(|w| w.t.chars().count()).sum();
    if total_chars == 0 {
        return String::new();
    }

    match direction {
        ReadingDirection::LeftToRight => {
            let avg_char_size = words.iter().map(|w| w.w).sum::<f64>() / total_chars as f64;
            let mut segments = space.segment_words_horizontally(0.5);
            for segment in &mut segments {
                segment.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
            }
            let median_first = median(segments.iter().filter_map(|s| s.first().map(|w| w.x)));
            assemble(&segments, avg_char_size, median_first, |w| w.x, |w| w.w)
        }
        ReadingDirection::TopToBottom => {
            let avg_char_size = words.iter().map(|w| w.h).sum::<f64>() / total_chars as f64;
            let mut segments = space.segment_words_vertically(0.5);
            for segment in &mut segments {
                segment.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
            }
            let median_first = median(segments.iter().filter_map(|s| s.first().map(|w| w.y)));
            assemble(&segments, avg_char_size, median_first, |w| w.y, |w| w.h)
        }
    }
}

fn assemble(
    segments: &[Vec<Word>],
    avg_char_size: f64,
    median_first: f64,
    first_coord: impl Fn(&Word) -> f64,
    extent: impl Fn(&Word) -> f64,
) -> String {
    let mut out = String::new();
    let mut prev_font: Option<Option<FontSpec>> = None;

    for segment in segments {
        let paragraph = concat_words(segment);
        if paragraph.is_empty() {
            continue;
        }

        let dominant_font = segment
            .iter()
            .max_by(|a, b| extent(a).partial_cmp(&extent(b)).unwrap())
            .and_then(|w| w.font.clone());

        let first = first_coord(&segment[0]);

        match &prev_font {
            Some(prev) if *prev == dominant_font => {
                if first > median_first + avg_char_size * 0.75 {
                    out.push_str("\n\n");
                } else if out.chars().last().is_some_and(|c| c.is_ascii_alphabetic())
                    && paragraph.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                {
                    out.push(' ');
                }
            }
            _ => out.push('\n'),
        }
        prev_font = Some(dominant_font);
        out.push_str(&paragraph);
    }

    out
}

/// Joins a segment's word texts, inserting a single space between two
/// adjacent ASCII-letter-bounded words; no delimiter otherwise (so CJK
/// runs stay glued together).
fn concat_words(words: &[Word]) -> String {
    let mut out = String::new();
    for word in words {
        if word.t.is_empty() {
            continue;
        }
        if !out.is_empty()
            && out.chars().last().is_some_and(|c| c.is_ascii_alphabetic())
            && word.t.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        {
            out.push(' ');
        }
        out.push_str(&word.t);
    }
    out
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
    fn single_word_leaf_emits_its_text_directly() {
        let words = vec![Word::new(0.0, 0.0, 10.0, 10.0, "solo")];
        assert_eq!(extract_words(&words), "solo");
    }

    #[test]
    fn empty_leaf_emits_empty_string() {
        assert_eq!(extract_words(&[]), "");
    }

    #[test]
    fn adjacent_ascii_words_get_a_space_inserted() {
        let words = vec![Word::new(0.0, 0.0, 10.0, 10.0, "hello"), Word::new(20.0, 0.0, 10.0, 10.0, "world")];
        let text = extract_words(&words);
        assert!(text.contains("hello world"));
    }

    #[test]
    fn first_segment_always_gets_a_leading_newline() {
        let words = vec![Word::new(0.0, 0.0, 10.0, 10.0, "hello"), Word::new(20.0, 0.0, 10.0, 10.0, "world")];
        let text = extract_words(&words);
        assert!(text.starts_with('\n'));
    }

    #[test]
    fn font_change_between_segments_inserts_a_single_newline() {
        let f1 = FontSpec::new(10, "000000");
        let f2 = FontSpec::new(20, "000000");
        let words = vec![
            Word::new(0.0, 0.0, 10.0, 10.0, "aa").with_font(f1.clone()),
            Word::new(0.0, 200.0, 10.0, 10.0, "bb").with_font(f2.clone()),
        ];
        let text = extract_words(&words);
        assert_eq!(text.matches('\n').count(), 2);
    }

    #[test]
    fn indented_segment_gets_a_blank_line() {
        let words = vec![
            Word::new(0.0, 0.0, 10.0, 10.0, "aa"),
            Word::new(0.0, 20.0, 10.0, 10.0, "bb"),
            Word::new(500.0, 40.0, 10.0, 10.0, "cc"),
        ];
        let text = extract_words(&words);
        assert!(text.len() > 0);
    }
}

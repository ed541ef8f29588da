//! Raw-stream reconstruction: merges fragmented word boxes back into the
//! phrases the content stream's linear order implies.

use std::collections::HashMap;

use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::error::{FoliateError, Result};
use crate::geometry::Point;
use crate::model::{Page, Word};

use super::stream::{Match, Stream};

/// Runs the raw-stream reconstructor over `page`'s words against
/// `raw_lines` (one string per content-stream line, in author order).
/// Unconsumed words pass through unchanged; merged streams each produce
/// one new word whose text is the stream text and whose box is the union
/// of its source words (§4.R, tie-break: text = stream text, not
/// concatenation).
pub fn reconstruct(page: &Page, raw_lines: &[String], cancel: &CancellationToken) -> Result<Page> {
    let words = &page.data;
    let mut streams: Vec<Stream> = raw_lines.iter().map(Stream::new).collect();

    // `Match::index` on a stream's side points back at a word by position
    // in `words`, the index-based back-reference this stage uses instead
    // of a Word<->Stream pointer cycle.
    for (word_ix, word) in words.iter().enumerate() {
        for stream in streams.iter_mut() {
            for start in stream.find_all(&word.t) {
                let end = start + word.t.len();
                stream.matches.push(Match { index: word_ix, start, end });
            }
        }
    }

    let centroids: HashMap<usize, Point> = words
        .iter()
        .enumerate()
        .map(|(ix, w)| (ix, Point::new(w.x + w.w / 2.0, w.y + w.h / 2.0)))
        .collect();

    let mut discard_cache: HashMap<String, Option<Vec<Match>>> = HashMap::new();
    let mut merged_stream_ixs: Vec<usize> = Vec::new();
    let mut consumed = vec![false; words.len()];
    let mut output_words: Vec<Word> = Vec::new();

    let mut keep_merging = true;
    while keep_merging {
        cancel.check()?;
        keep_merging = false;

        // Longest stream text tries first.
        let mut order: Vec<usize> = (0..streams.len())
            .filter(|ix| !merged_stream_ixs.contains(ix))
            .collect();
        order.sort_by_key(|&ix| std::cmp::Reverse(streams[ix].text.len()));

        for stream_ix in order {
            if merged_stream_ixs.contains(&stream_ix) {
                continue;
            }

            if !streams[stream_ix].may_merge() {
                streams[stream_ix].discard_outliers(&centroids, &mut discard_cache);
            }

            if streams[stream_ix].may_merge() {
                debug!(stream_ix, text = %streams[stream_ix].text, "merging raw stream");
                let merged = merge_stream(words, &streams[stream_ix]);
                output_words.push(merged);

                let word_ixs: Vec<usize> = streams[stream_ix].matches.iter().map(|m| m.index).collect();
                for &word_ix in &word_ixs {
                    consumed[word_ix] = true;
                }

                // Every other stream drops matches pointing at now-consumed
                // words, which may unlock streams that were ambiguous before.
                for (other_ix, other) in streams.iter_mut().enumerate() {
                    if other_ix == stream_ix {
                        continue;
                    }
                    other.matches.retain(|m| !word_ixs.contains(&m.index));
                }

                merged_stream_ixs.push(stream_ix);
                keep_merging = true;
            }
        }
    }

    for (word_ix, word) in words.iter().enumerate() {
        if !consumed[word_ix] {
            output_words.push(word.clone());
        }
    }

    Ok(Page::new(page.page, page.width, page.height, output_words).with_refreshed_fonts())
}

fn merge_stream(words: &[Word], stream: &Stream) -> Word {
    let mut boxes = stream.matches.iter().map(|m| words[m.index].rectangle());
    let first = boxes.next().expect("may_merge implies at least one match");
    let union = boxes.fold(first, |acc, r| acc.union(&r));
    Word::new(union.x, union.y, union.w, union.h, stream.text.clone())
}

/// Merges a single already-confirmed stream directly; used by callers that
/// have independently verified `may_merge` and want the merged word without
/// running the full reconstruction loop. Mirrors §4.R's "`InvalidState` on
/// merge when `may_merge` is false".
pub fn merge_confirmed_stream(words: &[Word], stream: &Stream) -> Result<Word> {
    if !stream.may_merge() {
        return Err(FoliateError::InvalidState("merge requested but may_merge is false"));
    }
    Ok(merge_stream(words, stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    // S5: words ["2012","MAY."] vs stream "2012 MAY.".
    #[test]
    fn s5_raw_stream_merge_scenario() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 40.0, 10.0, "2012"),
                Word::new(45.0, 0.0, 40.0, 10.0, "MAY."),
            ],
        );
        let cancel = CancellationToken::new();
        let out = reconstruct(&page, &["2012 MAY.".to_string()], &cancel).unwrap();

        assert_eq!(out.data.len(), 1);
        assert_eq!(out.data[0].t, "2012 MAY.");
        assert_eq!(out.data[0].x, 0.0);
        assert_eq!(out.data[0].y, 0.0);
        assert_eq!(out.data[0].w, 85.0);
        assert_eq!(out.data[0].h, 10.0);
    }

    #[test]
    fn unmatched_words_pass_through_unchanged() {
        let page = Page::new(1, 1000.0, 1000.0, vec![Word::new(0.0, 0.0, 10.0, 10.0, "lonely")]);
        let cancel = CancellationToken::new();
        let out = reconstruct(&page, &[], &cancel).unwrap();
        assert_eq!(out.data, page.data);
    }

    // Property 6: raw-stream idempotence.
    #[test]
    fn idempotent_on_a_second_pass() {
        let page = Page::new(
            1,
            1000.0,
            1000.0,
            vec![
                Word::new(0.0, 0.0, 40.0, 10.0, "2012"),
                Word::new(45.0, 0.0, 40.0, 10.0, "MAY."),
            ],
        );
        let cancel = CancellationToken::new();
        let once = reconstruct(&page, &["2012 MAY.".to_string()], &cancel).unwrap();
        let twice = reconstruct(&once, &["2012 MAY.".to_string()], &cancel).unwrap();
        assert_eq!(once.data, twice.data);
    }

    #[test]
    fn cancellation_is_observed() {
        let page = Page::new(1, 10.0, 10.0, vec![Word::new(0.0, 0.0, 1.0, 1.0, "a")]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(reconstruct(&page, &[], &cancel), Err(FoliateError::Cancelled)));
    }

    #[test]
    fn merge_confirmed_stream_rejects_when_not_tiled() {
        let words = vec![Word::new(0.0, 0.0, 1.0, 1.0, "a")];
        let mut stream = Stream::new("ab");
        stream.matches.push(Match { index: 0, start: 0, end: 1 });
        assert!(matches!(
            merge_confirmed_stream(&words, &stream),
            Err(FoliateError::InvalidState(_))
        ));
    }
}

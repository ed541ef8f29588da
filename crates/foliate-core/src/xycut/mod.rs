//! XY-cut segmentation (component X), word statistics (component S), and
//! paragraph assembly (component O).

mod assemble;
mod space;
mod stat;

pub use space::{DocumentSpace, ReadingDirection};
pub use stat::WordStatistics;

use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::model::Word;

/// Builds the XY-cut tree over `words` and walks it depth-first, emitting
/// one paragraph string per leaf in reading order. An empty `words` yields
/// an empty paragraph list without constructing a tree.
pub fn segment_into_paragraphs(words: Vec<Word>, cancel: &CancellationToken) -> Result<Vec<String>> {
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let tree = space::build_tree(words, cancel)?;
    let mut leaves = Vec::new();
    tree.collect_leaves(&mut leaves);

    Ok(leaves.into_iter().map(assemble::extract_words).collect())
}

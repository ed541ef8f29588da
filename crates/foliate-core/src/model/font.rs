//! `FontSpec`: a size + color descriptor with value equality, as referenced
//! by words and collected into a [`Page`](super::page::Page)'s font set.

use serde::{Deserialize, Serialize};

/// A font size (integer points) and an RGB color given as six hex digits,
/// e.g. `"1A2B3C"`. Value equality, hashable, so callers can dedupe a page's
/// font set with a `HashSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: i32,
    pub color: String,
}

impl FontSpec {
    pub fn new(size: i32, color: impl Into<String>) -> Self {
        Self { size, color: color.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn value_equality_ignores_identity() {
        let a = FontSpec::new(12, "000000");
        let b = FontSpec::new(12, "000000");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_color_is_not_equal() {
        let a = FontSpec::new(12, "000000");
        let b = FontSpec::new(12, "FFFFFF");
        assert_ne!(a, b);
    }

    #[test]
    fn hashable_in_a_set() {
        let mut set = HashSet::new();
        set.insert(FontSpec::new(10, "ABCDEF"));
        set.insert(FontSpec::new(10, "ABCDEF"));
        assert_eq!(set.len(), 1);
    }
}

use serde::{Deserialize, Serialize};

/// Zero-based page index inside a document.
///
/// Everything inside the crate works with the zero-based value. Use
/// [`PageNumber::display`] when a page is shown to a person; it is the only
/// place that converts to one-based numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
    pub fn new(zero_based: u32) -> Self {
        Self(zero_based)
    }

    /// Converts a one-based page number (as used by PDF page trees and
    /// people) into a `PageNumber`. Returns `None` for 0.
    pub fn from_one_based(one_based: u32) -> Option<Self> {
        one_based.checked_sub(1).map(Self)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn display(&self) -> u32 {
        self.0 + 1
    }
}

impl std::fmt::Display for PageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        let page = PageNumber::new(0);
        assert_eq!(page.index(), 0);
        assert_eq!(page.display(), 1);
        assert_eq!(page.to_string(), "1");
    }

    #[test]
    fn test_from_one_based() {
        assert_eq!(PageNumber::from_one_based(1), Some(PageNumber::new(0)));
        assert_eq!(PageNumber::from_one_based(12).map(|p| p.index()), Some(11));
        assert_eq!(PageNumber::from_one_based(0), None);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&PageNumber::new(4)).unwrap();
        assert_eq!(json, "4");
    }
}

//! Page identity for the three result-rendering frames.

use serde::{Deserialize, Serialize};

/// Which of the three child frames is currently focused.
///
/// The numeric values are the legacy wire page numbers announced by each
/// frame on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Explanation,
    Visualization,
    Complexity,
}

impl PageKind {
    /// The legacy page number carried on the wire.
    pub fn page_number(&self) -> u8 {
        match self {
            Self::Explanation => 1,
            Self::Visualization => 2,
            Self::Complexity => 3,
        }
    }

    /// Resolves a legacy page number, if it names a known frame.
    pub fn from_page_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Explanation),
            2 => Some(Self::Visualization),
            3 => Some(Self::Complexity),
            _ => None,
        }
    }

    /// All frames, in page-number order.
    pub fn all() -> [PageKind; 3] {
        [Self::Explanation, Self::Visualization, Self::Complexity]
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Explanation => "explanation",
            Self::Visualization => "visualization",
            Self::Complexity => "complexity",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_round_trip() {
        for page in PageKind::all() {
            assert_eq!(PageKind::from_page_number(page.page_number()), Some(page));
        }
        assert_eq!(PageKind::from_page_number(0), None);
        assert_eq!(PageKind::from_page_number(4), None);
    }
}

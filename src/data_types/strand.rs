
use std::cmp::Ordering;
use std::fmt;

/// Strand orientation of a transcript.
/// Ordering places "+" before "-", matching a plain text sort of the symbols.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse
}

impl Strand {
    /// Parses the symbol column of a gene table. Anything other than "+" or "-" is not a strand.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Forward),
            "-" => Some(Self::Reverse),
            _ => None
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }

    /// Orders two items in transcript reading order, given their genomic ordering.
    /// This is the single place where strand decides sort direction.
    pub fn transcript_order<T: Ord>(self, a: &T, b: &T) -> Ordering {
        match self {
            Self::Forward => a.cmp(b),
            Self::Reverse => b.cmp(a)
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Forward));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Reverse));
        assert_eq!(Strand::from_symbol("."), None);
    }

    #[test]
    fn transcript_order() {
        let mut values = vec![3, 1, 2];
        values.sort_by(|a, b| Strand::Forward.transcript_order(a, b));
        assert_eq!(values, vec![1, 2, 3]);
        values.sort_by(|a, b| Strand::Reverse.transcript_order(a, b));
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn display_sorts_like_symbols() {
        assert!(Strand::Forward < Strand::Reverse);
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
    }
}

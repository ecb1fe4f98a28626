
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PhaseError {
    #[error("phase token {token:?} is not of the form <allele><sep><allele>")]
    BadShape { token: String },
    #[error("phase token {token:?} has unknown separator {separator:?}")]
    BadSeparator { token: String, separator: char },
}

/// Phase tokens hold one digit per allele, so larger ALT indices cannot be phased
pub const MAX_PHASE_ALLELE: usize = 9;

/// A child phase decision, e.g. "1|0" (phased) or "0/1" (unphased).
/// When phased, the first allele is the paternal copy and the second is the maternal copy.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PhaseCall {
    first: usize,
    second: usize,
    is_phased: bool
}

impl PhaseCall {
    pub fn new(first: usize, second: usize, is_phased: bool) -> Self {
        Self { first, second, is_phased }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn second(&self) -> usize {
        self.second
    }

    pub fn is_phased(&self) -> bool {
        self.is_phased
    }

    /// Both copies carry the same allele index
    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }

    /// The allele index on each chromatid copy, in order
    pub fn alleles(&self) -> [usize; 2] {
        [self.first, self.second]
    }
}

impl fmt::Display for PhaseCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.is_phased { '|' } else { '/' };
        write!(f, "{}{separator}{}", self.first, self.second)
    }
}

impl FromStr for PhaseCall {
    type Err = PhaseError;

    /// Strict parse, exactly three characters with single-digit alleles.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = token.chars().collect();
        let bad_shape = || PhaseError::BadShape { token: token.to_string() };
        if chars.len() != 3 {
            return Err(bad_shape());
        }

        let first = chars[0].to_digit(10).ok_or_else(bad_shape)? as usize;
        let second = chars[2].to_digit(10).ok_or_else(bad_shape)? as usize;
        let is_phased = match chars[1] {
            '|' => true,
            '/' => false,
            separator => return Err(PhaseError::BadSeparator { token: token.to_string(), separator })
        };
        Ok(Self { first, second, is_phased })
    }
}

/// Which physical chromosome copy a reported variant sits on
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize, strum_macros::AsRefStr)]
pub enum Chromatid {
    #[strum(serialize = "BOTH_CHROM")]
    #[serde(rename = "BOTH_CHROM")]
    Both,
    #[strum(serialize = "FATHER_CHROM")]
    #[serde(rename = "FATHER_CHROM")]
    Father,
    #[strum(serialize = "MOTHER_CHROM")]
    #[serde(rename = "MOTHER_CHROM")]
    Mother,
    #[strum(serialize = "UNKNOWN_CHROM")]
    #[serde(rename = "UNKNOWN_CHROM")]
    Unknown
}

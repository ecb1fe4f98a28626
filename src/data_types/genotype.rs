
use std::fmt;
use std::str::FromStr;

/// The marker written for a missing genotype call
pub const MISSING_GENOTYPE: &str = "./.";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GenotypeError {
    #[error("genotype {value:?} is not of the form allele/allele")]
    BadGenotype { value: String },
    #[error("sample {sample:?} is missing the {field} field")]
    MissingField { sample: String, field: &'static str },
    #[error("sample {sample:?} was not loaded for this record")]
    MissingSample { sample: String },
}

/// A diploid genotype call with the input phasing discarded.
/// Allele indices are kept in the order they were written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Genotype {
    /// "./.", or any call with an unknown allele
    Missing,
    /// Two known allele indices, 0 = reference
    Called(usize, usize)
}

impl Genotype {
    /// Returns true if both alleles are the reference allele
    pub fn is_homozygous_reference(&self) -> bool {
        matches!(self, Genotype::Called(0, 0))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Genotype::Missing)
    }

    /// Largest allele index of the call, `None` if missing
    pub fn max_allele(&self) -> Option<usize> {
        match self {
            Genotype::Missing => None,
            Genotype::Called(a, b) => Some(*a.max(b))
        }
    }

    /// Returns true if this genotype carries the given allele index on either copy.
    /// A missing genotype carries nothing.
    pub fn contains(&self, allele: usize) -> bool {
        match self {
            Genotype::Missing => false,
            Genotype::Called(a, b) => *a == allele || *b == allele
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Genotype::Missing => write!(f, "{MISSING_GENOTYPE}"),
            Genotype::Called(a, b) => write!(f, "{a}/{b}")
        }
    }
}

impl FromStr for Genotype {
    type Err = GenotypeError;

    /// Accepts either separator; anything with a "." allele is missing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GenotypeError::BadGenotype { value: s.to_string() };
        let (a, b) = s.split_once(['/', '|']).ok_or_else(bad)?;
        if a == "." || b == "." {
            return Ok(Genotype::Missing);
        }
        let a: usize = a.parse().map_err(|_| bad())?;
        let b: usize = b.parse().map_err(|_| bad())?;
        Ok(Genotype::Called(a, b))
    }
}

/// The genotype and quality of a single sample at one record.
/// The outer `Option`s distinguish a FORMAT key that is absent from a value that is ".".
#[derive(Clone, Debug, PartialEq)]
pub struct SampleCall {
    /// GT value; `None` if the record has no GT key
    genotype: Option<Genotype>,
    /// GQ value; `None` if the record has no GQ key, `Some(None)` if the value is "."
    quality: Option<Option<f32>>
}

impl SampleCall {
    pub fn new(genotype: Option<Genotype>, quality: Option<Option<f32>>) -> Self {
        Self { genotype, quality }
    }

    /// Convenience constructor for a fully populated call
    pub fn called(genotype: Genotype, quality: f32) -> Self {
        Self::new(Some(genotype), Some(Some(quality)))
    }

    pub fn genotype(&self) -> Option<Genotype> {
        self.genotype
    }

    pub fn quality(&self) -> Option<Option<f32>> {
        self.quality
    }
}

/// The trio genotypes for one record after the quality gate.
/// Parents that are not part of the pedigree are `None`; parents that are present but failed the gate are `Some(Genotype::Missing)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PedigreeGenotype {
    father: Option<Genotype>,
    mother: Option<Genotype>,
    child: Genotype
}

impl PedigreeGenotype {
    pub fn new(father: Option<Genotype>, mother: Option<Genotype>, child: Genotype) -> Self {
        Self { father, mother, child }
    }

    pub fn father(&self) -> Option<Genotype> {
        self.father
    }

    pub fn mother(&self) -> Option<Genotype> {
        self.mother
    }

    pub fn child(&self) -> Genotype {
        self.child
    }

    /// The (father, mother, child) strings handed to a phasing routine; absent parents become the missing marker.
    pub fn as_strings(&self) -> [String; 3] {
        [
            self.father.unwrap_or(Genotype::Missing).to_string(),
            self.mother.unwrap_or(Genotype::Missing).to_string(),
            self.child.to_string()
        ]
    }
}

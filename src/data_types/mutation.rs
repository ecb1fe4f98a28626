
use std::fmt;
use std::str::FromStr;

/// The indel suffix of a frameshift / in-frame mutation class
#[derive(Clone, Debug, Eq, Hash, PartialEq, strum_macros::EnumString)]
pub enum IndelKind {
    Insert,
    Delete,
    /// Equal-length replacement, carries no net displacement
    BlockSubst,
    /// Suffix from another annotator vocabulary, kept verbatim; no net displacement
    #[strum(default)]
    Other(String)
}

impl IndelKind {
    /// Classifies an allele pair by length.
    /// # Arguments
    /// * `reference` - the REF allele
    /// * `alternate` - the ALT allele
    pub fn from_alleles(reference: &str, alternate: &str) -> Self {
        use std::cmp::Ordering;
        match alternate.len().cmp(&reference.len()) {
            Ordering::Greater => IndelKind::Insert,
            Ordering::Less => IndelKind::Delete,
            Ordering::Equal => IndelKind::BlockSubst
        }
    }

    /// Net change in base pairs introduced by this event, assuming an anchored (VCF-style) representation.
    /// # Arguments
    /// * `reference` - the REF allele
    /// * `alternate` - the ALT allele
    pub fn displacement(&self, reference: &str, alternate: &str) -> i64 {
        match self {
            IndelKind::Insert => alternate.len().saturating_sub(1) as i64,
            IndelKind::Delete => -(reference.len().saturating_sub(1) as i64),
            IndelKind::BlockSubst | IndelKind::Other(_) => 0
        }
    }
}

impl fmt::Display for IndelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndelKind::Insert => write!(f, "Insert"),
            IndelKind::Delete => write!(f, "Delete"),
            IndelKind::BlockSubst => write!(f, "BlockSubst"),
            IndelKind::Other(suffix) => write!(f, "{suffix}")
        }
    }
}

/// Functional class of an allele on one transcript.
/// The string names follow the `FrameShiftInsert` / `NonFrameShiftDelete` / `StopGain` vocabulary.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MutationClass {
    StopGain,
    StopLoss,
    StartLoss,
    FrameShift(IndelKind),
    NonFrameShift(IndelKind),
    NonSynonymous,
    Synonymous,
    /// Anything else, kept verbatim
    Other(String)
}

const FRAMESHIFT_PREFIX: &str = "FrameShift";
const NON_FRAMESHIFT_PREFIX: &str = "NonFrameShift";

impl MutationClass {
    /// Returns true for the classes that can open a downstream window
    pub fn is_trigger(&self) -> bool {
        matches!(self, MutationClass::StopGain | MutationClass::FrameShift(_))
    }
}

impl fmt::Display for MutationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationClass::StopGain => write!(f, "StopGain"),
            MutationClass::StopLoss => write!(f, "StopLoss"),
            MutationClass::StartLoss => write!(f, "StartLoss"),
            MutationClass::FrameShift(kind) => write!(f, "{FRAMESHIFT_PREFIX}{kind}"),
            MutationClass::NonFrameShift(kind) => write!(f, "{NON_FRAMESHIFT_PREFIX}{kind}"),
            MutationClass::NonSynonymous => write!(f, "NonSynonymous"),
            MutationClass::Synonymous => write!(f, "Synonymous"),
            MutationClass::Other(value) => write!(f, "{value}")
        }
    }
}

impl FromStr for MutationClass {
    type Err = std::convert::Infallible;

    /// Never fails, unrecognized names become `Other`.
    /// The `FrameShift` / `NonFrameShift` prefix alone decides the class, whatever the suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let class = match s {
            "StopGain" => MutationClass::StopGain,
            "StopLoss" => MutationClass::StopLoss,
            "StartLoss" => MutationClass::StartLoss,
            "NonSynonymous" => MutationClass::NonSynonymous,
            "Synonymous" => MutationClass::Synonymous,
            _ => {
                if let Some(suffix) = s.strip_prefix(NON_FRAMESHIFT_PREFIX) {
                    MutationClass::NonFrameShift(parse_indel_kind(suffix))
                } else if let Some(suffix) = s.strip_prefix(FRAMESHIFT_PREFIX) {
                    MutationClass::FrameShift(parse_indel_kind(suffix))
                } else {
                    MutationClass::Other(s.to_string())
                }
            }
        };
        Ok(class)
    }
}

fn parse_indel_kind(suffix: &str) -> IndelKind {
    suffix.parse().unwrap_or_else(|_| IndelKind::Other(suffix.to_string()))
}

/// Where on a transcript an allele lands
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Region {
    CodingExonic,
    Other
}

/// One transcript-level annotation for an allele
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranscriptAnnotation {
    transcript_id: String,
    region: Region,
    mutation: MutationClass
}

impl TranscriptAnnotation {
    pub fn new(transcript_id: String, region: Region, mutation: MutationClass) -> Self {
        Self { transcript_id, region, mutation }
    }

    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn mutation(&self) -> &MutationClass {
        &self.mutation
    }

    pub fn is_coding_exonic(&self) -> bool {
        self.region == Region::CodingExonic
    }
}

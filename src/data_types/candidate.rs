
use std::collections::BTreeMap;

use crate::data_types::genotype::Genotype;
use crate::data_types::mutation::MutationClass;
use crate::data_types::phase_enums::PhaseCall;
use crate::data_types::strand::Strand;

/// Uniquely identifies one allele call at one site.
/// Field order gives the natural (chromosome, position) ordering of the input file.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CandidateKey {
    chrom: String,
    position: u64,
    ids: String,
    reference: String,
    alternate: String,
    alt_index: usize
}

impl CandidateKey {
    pub fn new(chrom: String, position: u64, ids: String, reference: String, alternate: String, alt_index: usize) -> Self {
        Self { chrom, position, ids, reference, alternate, alt_index }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ids(&self) -> &str {
        &self.ids
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn alt_index(&self) -> usize {
        self.alt_index
    }
}

/// What we know about a candidate allele on one transcript
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CandidateEntry {
    mutation: MutationClass,
    phase: PhaseCall,
    /// `None` if the father is not part of the pedigree
    father: Option<Genotype>,
    /// `None` if the mother is not part of the pedigree
    mother: Option<Genotype>
}

impl CandidateEntry {
    pub fn new(mutation: MutationClass, phase: PhaseCall, father: Option<Genotype>, mother: Option<Genotype>) -> Self {
        Self { mutation, phase, father, mother }
    }

    pub fn mutation(&self) -> &MutationClass {
        &self.mutation
    }

    pub fn phase(&self) -> PhaseCall {
        self.phase
    }

    pub fn father(&self) -> Option<Genotype> {
        self.father
    }

    pub fn mother(&self) -> Option<Genotype> {
        self.mother
    }
}

/// All candidates on one chromatid bucket of one transcript, ordered by genomic position
pub type CandidateSet = BTreeMap<CandidateKey, CandidateEntry>;

/// Gene and transcript, before strand is known
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TranscriptKey {
    gene: String,
    transcript: String
}

impl TranscriptKey {
    pub fn new(gene: String, transcript: String) -> Self {
        Self { gene, transcript }
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Attaches the strand once it has been looked up
    pub fn with_strand(&self, strand: Strand) -> TranscriptGroupKey {
        TranscriptGroupKey {
            gene: self.gene.clone(),
            transcript: self.transcript.clone(),
            strand
        }
    }
}

/// Gene, transcript, and strand; the key of the final report table
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TranscriptGroupKey {
    gene: String,
    transcript: String,
    strand: Strand
}

impl TranscriptGroupKey {
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }
}

/// Distinguishes the variant that opened a window from the ones it affects
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VariantRole {
    Trigger,
    Downstream
}

/// A candidate that survived the window filter
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetainedVariant {
    key: CandidateKey,
    entry: CandidateEntry,
    role: VariantRole
}

impl RetainedVariant {
    pub fn new(key: CandidateKey, entry: CandidateEntry, role: VariantRole) -> Self {
        Self { key, entry, role }
    }

    pub fn key(&self) -> &CandidateKey {
        &self.key
    }

    pub fn entry(&self) -> &CandidateEntry {
        &self.entry
    }

    pub fn role(&self) -> VariantRole {
        self.role
    }

    pub fn is_trigger(&self) -> bool {
        self.role == VariantRole::Trigger
    }
}

/// Retained variants for each reported chromatid group, keyed by transcript and strand
pub type FilteredVariantTable = BTreeMap<TranscriptGroupKey, Vec<Vec<RetainedVariant>>>;


use indexmap::IndexMap;

use crate::data_types::genotype::SampleCall;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("{location}: allele index {index} is out of range for {num_alts} ALT allele(s)")]
    AlleleOutOfRange { location: String, index: usize, num_alts: usize },
}

/// A single parsed VCF record, reduced to the fields we care about.
/// Only the pedigree samples are retained in `samples`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantRecord {
    /// Chromosome name
    chrom: String,
    /// 1-based position, as written in the file
    position: u64,
    /// Contents of the ID column, empty for "."
    ids: Vec<String>,
    /// The REF allele
    reference: String,
    /// The ALT alleles in file order; index 0 here is allele index 1
    alternates: Vec<String>,
    /// FILTER tags, empty for "."
    filters: Vec<String>,
    /// Per-sample calls, keyed by sample name
    samples: IndexMap<String, SampleCall>,
    /// Raw entries of the annotation INFO field
    annotations: Vec<String>
}

impl VariantRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chrom: String, position: u64, ids: Vec<String>,
        reference: String, alternates: Vec<String>, filters: Vec<String>,
        samples: IndexMap<String, SampleCall>, annotations: Vec<String>
    ) -> Self {
        Self {
            chrom, position, ids,
            reference, alternates, filters,
            samples, annotations
        }
    }

    /// Returns true if any FILTER tag is in the accepted set
    pub fn passes_filter<S: AsRef<str>>(&self, accepted: &[S]) -> bool {
        self.filters.iter()
            .any(|f| accepted.iter().any(|a| a.as_ref() == f))
    }

    /// Returns the ALT allele for a 1-based allele index
    /// # Errors
    /// * if the index is 0 (reference) or beyond the ALT list
    pub fn alternate(&self, allele_index: usize) -> Result<&str, RecordError> {
        if allele_index == 0 || allele_index > self.alternates.len() {
            return Err(RecordError::AlleleOutOfRange {
                location: self.location(),
                index: allele_index,
                num_alts: self.alternates.len()
            });
        }
        Ok(&self.alternates[allele_index - 1])
    }

    /// The ID column as written, "." when empty
    pub fn id_string(&self) -> String {
        if self.ids.is_empty() {
            ".".to_string()
        } else {
            self.ids.join(",")
        }
    }

    /// Short label for messages
    pub fn location(&self) -> String {
        format!("{}:{}", self.chrom, self.position)
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn sample(&self, name: &str) -> Option<&SampleCall> {
        self.samples.get(name)
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }
}

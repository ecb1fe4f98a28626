/*!
# Candidate aggregation
Collects coding-exonic alleles carried by the child, grouped by (gene, transcript) and split into chromatid buckets.
Phased calls fill two parallel buckets, one per chromatid copy.
Unphased calls share a single bucket since the copy is unknown.
*/
use indexmap::IndexMap;
use log::trace;

use crate::data_types::candidate::{CandidateEntry, CandidateKey, CandidateSet, TranscriptKey};
use crate::data_types::genotype::PedigreeGenotype;
use crate::data_types::phase_enums::PhaseCall;
use crate::data_types::variants::{RecordError, VariantRecord};
use crate::parsing::annotation::AlleleAnnotations;

/// Chromatid buckets for each transcript, in the order transcripts were first seen
pub type CandidateGroups = IndexMap<TranscriptKey, Vec<CandidateSet>>;

/// Number of chromatid buckets a phased transcript carries
pub const PHASED_BUCKETS: usize = 2;
/// Number of chromatid buckets an unphased transcript carries
pub const UNPHASED_BUCKETS: usize = 1;

/// Accumulates candidates across the full pass over the input
#[derive(Debug, Default)]
pub struct TranscriptCandidateAggregator {
    /// Candidates from phased calls
    phased: CandidateGroups,
    /// Candidates from unphased calls
    unphased: CandidateGroups,
    /// Number of records that contributed at least one candidate
    contributing_records: u64
}

impl TranscriptCandidateAggregator {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds every coding-exonic allele of the child for this record.
    /// Inserting the same key twice overwrites the earlier entry.
    /// # Arguments
    /// * `record` - the source record, already past the FILTER check
    /// * `phase` - the child phase call for this record
    /// * `genotypes` - the gated trio genotypes
    /// * `annotations` - per-allele annotations for this record
    /// # Errors
    /// * if the phase call refers to an allele that the record does not have
    pub fn add_record(
        &mut self,
        record: &VariantRecord,
        phase: PhaseCall,
        genotypes: &PedigreeGenotype,
        annotations: &AlleleAnnotations
    ) -> Result<(), RecordError> {
        let (groups, num_buckets) = if phase.is_phased() {
            (&mut self.phased, PHASED_BUCKETS)
        } else {
            (&mut self.unphased, UNPHASED_BUCKETS)
        };

        let mut added = false;
        for (copy_index, allele) in phase.alleles().into_iter().enumerate() {
            if allele == 0 {
                continue;
            }

            // first gene in sorted order when an allele hits several
            let Some((gene, transcripts)) = annotations.get(&allele)
                .and_then(|genes| genes.iter().next()) else {
                continue;
            };

            let bucket_index = if phase.is_phased() { copy_index } else { 0 };
            for transcript in transcripts.iter().filter(|t| t.is_coding_exonic()) {
                let alternate = record.alternate(allele)?;
                let key = CandidateKey::new(
                    record.chrom().to_string(), record.position(), record.id_string(),
                    record.reference().to_string(), alternate.to_string(), allele
                );
                let entry = CandidateEntry::new(
                    transcript.mutation().clone(), phase, genotypes.father(), genotypes.mother()
                );
                trace!("\t{} {gene}/{} bucket {bucket_index}: {}", record.location(), transcript.transcript_id(), entry.mutation());

                let buckets = groups.entry(TranscriptKey::new(gene.clone(), transcript.transcript_id().to_string()))
                    .or_insert_with(|| vec![CandidateSet::new(); num_buckets]);
                buckets[bucket_index].insert(key, entry);
                added = true;
            }
        }

        if added {
            self.contributing_records += 1;
        }
        Ok(())
    }

    pub fn contributing_records(&self) -> u64 {
        self.contributing_records
    }

    /// Consumes the aggregator, returning the (phased, unphased) collections
    pub fn into_groups(self) -> (CandidateGroups, CandidateGroups) {
        (self.phased, self.unphased)
    }
}

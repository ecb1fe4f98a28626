
use log::trace;
use std::collections::BTreeMap;

use crate::data_types::mutation::{IndelKind, MutationClass, Region, TranscriptAnnotation};
use crate::data_types::variants::VariantRecord;

/// Per-allele annotations: ALT index (1-based) -> gene (sorted) -> transcripts
pub type AlleleAnnotations = BTreeMap<usize, BTreeMap<String, Vec<TranscriptAnnotation>>>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("{location}: annotation entry has {found} field(s), expected at least {expected}: {entry:?}")]
    TooFewFields { location: String, entry: String, found: usize, expected: usize },
}

/// Anything that can pull transcript-level annotations out of a record
pub trait AlleleAnnotator {
    /// # Errors
    /// * if the annotation payload is malformed
    fn annotate(&self, record: &VariantRecord) -> Result<AlleleAnnotations, AnnotationError>;
}

// column layout of the functional annotation (ANN) field
const ANN_ALLELE: usize = 0;
const ANN_CONSEQUENCE: usize = 1;
const ANN_GENE_NAME: usize = 3;
const ANN_FEATURE_ID: usize = 6;
const ANN_MIN_FIELDS: usize = ANN_FEATURE_ID + 1;

/// Consequence terms that land inside the coding sequence of a transcript
const CODING_TERMS: [&str; 18] = [
    "stop_gained",
    "frameshift_variant",
    "inframe_insertion",
    "inframe_deletion",
    "disruptive_inframe_insertion",
    "disruptive_inframe_deletion",
    "conservative_inframe_insertion",
    "conservative_inframe_deletion",
    "missense_variant",
    "synonymous_variant",
    "stop_lost",
    "start_lost",
    "stop_retained_variant",
    "start_retained_variant",
    "initiator_codon_variant",
    "protein_altering_variant",
    "coding_sequence_variant",
    "incomplete_terminal_codon_variant"
];

/// Parser for the pipe-delimited functional annotation field (`ANN`).
/// The record is expected to carry the raw entries of that field in its annotation payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnParser;

impl AnnParser {
    /// Maps a set of consequence terms to a region
    fn region(terms: &[&str]) -> Region {
        if terms.iter().any(|t| CODING_TERMS.contains(t)) {
            Region::CodingExonic
        } else {
            Region::Other
        }
    }

    /// Maps a set of consequence terms to a mutation class, most severe first.
    /// # Arguments
    /// * `terms` - the "&"-separated consequence terms of one entry
    /// * `reference` - REF allele, used to size indels
    /// * `alternate` - ALT allele, used to size indels
    pub fn mutation_class(terms: &[&str], reference: &str, alternate: &str) -> MutationClass {
        let has = |needle: &str| terms.contains(&needle);
        let has_suffix = |suffix: &str| terms.iter().any(|t| t.ends_with(suffix));

        if has("frameshift_variant") {
            MutationClass::FrameShift(IndelKind::from_alleles(reference, alternate))
        } else if has("stop_gained") {
            MutationClass::StopGain
        } else if has_suffix("inframe_insertion") {
            MutationClass::NonFrameShift(IndelKind::Insert)
        } else if has_suffix("inframe_deletion") {
            MutationClass::NonFrameShift(IndelKind::Delete)
        } else if has("stop_lost") {
            MutationClass::StopLoss
        } else if has("start_lost") {
            MutationClass::StartLoss
        } else if has("missense_variant") || has("protein_altering_variant") {
            MutationClass::NonSynonymous
        } else if has("synonymous_variant") || has("stop_retained_variant") || has("start_retained_variant") {
            MutationClass::Synonymous
        } else {
            MutationClass::Other(terms.first().copied().unwrap_or_default().to_string())
        }
    }
}

impl AlleleAnnotator for AnnParser {
    fn annotate(&self, record: &VariantRecord) -> Result<AlleleAnnotations, AnnotationError> {
        let mut ret = AlleleAnnotations::new();
        for entry in record.annotations().iter() {
            let fields: Vec<&str> = entry.split('|').collect();
            if fields.len() < ANN_MIN_FIELDS {
                return Err(AnnotationError::TooFewFields {
                    location: record.location(),
                    entry: entry.clone(),
                    found: fields.len(),
                    expected: ANN_MIN_FIELDS
                });
            }

            // find the ALT this entry belongs to
            let allele = fields[ANN_ALLELE];
            let Some(alt_offset) = record.alternates().iter().position(|a| a == allele) else {
                trace!("\t{}: skipping annotation for unknown allele {allele:?}", record.location());
                continue;
            };
            let alt_index = alt_offset + 1;

            let gene = fields[ANN_GENE_NAME];
            let transcript_id = fields[ANN_FEATURE_ID];
            if gene.is_empty() || transcript_id.is_empty() {
                continue;
            }

            let terms: Vec<&str> = fields[ANN_CONSEQUENCE].split('&').collect();
            let annotation = TranscriptAnnotation::new(
                transcript_id.to_string(),
                Self::region(&terms),
                Self::mutation_class(&terms, record.reference(), allele)
            );
            ret.entry(alt_index).or_default()
                .entry(gene.to_string()).or_default()
                .push(annotation);
        }
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference: &str, alternates: &[&str], annotations: &[&str]) -> VariantRecord {
        VariantRecord::new(
            "chr1".to_string(), 100, vec![],
            reference.to_string(), alternates.iter().map(|a| a.to_string()).collect(),
            vec!["PASS".to_string()], Default::default(),
            annotations.iter().map(|a| a.to_string()).collect()
        )
    }

    #[test]
    fn test_mutation_class() {
        assert_eq!(AnnParser::mutation_class(&["frameshift_variant"], "A", "AT"), MutationClass::FrameShift(IndelKind::Insert));
        assert_eq!(AnnParser::mutation_class(&["frameshift_variant", "stop_gained"], "AT", "A"), MutationClass::FrameShift(IndelKind::Delete));
        assert_eq!(AnnParser::mutation_class(&["stop_gained"], "C", "T"), MutationClass::StopGain);
        assert_eq!(AnnParser::mutation_class(&["disruptive_inframe_deletion"], "ATTT", "A"), MutationClass::NonFrameShift(IndelKind::Delete));
        assert_eq!(AnnParser::mutation_class(&["conservative_inframe_insertion"], "A", "ATTT"), MutationClass::NonFrameShift(IndelKind::Insert));
        assert_eq!(AnnParser::mutation_class(&["missense_variant", "splice_region_variant"], "A", "G"), MutationClass::NonSynonymous);
        assert_eq!(AnnParser::mutation_class(&["synonymous_variant"], "A", "G"), MutationClass::Synonymous);
        assert_eq!(AnnParser::mutation_class(&["intron_variant"], "A", "G"), MutationClass::Other("intron_variant".to_string()));
    }

    #[test]
    fn test_annotate() {
        let record = record("C", &["T", "CA"], &[
            "T|stop_gained|HIGH|GENE1|ENSG1|transcript|NM_001.1|protein_coding|3/10|c.100C>T|p.Q34*|100/2000|100/1500|34/499||",
            "T|intron_variant|MODIFIER|GENE1|ENSG1|transcript|NM_002.1|protein_coding|||||||",
            "CA|frameshift_variant|HIGH|GENE1|ENSG1|transcript|NM_001.1|protein_coding|3/10|c.100dupA|p.X|100/2000|100/1500|34/499||",
            "G|missense_variant|MODERATE|GENE1|ENSG1|transcript|NM_001.1|protein_coding|||||||",
        ]);
        let annotations = AnnParser.annotate(&record).unwrap();
        assert_eq!(annotations.len(), 2);

        let alt1 = &annotations[&1]["GENE1"];
        assert_eq!(alt1.len(), 2);
        assert_eq!(alt1[0].transcript_id(), "NM_001.1");
        assert_eq!(alt1[0].region(), Region::CodingExonic);
        assert_eq!(alt1[0].mutation(), &MutationClass::StopGain);
        assert_eq!(alt1[1].region(), Region::Other);

        let alt2 = &annotations[&2]["GENE1"];
        assert_eq!(alt2[0].mutation(), &MutationClass::FrameShift(IndelKind::Insert));
    }

    #[test]
    fn test_malformed_entry() {
        let record = record("C", &["T"], &["T|stop_gained|HIGH"]);
        assert!(matches!(
            AnnParser.annotate(&record),
            Err(AnnotationError::TooFewFields { found: 3, .. })
        ));
    }
}

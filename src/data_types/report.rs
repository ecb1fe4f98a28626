
use serde::Serialize;

use crate::data_types::candidate::{RetainedVariant, TranscriptGroupKey};
use crate::data_types::genotype::{Genotype, MISSING_GENOTYPE};
use crate::data_types::phase_enums::Chromatid;
use crate::data_types::strand::Strand;

/// Label used in the TYPE column for anything that is not the trigger
pub const DOWNSTREAM_LABEL: &str = "DOWNSTREAM";

/// Which of the two candidate collections a row came from
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum_macros::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportTable {
    Phased,
    Unphased
}

/// One output row; the parent columns are `None` when that parent is not part of the pedigree
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    /// Collection the row was reported from
    pub table: ReportTable,
    pub chrom: String,
    pub position: u64,
    pub ids: String,
    pub reference: String,
    pub alternate: String,
    /// 1-based ALT index
    pub alt_index: usize,
    pub gene: String,
    pub transcript: String,
    pub strand: Strand,
    /// Mutation class name, e.g. "FrameShiftInsert"
    pub mutation: String,
    /// Upper-cased class for the trigger, otherwise "DOWNSTREAM"
    pub row_type: String,
    pub chromatid: Chromatid,
    /// Phase call of the child
    pub child: String,
    pub father: Option<String>,
    pub mother: Option<String>,
    /// Set on the row that opens a chromatid group
    pub is_trigger: bool
}

impl ReportRow {
    /// Builds a row from a retained variant.
    /// # Arguments
    /// * `table` - the source collection
    /// * `group_key` - gene / transcript / strand of the group
    /// * `variant` - the retained variant
    /// * `chromatid` - the attributed chromatid
    /// * `has_father` - true if the father column is emitted
    /// * `has_mother` - true if the mother column is emitted
    pub fn new(
        table: ReportTable, group_key: &TranscriptGroupKey, variant: &RetainedVariant,
        chromatid: Chromatid, has_father: bool, has_mother: bool
    ) -> Self {
        let key = variant.key();
        let entry = variant.entry();
        let mutation = entry.mutation().to_string();
        let row_type = if variant.is_trigger() {
            mutation.to_uppercase()
        } else {
            DOWNSTREAM_LABEL.to_string()
        };
        let parent_column = |present: bool, genotype: Option<Genotype>| -> Option<String> {
            present.then(|| genotype.map(|gt| gt.to_string()).unwrap_or(MISSING_GENOTYPE.to_string()))
        };

        Self {
            table,
            chrom: key.chrom().to_string(),
            position: key.position(),
            ids: key.ids().to_string(),
            reference: key.reference().to_string(),
            alternate: key.alternate().to_string(),
            alt_index: key.alt_index(),
            gene: group_key.gene().to_string(),
            transcript: group_key.transcript().to_string(),
            strand: group_key.strand(),
            mutation,
            row_type,
            chromatid,
            child: entry.phase().to_string(),
            father: parent_column(has_father, entry.father()),
            mother: parent_column(has_mother, entry.mother()),
            is_trigger: variant.is_trigger()
        }
    }
}

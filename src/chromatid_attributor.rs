/*!
# Chromatid attribution
Labels a reported allele with the parental copy it sits on.
*/
use crate::data_types::phase_enums::{Chromatid, PhaseCall};

/// Returns the chromatid label for an allele.
/// # Arguments
/// * `phase` - the child phase call at the variant's site
/// * `allele_index` - the ALT index that was reported
pub fn attribute_chromatid(phase: PhaseCall, allele_index: usize) -> Chromatid {
    if phase.is_homozygous() {
        Chromatid::Both
    } else if phase.is_phased() {
        if allele_index == phase.first() {
            Chromatid::Father
        } else if allele_index == phase.second() {
            Chromatid::Mother
        } else {
            Chromatid::Unknown
        }
    } else {
        Chromatid::Unknown
    }
}

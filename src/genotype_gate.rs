/*!
# Genotype quality gate
Pulls the trio genotypes out of a record, enforcing the genotype quality threshold.
The child decides whether a record is usable at all; each parent independently falls back to a missing call.
*/
use crate::data_types::genotype::{Genotype, GenotypeError, PedigreeGenotype};
use crate::data_types::variants::VariantRecord;

/// Sample names of the trio; the child is required
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pedigree {
    father: Option<String>,
    mother: Option<String>,
    child: String
}

impl Pedigree {
    pub fn new(father: Option<String>, mother: Option<String>, child: String) -> Self {
        Self { father, mother, child }
    }

    pub fn father(&self) -> Option<&str> {
        self.father.as_deref()
    }

    pub fn mother(&self) -> Option<&str> {
        self.mother.as_deref()
    }

    pub fn child(&self) -> &str {
        &self.child
    }

    /// All sample names in the pedigree, child first
    pub fn sample_names(&self) -> Vec<&str> {
        let mut names = vec![self.child.as_str()];
        names.extend(self.father());
        names.extend(self.mother());
        names
    }
}

/// Returns the genotype of a sample if it is called and meets the threshold.
/// `Ok(None)` means the call is missing or unreliable.
/// # Errors
/// * if the sample was not loaded, or lacks the GT field
/// * if the genotype is called but the GQ field is absent
fn gated_genotype(record: &VariantRecord, sample: &str, min_quality: f32) -> Result<Option<Genotype>, GenotypeError> {
    let call = record.sample(sample)
        .ok_or_else(|| GenotypeError::MissingSample { sample: sample.to_string() })?;
    let genotype = call.genotype()
        .ok_or_else(|| GenotypeError::MissingField { sample: sample.to_string(), field: "GT" })?;
    if genotype.is_missing() {
        return Ok(None);
    }

    let quality = call.quality()
        .ok_or_else(|| GenotypeError::MissingField { sample: sample.to_string(), field: "GQ" })?;
    match quality {
        Some(q) if q >= min_quality => Ok(Some(genotype)),
        _ => Ok(None)
    }
}

/// Extracts the pedigree genotypes for a record.
/// Returns `Ok(None)` when the child call is missing, below threshold, or homozygous reference.
/// # Arguments
/// * `record` - the record to check
/// * `pedigree` - the trio sample names
/// * `min_quality` - inclusive lower bound on GQ
/// # Errors
/// * if any inspected sample is malformed, see `gated_genotype`
pub fn check_genotypes(record: &VariantRecord, pedigree: &Pedigree, min_quality: f32) -> Result<Option<PedigreeGenotype>, GenotypeError> {
    let child = match gated_genotype(record, pedigree.child(), min_quality)? {
        Some(gt) if !gt.is_homozygous_reference() => gt,
        _ => return Ok(None)
    };

    let parent = |opt_name: Option<&str>| -> Result<Option<Genotype>, GenotypeError> {
        match opt_name {
            Some(name) => Ok(Some(
                gated_genotype(record, name, min_quality)?.unwrap_or(Genotype::Missing)
            )),
            None => Ok(None)
        }
    };
    let father = parent(pedigree.father())?;
    let mother = parent(pedigree.mother())?;

    Ok(Some(PedigreeGenotype::new(father, mother, child)))
}

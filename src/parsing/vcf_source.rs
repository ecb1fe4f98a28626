
use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use log::{debug, trace};
use noodles::vcf;
use noodles::vcf::variant::record::samples::keys::key as vcf_key;
use noodles::vcf::variant::record_buf::info::field::Value as InfoValue;
use noodles::vcf::variant::record_buf::info::field::value::Array as InfoArray;
use noodles::vcf::variant::record_buf::samples::sample::Value as SampleValue;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::data_types::genotype::{Genotype, SampleCall};
use crate::data_types::variants::VariantRecord;

/// Returns all sample names from a VCF header, in column order.
/// # Arguments
/// * `filename` - path to the .vcf(.gz) file
/// # Errors
/// * if the file or header cannot be read
pub fn load_sample_names(filename: &Path) -> anyhow::Result<Vec<String>> {
    let mut vcf_reader = vcf::io::reader::Builder::default()
        .build_from_path(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let vcf_header = vcf_reader.read_header()
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    Ok(vcf_header.sample_names().iter().cloned().collect())
}

/// Lazy, forward-only reader that turns VCF records into `VariantRecord`s.
/// Only the requested samples and the requested annotation INFO field are retained.
pub struct VcfSource {
    /// Input path, for messages
    filename: PathBuf,
    /// Reader for the VCF, plain or bgzip
    vcf_reader: vcf::io::Reader<Box<dyn BufRead>>,
    /// Parsed header of the VCF
    vcf_header: vcf::Header,
    /// Sample names to extract and their column index in the VCF
    sample_index: Vec<(String, usize)>,
    /// INFO key carrying the per-allele annotation
    annotation_key: String,
    /// Reusable buffer for the raw record
    raw_record: vcf::Record,
    /// Number of records read so far
    records_read: u64
}

impl VcfSource {
    /// Opens a VCF and resolves the sample columns.
    /// # Arguments
    /// * `filename` - path to the .vcf(.gz) file
    /// * `sample_names` - the samples to extract from each record
    /// * `annotation_key` - the INFO key holding per-allele annotations
    /// # Errors
    /// * if the file or header cannot be read
    /// * if any sample is missing from the header
    pub fn new<S: AsRef<str>>(filename: &Path, sample_names: &[S], annotation_key: &str) -> anyhow::Result<Self> {
        let mut vcf_reader = vcf::io::reader::Builder::default()
            .build_from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        let vcf_header = vcf_reader.read_header()
            .with_context(|| format!("Error while reading header of {filename:?}:"))?;

        let sample_index = sample_names.iter()
            .map(|s| {
                let name = s.as_ref();
                let index = vcf_header.sample_names().get_index_of(name)
                    .ok_or(anyhow!("Sample name {name:?} was not found in {filename:?}"))?;
                Ok((name.to_string(), index))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        debug!("Sample columns: {sample_index:?}");

        if !vcf_header.infos().contains_key(annotation_key) {
            debug!("INFO key {annotation_key:?} is not declared in the header of {filename:?}");
        }

        Ok(Self {
            filename: filename.to_path_buf(),
            vcf_reader,
            vcf_header,
            sample_index,
            annotation_key: annotation_key.to_string(),
            raw_record: vcf::Record::default(),
            records_read: 0
        })
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Converts the current raw record
    fn convert_current(&self) -> anyhow::Result<VariantRecord> {
        let record_buf = vcf::variant::RecordBuf::try_from_variant_record(&self.vcf_header, &self.raw_record)?;
        parse_record(&record_buf, &self.sample_index, &self.annotation_key)
    }
}

impl Iterator for VcfSource {
    type Item = anyhow::Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.vcf_reader.read_record(&mut self.raw_record) {
            Ok(0) => None,
            Ok(_) => {
                self.records_read += 1;
                let record_number = self.records_read;
                Some(self.convert_current().with_context(|| {
                    format!("Error while parsing record #{record_number} of {:?}:", self.filename)
                }))
            },
            Err(e) => Some(Err(e).with_context(|| {
                format!("Error while reading {:?} after record #{}:", self.filename, self.records_read)
            }))
        }
    }
}

/// Converts a parsed noodles record into our own record type.
/// # Arguments
/// * `record` - the parsed record
/// * `sample_index` - (name, column index) of each sample to keep
/// * `annotation_key` - INFO key of the annotation payload
fn parse_record(
    record: &vcf::variant::RecordBuf,
    sample_index: &[(String, usize)],
    annotation_key: &str
) -> anyhow::Result<VariantRecord> {
    let chrom = record.reference_sequence_name().to_string();
    let position = record.variant_start().ok_or(anyhow!("Missing POS"))?.get() as u64;
    let location = format!("{chrom}:{position}");

    let ids: Vec<String> = record.ids().as_ref().iter().cloned().collect();
    let reference = record.reference_bases().to_string();
    let alternates: Vec<String> = record.alternate_bases().as_ref().to_vec();
    let filters: Vec<String> = record.filters().as_ref().iter().cloned().collect();

    let all_samples = record.samples();
    let mut samples: IndexMap<String, SampleCall> = Default::default();
    for (name, index) in sample_index.iter() {
        let sample = all_samples.get_index(*index)
            .ok_or(anyhow!("{location}: sample column {index} ({name}) is missing"))?;
        let genotype = match sample.get(vcf_key::GENOTYPE) {
            None => None,
            Some(value) => Some(parse_genotype(value)),
        };
        let quality = match sample.get(vcf_key::CONDITIONAL_GENOTYPE_QUALITY) {
            None => None,
            Some(value) => Some(parse_quality(value)
                .with_context(|| format!("{location}: bad GQ for {name}"))?),
        };
        trace!("\t{location} {name}: GT={genotype:?} GQ={quality:?}");
        samples.insert(name.clone(), SampleCall::new(genotype, quality));
    }

    let annotations = match record.info().get(annotation_key) {
        Some(Some(InfoValue::String(value))) => value.split(',').map(|s| s.to_string()).collect(),
        Some(Some(InfoValue::Array(InfoArray::String(values)))) => values.iter().flatten().cloned().collect(),
        Some(Some(other)) => bail!("{location}: unexpected value type for {annotation_key}: {other:?}"),
        Some(None) | None => vec![]
    };

    Ok(VariantRecord::new(
        chrom, position, ids,
        reference, alternates, filters,
        samples, annotations
    ))
}

/// Converts a GT value into a diploid genotype; anything that is not a diploid call is missing.
/// # Arguments
/// * `value` - the GT value, `None` if written as "."
fn parse_genotype(value: Option<&SampleValue>) -> Genotype {
    if let Some(SampleValue::Genotype(genotype)) = value {
        let alleles = genotype.as_ref();
        if alleles.len() == 2 {
            if let (Some(a), Some(b)) = (alleles[0].position(), alleles[1].position()) {
                return Genotype::Called(a, b);
            }
        }
    }
    Genotype::Missing
}

/// Converts a GQ value, accepting both integer and float declarations.
/// A GQ missing from the header comes through as a string and is parsed here.
/// # Arguments
/// * `value` - the GQ value, `None` if written as "."
/// # Errors
/// * if the value is not numeric
fn parse_quality(value: Option<&SampleValue>) -> anyhow::Result<Option<f32>> {
    match value {
        None => Ok(None),
        Some(SampleValue::Integer(q)) => Ok(Some(*q as f32)),
        Some(SampleValue::Float(q)) => Ok(Some(*q)),
        Some(SampleValue::String(q)) if q == "." => Ok(None),
        Some(SampleValue::String(q)) => {
            let q: f32 = q.parse().with_context(|| format!("expected a number, found {q:?}"))?;
            Ok(Some(q))
        },
        Some(other) => bail!("expected a number, found {other:?}")
    }
}

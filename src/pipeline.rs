/*!
# Pipeline
Runs the full single pass over a trio VCF and returns the downstream variant report.
Each record goes through: FILTER check, genotype gate, phasing, annotation, and candidate aggregation.
Once everything is read, the phased and unphased collections are trigger-filtered and window-walked independently.

## Example usage
```rust
use framewalk::data_types::genotype::{Genotype, SampleCall};
use framewalk::data_types::phase_enums::Chromatid;
use framewalk::data_types::strand::Strand;
use framewalk::data_types::variants::VariantRecord;
use framewalk::genotype_gate::Pedigree;
use framewalk::parsing::annotation::AnnParser;
use framewalk::parsing::strand_table::TranscriptStrands;
use framewalk::phasing::PhaseResolver;
use framewalk::pipeline::{find_downstream_variants, PipelineConfig};

// a child-only stop-gain followed by a missense on the same transcript
let make_record = |position: u64, consequence: &str| {
    let samples = [
        ("dad", Genotype::Called(0, 1)),
        ("mom", Genotype::Called(0, 0)),
        ("kid", Genotype::Called(0, 1)),
    ].into_iter()
        .map(|(name, gt)| (name.to_string(), SampleCall::called(gt, 40.0)))
        .collect();
    VariantRecord::new(
        "chr1".to_string(), position, vec![], "C".to_string(), vec!["T".to_string()],
        vec!["PASS".to_string()], samples,
        vec![format!("T|{consequence}|HIGH|GENE1|ENSG1|transcript|NM_1|protein_coding")]
    )
};
let records: Vec<anyhow::Result<VariantRecord>> = vec![
    Ok(make_record(100, "stop_gained")),
    Ok(make_record(200, "missense_variant")),
];

let pedigree = Pedigree::new(Some("dad".to_string()), Some("mom".to_string()), "kid".to_string());
let strands: TranscriptStrands = [("NM_1".to_string(), Strand::Forward)].into_iter().collect();
let report = find_downstream_variants(
    records, &pedigree, &AnnParser, &PhaseResolver::default(), &strands, &PipelineConfig::default()
).unwrap();

// the trigger row is followed by one downstream row on the paternal chromatid
let rows = report.rows();
assert_eq!(rows.len(), 2);
assert_eq!(rows[0].row_type, "STOPGAIN");
assert_eq!(rows[1].row_type, "DOWNSTREAM");
assert_eq!(rows[1].chromatid, Chromatid::Father);
```
*/
use derive_builder::Builder;
use log::{debug, info, trace};

use crate::candidate_aggregator::TranscriptCandidateAggregator;
use crate::chromatid_attributor::attribute_chromatid;
use crate::data_types::candidate::FilteredVariantTable;
use crate::data_types::genotype::GenotypeError;
use crate::data_types::phase_enums::{PhaseError, MAX_PHASE_ALLELE};
use crate::data_types::report::{ReportRow, ReportTable};
use crate::data_types::variants::{RecordError, VariantRecord};
use crate::genotype_gate::{check_genotypes, Pedigree};
use crate::parsing::annotation::{AlleleAnnotator, AnnotationError};
use crate::parsing::strand_table::StrandLookup;
use crate::phasing::{PhaseResolver, TrioPhaser};
use crate::trigger_filter::{filter_triggers, TriggerRule};
use crate::window_filter::filter_downstream;

/// Default minimum genotype quality
pub const DEFAULT_GENOTYPE_QUALITY: f32 = 30.0;
/// Default set of accepted FILTER tags
pub const DEFAULT_FILTERS: [&str; 2] = ["PASS", "VQSRTrancheSNP99.00to99.90"];

/// Controls which records enter the pipeline
#[derive(Builder, Clone, Debug)]
#[builder(default)]
pub struct PipelineConfig {
    /// Inclusive lower bound on GQ for each trio call
    min_genotype_quality: f32,
    /// A record must carry at least one of these FILTER tags
    accepted_filters: Vec<String>
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_genotype_quality: DEFAULT_GENOTYPE_QUALITY,
            accepted_filters: DEFAULT_FILTERS.iter().map(|f| f.to_string()).collect()
        }
    }
}

impl PipelineConfig {
    // getters
    pub fn min_genotype_quality(&self) -> f32 {
        self.min_genotype_quality
    }

    pub fn accepted_filters(&self) -> &[String] {
        &self.accepted_filters
    }
}

/// Anything that aborts the run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Error while reading variants: {0:#}")]
    Input(anyhow::Error),
    #[error("{location}: {source}")]
    Genotype { location: String, source: GenotypeError },
    #[error("{location}: {source}")]
    Phase { location: String, source: PhaseError },
    #[error(transparent)]
    Annotation(AnnotationError),
    #[error(transparent)]
    Record(RecordError)
}

impl PipelineError {
    /// True if the failure came from the variant source rather than a record's content
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::Input(_))
    }
}

/// Counters collected over one run
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PipelineStats {
    pub records_read: u64,
    pub passed_filter: u64,
    pub passed_gate: u64,
    /// Child carries an ALT index beyond what a phase token can hold
    pub skipped_wide_alleles: u64,
    pub contributing_records: u64,
    pub phased_transcripts: usize,
    pub unphased_transcripts: usize,
    pub phased_triggered: usize,
    pub unphased_triggered: usize,
    pub phased_reported: usize,
    pub unphased_reported: usize
}

/// Result of a run: one table per candidate collection
#[derive(Clone, Debug, Default)]
pub struct Report {
    /// Pedigree used, decides which parent columns are present
    pedigree: Pedigree,
    /// Groups from phased calls
    phased: FilteredVariantTable,
    /// Groups from unphased calls
    unphased: FilteredVariantTable,
    /// Run counters
    stats: PipelineStats
}

impl Report {
    pub fn new(pedigree: Pedigree, phased: FilteredVariantTable, unphased: FilteredVariantTable, stats: PipelineStats) -> Self {
        Self { pedigree, phased, unphased, stats }
    }

    /// Flattens both tables into rows: phased first, groups in (gene, transcript, strand) order
    pub fn rows(&self) -> Vec<ReportRow> {
        let has_father = self.pedigree.father().is_some();
        let has_mother = self.pedigree.mother().is_some();
        [(ReportTable::Phased, &self.phased), (ReportTable::Unphased, &self.unphased)].into_iter()
            .flat_map(|(table, variant_table)| {
                variant_table.iter().flat_map(move |(group_key, retained_sets)| {
                    retained_sets.iter().flatten().map(move |variant| {
                        let chromatid = attribute_chromatid(variant.entry().phase(), variant.key().alt_index());
                        ReportRow::new(table, group_key, variant, chromatid, has_father, has_mother)
                    })
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.phased.is_empty() && self.unphased.is_empty()
    }

    // getters
    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    pub fn phased(&self) -> &FilteredVariantTable {
        &self.phased
    }

    pub fn unphased(&self) -> &FilteredVariantTable {
        &self.unphased
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}

/// Runs every stage over the given records.
/// # Arguments
/// * `records` - lazy record source, read exactly once
/// * `pedigree` - trio sample names
/// * `annotator` - per-allele annotation source
/// * `resolver` - phasing wrapper
/// * `strands` - transcript strand source
/// * `config` - GQ threshold and accepted FILTER tags
/// # Errors
/// * if the source fails, or any record is malformed; nothing is reported in that case
pub fn find_downstream_variants<I, A, P, S>(
    records: I,
    pedigree: &Pedigree,
    annotator: &A,
    resolver: &PhaseResolver<P>,
    strands: &S,
    config: &PipelineConfig
) -> Result<Report, PipelineError>
where
    I: IntoIterator<Item = anyhow::Result<VariantRecord>>,
    A: AlleleAnnotator + ?Sized,
    P: TrioPhaser,
    S: StrandLookup + ?Sized
{
    let mut stats = PipelineStats::default();
    let mut aggregator = TranscriptCandidateAggregator::new();

    for result in records {
        let record = result.map_err(PipelineError::Input)?;
        stats.records_read += 1;

        if !record.passes_filter(config.accepted_filters()) {
            trace!("\t{}: FILTER {:?} not accepted", record.location(), record.filters());
            continue;
        }
        stats.passed_filter += 1;

        let opt_genotypes = check_genotypes(&record, pedigree, config.min_genotype_quality())
            .map_err(|source| PipelineError::Genotype { location: record.location(), source })?;
        let Some(genotypes) = opt_genotypes else {
            trace!("\t{}: child call missing, low quality, or reference", record.location());
            continue;
        };
        stats.passed_gate += 1;

        if genotypes.child().max_allele().is_some_and(|a| a > MAX_PHASE_ALLELE) {
            debug!("{}: child allele index beyond {MAX_PHASE_ALLELE}, skipping", record.location());
            stats.skipped_wide_alleles += 1;
            continue;
        }

        let phase = resolver.resolve(&genotypes)
            .map_err(|source| PipelineError::Phase { location: record.location(), source })?;
        let annotations = annotator.annotate(&record)
            .map_err(PipelineError::Annotation)?;
        aggregator.add_record(&record, phase, &genotypes, &annotations)
            .map_err(PipelineError::Record)?;
    }

    stats.contributing_records = aggregator.contributing_records();
    info!("Records read: {}", stats.records_read);
    info!("\tPassing FILTER: {}", stats.passed_filter);
    info!("\tPassing genotype gate: {}", stats.passed_gate);
    if stats.skipped_wide_alleles > 0 {
        info!("\tSkipped for ALT index > {MAX_PHASE_ALLELE}: {}", stats.skipped_wide_alleles);
    }
    info!("\tWith coding candidates: {}", stats.contributing_records);

    let (phased, unphased) = aggregator.into_groups();
    stats.phased_transcripts = phased.len();
    stats.unphased_transcripts = unphased.len();
    info!("Candidate transcripts: {} phased, {} unphased", stats.phased_transcripts, stats.unphased_transcripts);

    let phased = filter_triggers(phased, TriggerRule::Phased);
    let unphased = filter_triggers(unphased, TriggerRule::UnphasedHomozygous);
    stats.phased_triggered = phased.len();
    stats.unphased_triggered = unphased.len();
    info!("Triggered transcripts: {} phased, {} unphased", stats.phased_triggered, stats.unphased_triggered);

    debug!("Walking phased windows...");
    let phased = filter_downstream(&phased, strands);
    debug!("Walking unphased windows...");
    let unphased = filter_downstream(&unphased, strands);
    stats.phased_reported = phased.len();
    stats.unphased_reported = unphased.len();
    info!("Reported transcripts: {} phased, {} unphased", stats.phased_reported, stats.unphased_reported);

    Ok(Report::new(pedigree.clone(), phased, unphased, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::genotype::{Genotype, SampleCall};
    use crate::data_types::phase_enums::Chromatid;
    use crate::data_types::strand::Strand;
    use crate::parsing::annotation::AnnParser;
    use crate::parsing::strand_table::TranscriptStrands;
    use indexmap::IndexMap;

    /// (sample, genotype, GQ)
    type Call<'a> = (&'a str, &'a str, f32);

    fn record(position: u64, reference: &str, alternate: &str, consequence: &str, filter: &str, calls: &[Call]) -> VariantRecord {
        let samples: IndexMap<String, SampleCall> = calls.iter()
            .map(|(name, gt, gq)| (name.to_string(), SampleCall::called(gt.parse().unwrap(), *gq)))
            .collect();
        VariantRecord::new(
            "chr1".to_string(), position, vec![format!("rs{position}")],
            reference.to_string(), vec![alternate.to_string()], vec![filter.to_string()],
            samples,
            vec![format!("{alternate}|{consequence}|HIGH|GENE1|ENSG1|transcript|NM_1.2|protein_coding")]
        )
    }

    fn trio(child: &str, child_gq: f32) -> Vec<Call<'_>> {
        vec![("dad", "0/1", 50.0), ("mom", "0/0", 50.0), ("kid", child, child_gq)]
    }

    fn run(records: Vec<VariantRecord>, pedigree: &Pedigree, strand: Strand) -> Result<Report, PipelineError> {
        let strands: TranscriptStrands = [("NM_1".to_string(), strand)].into_iter().collect();
        find_downstream_variants(
            records.into_iter().map(anyhow::Ok), pedigree, &AnnParser,
            &PhaseResolver::default(), &strands, &PipelineConfig::default()
        )
    }

    fn full_pedigree() -> Pedigree {
        Pedigree::new(Some("dad".to_string()), Some("mom".to_string()), "kid".to_string())
    }

    #[test]
    fn test_stop_gain_with_downstream() {
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &trio("0/1", 40.0)),
            record(200, "A", "G", "missense_variant", "PASS", &trio("0/1", 40.0)),
        ];
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        let rows = report.rows();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].position, 100);
        assert_eq!(rows[0].row_type, "STOPGAIN");
        assert_eq!(rows[0].child, "1|0");
        assert_eq!(rows[0].chromatid, Chromatid::Father);
        assert_eq!(rows[0].table, ReportTable::Phased);

        assert_eq!(rows[1].position, 200);
        assert_eq!(rows[1].row_type, "DOWNSTREAM");
        assert_eq!(rows[1].mutation, "NonSynonymous");
        assert_eq!(rows[1].chromatid, Chromatid::Father);
        assert_eq!(rows[1].father.as_deref(), Some("0/1"));
        assert_eq!(rows[1].mother.as_deref(), Some("0/0"));
        assert_eq!(rows[1].transcript, "NM_1.2");

        let stats = report.stats();
        assert_eq!(stats.records_read, 2);
        assert_eq!(stats.passed_gate, 2);
        assert_eq!(stats.phased_reported, 1);
        assert_eq!(stats.unphased_reported, 0);
    }

    #[test]
    fn test_lone_trigger() {
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &trio("0/1", 40.0)),
        ];
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        assert!(report.is_empty());
        assert!(report.rows().is_empty());
    }

    #[test]
    fn test_low_quality_child() {
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &trio("0/1", 20.0)),
            record(200, "A", "G", "missense_variant", "PASS", &trio("0/1", 20.0)),
        ];
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        assert!(report.rows().is_empty());
        assert_eq!(report.stats().passed_gate, 0);
    }

    #[test]
    fn test_filtered_record() {
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &trio("0/1", 40.0)),
            record(200, "A", "G", "missense_variant", "LowQual", &trio("0/1", 40.0)),
        ];
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        assert!(report.rows().is_empty());
        assert_eq!(report.stats().passed_filter, 1);
    }

    #[test]
    fn test_reverse_strand() {
        // on the reverse strand, the window runs toward smaller positions
        let records = vec![
            record(100, "A", "G", "missense_variant", "PASS", &trio("0/1", 40.0)),
            record(200, "C", "T", "stop_gained", "PASS", &trio("0/1", 40.0)),
        ];
        let report = run(records.clone(), &full_pedigree(), Strand::Reverse).unwrap();
        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 200);
        assert_eq!(rows[1].position, 100);
        assert_eq!(rows[1].row_type, "DOWNSTREAM");

        // same records on the forward strand leave nothing after the trigger
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        assert!(report.rows().is_empty());
    }

    #[test]
    fn test_unphased_homozygous_trigger() {
        // no parents, so nothing can be phased
        let pedigree = Pedigree::new(None, None, "kid".to_string());
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &[("kid", "1/1", 40.0)]),
            record(200, "A", "G", "synonymous_variant", "PASS", &[("kid", "0/1", 40.0)]),
        ];
        let report = run(records, &pedigree, Strand::Forward).unwrap();
        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.table == ReportTable::Unphased));
        assert_eq!(rows[0].chromatid, Chromatid::Both);
        assert_eq!(rows[1].chromatid, Chromatid::Unknown);
        assert_eq!(rows[1].father, None);
        assert_eq!(rows[1].mother, None);
    }

    #[test]
    fn test_unphased_het_trigger_dropped() {
        let pedigree = Pedigree::new(None, None, "kid".to_string());
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &[("kid", "0/1", 40.0)]),
            record(200, "A", "G", "synonymous_variant", "PASS", &[("kid", "0/1", 40.0)]),
        ];
        let report = run(records, &pedigree, Strand::Forward).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.stats().unphased_transcripts, 1);
        assert_eq!(report.stats().unphased_triggered, 0);
    }

    #[test]
    fn test_frameshift_closed_by_compensating_deletion() {
        let records = vec![
            record(100, "A", "AT", "frameshift_variant", "PASS", &trio("0/1", 40.0)),
            record(150, "C", "G", "missense_variant", "PASS", &trio("0/1", 40.0)),
            record(200, "GT", "G", "frameshift_variant", "PASS", &trio("0/1", 40.0)),
            record(300, "A", "G", "missense_variant", "PASS", &trio("0/1", 40.0)),
        ];
        let report = run(records, &full_pedigree(), Strand::Forward).unwrap();
        let positions: Vec<u64> = report.rows().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![100, 150, 200]);
    }

    #[test]
    fn test_wide_allele_index_skipped() {
        let pedigree = Pedigree::new(None, None, "kid".to_string());
        let records = vec![
            record(100, "C", "T", "stop_gained", "PASS", &[("kid", "10/10", 40.0)]),
            record(200, "A", "G", "synonymous_variant", "PASS", &[("kid", "0/12", 40.0)]),
        ];
        let report = run(records, &pedigree, Strand::Forward).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.stats().passed_gate, 2);
        assert_eq!(report.stats().skipped_wide_alleles, 2);
    }

    #[test]
    fn test_missing_gq_is_fatal() {
        let mut samples: IndexMap<String, SampleCall> = IndexMap::new();
        samples.insert("kid".to_string(), SampleCall::new(Some(Genotype::Called(0, 1)), None));
        let bad = VariantRecord::new(
            "chr1".to_string(), 100, vec![], "C".to_string(), vec!["T".to_string()],
            vec!["PASS".to_string()], samples, vec![]
        );
        let pedigree = Pedigree::new(None, None, "kid".to_string());
        let result = run(vec![bad], &pedigree, Strand::Forward);
        match result {
            Err(e) => {
                assert!(!e.is_input_error());
                assert!(e.to_string().starts_with("chr1:100"));
            },
            Ok(_) => panic!("expected a genotype error")
        }
    }

    /// Runs a small trio VCF through the reader, the pipeline and the TSV writer
    fn run_vcf(label: &str, child_gq: u32) -> String {
        use crate::parsing::vcf_source::VcfSource;
        use crate::writers::report::ReportWriter;

        let ann = |alt: &str, consequence: &str| format!("ANN={alt}|{consequence}|HIGH|GENE1|ENSG1|transcript|NM_1.2|protein_coding");
        let vcf = format!("##fileformat=VCFv4.2
##FILTER=<ID=PASS,Description=\"All filters passed\">
##INFO=<ID=ANN,Number=.,Type=String,Description=\"Functional annotations\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=GQ,Number=1,Type=Integer,Description=\"Genotype quality\">
##contig=<ID=chr1,length=10000>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tdad\tmom\tkid
chr1\t100\trs100\tC\tT\t50\tPASS\t{}\tGT:GQ\t0/1:50\t0/0:50\t0/1:{child_gq}
chr1\t200\trs200\tA\tG\t50\tPASS\t{}\tGT:GQ\t0/1:50\t0/0:50\t0/1:{child_gq}
", ann("T", "stop_gained"), ann("G", "missense_variant"));
        let filename = std::env::temp_dir().join(format!("framewalk_pipeline_{label}_{}.vcf", std::process::id()));
        std::fs::write(&filename, vcf).unwrap();

        let pedigree = full_pedigree();
        let source = VcfSource::new(&filename, &pedigree.sample_names(), "ANN").unwrap();
        let strands: TranscriptStrands = [("NM_1".to_string(), Strand::Forward)].into_iter().collect();
        let report = find_downstream_variants(
            source, &pedigree, &AnnParser, &PhaseResolver::default(), &strands, &PipelineConfig::default()
        ).unwrap();

        let mut writer = ReportWriter::new(vec![]);
        writer.write_report(&filename, &report).unwrap();
        std::fs::remove_file(&filename).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_vcf_to_report() {
        let output = run_vcf("pass", 40);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("## VCF file used"));
        assert_eq!(lines[1], "## Pedigree used dad,mom,kid");
        assert!(lines[3].ends_with("CHILD-kid\tFATHER-dad\tMOTHER-mom"));
        assert_eq!(lines[4], "");

        let trigger: Vec<&str> = lines[5].split('\t').collect();
        assert_eq!(&trigger[..2], &["chr1", "100"]);
        assert_eq!(trigger[10], "STOPGAIN");
        assert_eq!(trigger[11], "FATHER_CHROM");
        assert_eq!(&trigger[12..], &["1|0", "0/1", "0/0"]);

        let downstream: Vec<&str> = lines[6].split('\t').collect();
        assert_eq!(&downstream[..2], &["chr1", "200"]);
        assert_eq!(downstream[8], "+");
        assert_eq!(downstream[10], "DOWNSTREAM");
        assert_eq!(downstream[11], "FATHER_CHROM");
    }

    #[test]
    fn test_vcf_low_quality_header_only() {
        let output = run_vcf("lowgq", 20);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.starts_with('#')));
    }

    #[test]
    fn test_source_error() {
        let records: Vec<anyhow::Result<VariantRecord>> = vec![Err(anyhow::anyhow!("truncated file"))];
        let strands: TranscriptStrands = Default::default();
        let result = find_downstream_variants(
            records, &full_pedigree(), &AnnParser, &PhaseResolver::default(), &strands, &PipelineConfig::default()
        );
        assert!(matches!(result, Err(PipelineError::Input(_))));
    }
}

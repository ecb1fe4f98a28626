
use anyhow::{bail, ensure};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::genotype_gate::Pedigree;
use crate::parsing::vcf_source::load_sample_names;
use crate::pipeline::{PipelineConfig, PipelineConfigBuilder};

/// Framewalk, lists the coding variants that sit downstream of a frameshift or stop-gain on the same chromatid of a child.
#[derive(Parser, Clone, Debug, Default)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
pub struct FrameWalkSettings {
    #[clap(skip)]
    framewalk_version: String,

    /// Annotated trio variant call file (VCF)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_vcf: PathBuf,

    /// Transcript strand table (refGene / genePred)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "refgene")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub refgene: PathBuf,

    /// Optional JSON dump of the report rows (gzip if ending in .gz)
    #[clap(long = "output-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_json: Option<PathBuf>,

    /// Sample name of the child
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "child")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Pedigree"))]
    pub child: String,

    /// Sample name of the father
    #[clap(short = 'f')]
    #[clap(long = "father")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Pedigree"))]
    pub father: Option<String>,

    /// Sample name of the mother
    #[clap(short = 'm')]
    #[clap(long = "mother")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Pedigree"))]
    pub mother: Option<String>,

    /// Minimum genotype quality (GQ) for a call to be used
    #[clap(long = "genotype_quality")]
    #[clap(alias = "genotype-quality")]
    #[clap(value_name = "GQ")]
    #[clap(default_value = "30")]
    #[clap(help_heading = Some("Filtering"))]
    pub genotype_quality: f32,

    /// Accepted FILTER tags, repeat or comma separate
    #[clap(long = "filter")]
    #[clap(value_name = "TAG")]
    #[clap(value_delimiter = ',')]
    #[clap(default_values = ["PASS", "VQSRTrancheSNP99.00to99.90"])]
    #[clap(help_heading = Some("Filtering"))]
    pub filters: Vec<String>,

    /// INFO key holding the per-allele functional annotation
    #[clap(long = "annotation-key")]
    #[clap(value_name = "KEY")]
    #[clap(default_value = "ANN")]
    #[clap(help_heading = Some("Filtering"))]
    pub annotation_key: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl FrameWalkSettings {
    /// The trio described by the sample options
    pub fn pedigree(&self) -> Pedigree {
        Pedigree::new(self.father.clone(), self.mother.clone(), self.child.clone())
    }

    /// The record-level knobs of the pipeline
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let config = PipelineConfigBuilder::default()
            .min_genotype_quality(self.genotype_quality)
            .accepted_filters(self.filters.clone())
            .build()?;
        Ok(config)
    }

    pub fn framewalk_version(&self) -> &str {
        &self.framewalk_version
    }
}

/// Validates the settings, logging them along the way.
/// # Errors
/// * if an input file is missing, or a sample is absent from the VCF header
/// * if the pedigree repeats a sample
/// * if the GQ threshold is negative or not a number
/// * if no FILTER tag is accepted
pub fn check_settings(mut settings: FrameWalkSettings) -> anyhow::Result<FrameWalkSettings> {
    // hard code the version in
    settings.framewalk_version = FULL_VERSION.clone();
    info!("Framewalk version: {:?}", &settings.framewalk_version);
    info!("Inputs:");

    check_required_filename(&settings.input_vcf, "Input VCF")?;
    info!("\tInput VCF: {:?}", &settings.input_vcf);
    check_required_filename(&settings.refgene, "Transcript strand table")?;
    info!("\tStrand table: {:?}", &settings.refgene);

    // pedigree checks
    let vcf_samples = load_sample_names(&settings.input_vcf)?;
    let pedigree = settings.pedigree();
    for sample in pedigree.sample_names() {
        if !vcf_samples.iter().any(|s| s == sample) {
            bail!("Sample {sample:?} was not found in {:?}", settings.input_vcf);
        }
    }
    for parent in [pedigree.father(), pedigree.mother()].into_iter().flatten() {
        ensure!(parent != pedigree.child(), "Child sample {:?} is also listed as a parent", pedigree.child());
    }
    if let (Some(father), Some(mother)) = (pedigree.father(), pedigree.mother()) {
        ensure!(father != mother, "Father and mother cannot be the same sample: {father:?}");
    }
    info!("\tChild: {:?}", pedigree.child());
    info!("\tFather: {:?}", pedigree.father());
    info!("\tMother: {:?}", pedigree.mother());

    // filtering checks
    info!("Filtering:");
    ensure!(
        settings.genotype_quality.is_finite() && settings.genotype_quality >= 0.0,
        "--genotype_quality must be a non-negative number, found {}", settings.genotype_quality
    );
    info!("\tMinimum GQ: {}", settings.genotype_quality);

    settings.filters.retain(|f| !f.is_empty());
    ensure!(!settings.filters.is_empty(), "At least one --filter tag is required");
    info!("\tAccepted FILTER tags: {:?}", settings.filters);
    info!("\tAnnotation key: {:?}", settings.annotation_key);

    if let Some(json_fn) = settings.output_json.as_deref() {
        info!("Outputs:");
        info!("\tJSON rows: {json_fn:?}");
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let settings = FrameWalkSettings::try_parse_from([
            "framewalk", "-i", "trio.vcf.gz", "-r", "refGene.txt.gz", "-c", "kid", "-f", "dad"
        ]).unwrap();
        assert_eq!(settings.genotype_quality, 30.0);
        assert_eq!(settings.filters, vec!["PASS".to_string(), "VQSRTrancheSNP99.00to99.90".to_string()]);
        assert_eq!(settings.annotation_key, "ANN");
        assert_eq!(settings.pedigree(), Pedigree::new(Some("dad".to_string()), None, "kid".to_string()));

        let config = settings.pipeline_config().unwrap();
        assert_eq!(config.min_genotype_quality(), 30.0);
        assert_eq!(config.accepted_filters().len(), 2);
    }

    #[test]
    fn test_cli_overrides() {
        let settings = FrameWalkSettings::try_parse_from([
            "framewalk", "-i", "trio.vcf", "-r", "genes.txt", "-c", "kid",
            "--genotype-quality", "20.5", "--filter", "PASS,LowQual", "--filter", "Other"
        ]).unwrap();
        assert_eq!(settings.genotype_quality, 20.5);
        assert_eq!(settings.filters, vec!["PASS".to_string(), "LowQual".to_string(), "Other".to_string()]);
    }

    #[test]
    fn test_missing_input() {
        let settings = FrameWalkSettings::try_parse_from([
            "framewalk", "-i", "/nonexistent/trio.vcf", "-r", "/nonexistent/genes.txt", "-c", "kid"
        ]).unwrap();
        assert!(check_settings(settings).is_err());
    }
}


use indicatif::{ProgressBar, ProgressIterator};
use log::{LevelFilter, error, info};
use std::io::BufWriter;
use std::time::Instant;

use framewalk::cli::core::get_cli;
use framewalk::cli::settings::check_settings;
use framewalk::parsing::annotation::AnnParser;
use framewalk::parsing::strand_table::TranscriptStrands;
use framewalk::parsing::vcf_source::VcfSource;
use framewalk::phasing::PhaseResolver;
use framewalk::pipeline::find_downstream_variants;
use framewalk::util::json_io::save_json;
use framewalk::util::progress_bar::get_spinner_style;
use framewalk::writers::report::ReportWriter;

fn main() {
    // start the timer
    let start_time = Instant::now();
    let settings = get_cli();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let pipeline_config = match settings.pipeline_config() {
        Ok(pc) => pc,
        Err(e) => {
            error!("Error while building pipeline config: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    // load the strand table
    info!("Loading transcript strands from {:?}...", settings.refgene);
    let strands = match TranscriptStrands::from_gene_table(&settings.refgene) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading transcript strands: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // open the variant source
    let pedigree = settings.pedigree();
    let vcf_source = match VcfSource::new(&settings.input_vcf, &pedigree.sample_names(), &settings.annotation_key) {
        Ok(vs) => vs,
        Err(e) => {
            error!("Error while opening input VCF: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Scanning variants...");
    let spinner = ProgressBar::new_spinner().with_style(get_spinner_style());
    let report = match find_downstream_variants(
        vcf_source.progress_with(spinner.clone()),
        &pedigree,
        &AnnParser,
        &PhaseResolver::default(),
        &strands,
        &pipeline_config
    ) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while scanning variants: {e:#}");
            if e.is_input_error() {
                std::process::exit(exitcode::IOERR);
            } else {
                std::process::exit(exitcode::DATAERR);
            }
        }
    };
    spinner.finish_and_clear();

    // report goes to stdout, logging stays on stderr
    let stdout = std::io::stdout();
    let mut report_writer = ReportWriter::new(BufWriter::new(stdout.lock()));
    if let Err(e) = report_writer.write_report(&settings.input_vcf, &report) {
        error!("Error while writing report: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some(json_fn) = settings.output_json.as_deref() {
        info!("Saving report rows to {json_fn:?}...");
        if let Err(e) = save_json(&report.rows(), json_fn) {
            error!("Error while saving report rows: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Scan completed in {} seconds.", start_time.elapsed().as_secs_f64());
    info!("Process finished successfully.");
}

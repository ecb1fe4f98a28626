
use anyhow::{anyhow, Context};
use log::{debug, info};
use rustc_hash::FxHashMap as HashMap;
use std::collections::HashMap as StdHashMap;
use std::fs::File;
use std::hash::BuildHasher;
use std::path::Path;

use crate::data_types::strand::Strand;

/// Anything that can report the strand of a transcript
pub trait StrandLookup {
    /// Returns the strand, or `None` if the transcript is unknown
    fn strand(&self, transcript_id: &str) -> Option<Strand>;
}

impl<S: BuildHasher> StrandLookup for StdHashMap<String, Strand, S> {
    fn strand(&self, transcript_id: &str) -> Option<Strand> {
        self.get(transcript_id).copied()
    }
}

/// Removes a trailing ".<version>" from a transcript accession, if present
fn strip_version(transcript_id: &str) -> &str {
    match transcript_id.rsplit_once('.') {
        Some((accession, version)) if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) => accession,
        _ => transcript_id
    }
}

/// Transcript strands loaded from a UCSC refGene / genePred table
#[derive(Clone, Debug, Default)]
pub struct TranscriptStrands {
    /// Exact transcript name to strand
    strands: HashMap<String, Strand>
}

impl TranscriptStrands {
    /// Loads a refGene or genePred table, optionally gzip compressed.
    /// A leading integer column is treated as the refGene `bin` column.
    /// # Arguments
    /// * `filename` - path to the table
    /// # Errors
    /// * if the file cannot be opened or a row is too short
    pub fn from_gene_table(filename: &Path) -> anyhow::Result<Self> {
        let file = File::open(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        let reader: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
            Box::new(flate2::read::MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut strands: HashMap<String, Strand> = Default::default();
        let mut conflicts: usize = 0;
        for result in csv_reader.records() {
            let row = result.with_context(|| format!("Error while reading {filename:?}"))?;

            // refGene has a leading bin column, genePred does not
            let first = row.get(0).ok_or(anyhow!("Empty row in {filename:?}"))?;
            let offset = if first.parse::<u64>().is_ok() { 1 } else { 0 };
            let name = row.get(offset)
                .ok_or(anyhow!("Missing transcript name on row: {row:?}"))?;
            let symbol = row.get(offset + 2)
                .ok_or(anyhow!("Missing strand on row: {row:?}"))?;
            let Some(strand) = Strand::from_symbol(symbol) else {
                debug!("Ignoring {name} with unknown strand {symbol:?}");
                continue;
            };

            match strands.get(name) {
                Some(&existing) if existing != strand => {
                    debug!("Conflicting strand for {name}, keeping {existing}");
                    conflicts += 1;
                },
                Some(_) => {},
                None => {
                    strands.insert(name.to_string(), strand);
                }
            }
        }

        info!("Loaded strands for {} transcripts ({conflicts} conflicting duplicates).", strands.len());
        Ok(Self { strands })
    }

    pub fn len(&self) -> usize {
        self.strands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strands.is_empty()
    }
}

impl StrandLookup for TranscriptStrands {
    /// Exact match first, then the unversioned accession
    fn strand(&self, transcript_id: &str) -> Option<Strand> {
        self.strands.get(transcript_id)
            .or_else(|| self.strands.get(strip_version(transcript_id)))
            .copied()
    }
}

impl FromIterator<(String, Strand)> for TranscriptStrands {
    fn from_iter<T: IntoIterator<Item = (String, Strand)>>(iter: T) -> Self {
        Self { strands: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("NM_000059.4"), "NM_000059");
        assert_eq!(strip_version("NM_000059"), "NM_000059");
        assert_eq!(strip_version("ENST1.alt"), "ENST1.alt");
    }

    #[test]
    fn test_lookup() {
        let strands: TranscriptStrands = [
            ("NM_1".to_string(), Strand::Forward),
            ("NM_2.3".to_string(), Strand::Reverse),
        ].into_iter().collect();
        assert_eq!(strands.strand("NM_1"), Some(Strand::Forward));
        assert_eq!(strands.strand("NM_1.7"), Some(Strand::Forward));
        assert_eq!(strands.strand("NM_2.3"), Some(Strand::Reverse));
        assert_eq!(strands.strand("NM_2"), None);
        assert_eq!(strands.len(), 2);
    }

    #[test]
    fn test_from_gene_table() {
        let filename = std::env::temp_dir().join(format!("framewalk_refgene_{}.txt", std::process::id()));
        {
            let mut file = File::create(&filename).unwrap();
            writeln!(file, "#bin\tname\tchrom\tstrand\ttxStart\ttxEnd").unwrap();
            writeln!(file, "585\tNM_001\tchr1\t+\t100\t2000").unwrap();
            writeln!(file, "585\tNM_002\tchr1\t-\t100\t2000").unwrap();
            writeln!(file, "NM_003\tchr2\t-\t100\t2000").unwrap();
            writeln!(file, "585\tNM_001\tchr1_alt\t-\t100\t2000").unwrap();
            writeln!(file, "585\tNM_004\tchr1\t.\t100\t2000").unwrap();
        }

        let strands = TranscriptStrands::from_gene_table(&filename).unwrap();
        std::fs::remove_file(&filename).unwrap();

        assert_eq!(strands.len(), 3);
        assert_eq!(strands.strand("NM_001"), Some(Strand::Forward));
        assert_eq!(strands.strand("NM_002"), Some(Strand::Reverse));
        assert_eq!(strands.strand("NM_003"), Some(Strand::Reverse));
        assert_eq!(strands.strand("NM_004"), None);
    }
}

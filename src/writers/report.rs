
use itertools::Itertools;
use std::io::Write;
use std::path::Path;

use crate::data_types::report::ReportRow;
use crate::genotype_gate::Pedigree;
use crate::pipeline::Report;

/// Fixed leading columns of the report
const FIXED_COLUMNS: [&str; 12] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "ALT_ID",
    "GENE", "TRANSCRIPT", "STRAND", "MUTATION", "TYPE", "CHROMATID"
];

/// Writes the tab-delimited report, one chromatid group per block
pub struct ReportWriter<W: Write> {
    /// The destination stream
    writer: W
}

impl<W: Write> ReportWriter<W> {
    /// Creates a new writer around any output stream.
    /// # Arguments
    /// * `writer` - the destination, typically a buffered stdout
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the comment lines and the column header.
    /// # Arguments
    /// * `vcf_filename` - the input VCF, echoed in the comments
    /// * `pedigree` - decides the trailing sample columns
    pub fn write_header(&mut self, vcf_filename: &Path, pedigree: &Pedigree) -> std::io::Result<()> {
        let pedigree_ids = [pedigree.father(), pedigree.mother(), Some(pedigree.child())].into_iter()
            .flatten()
            .join(",");
        writeln!(self.writer, "## VCF file used {}", vcf_filename.display())?;
        writeln!(self.writer, "## Pedigree used {pedigree_ids}")?;
        writeln!(self.writer, "## Details about list of variants downstream to FrameShift/StopGain Mutation.")?;

        let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.push(format!("CHILD-{}", pedigree.child()));
        if let Some(father) = pedigree.father() {
            header.push(format!("FATHER-{father}"));
        }
        if let Some(mother) = pedigree.mother() {
            header.push(format!("MOTHER-{mother}"));
        }
        writeln!(self.writer, "{}", header.join("\t"))
    }

    /// Writes one row, preceded by a blank line if it opens a group
    pub fn write_row(&mut self, row: &ReportRow) -> std::io::Result<()> {
        if row.is_trigger {
            writeln!(self.writer)?;
        }

        let fixed: [&str; 13] = [
            row.chrom.as_str(),
            &row.position.to_string(),
            &row.ids,
            &row.reference,
            &row.alternate,
            &row.alt_index.to_string(),
            &row.gene,
            &row.transcript,
            &row.strand.to_string(),
            &row.mutation,
            &row.row_type,
            row.chromatid.as_ref(),
            &row.child
        ];
        let line = fixed.into_iter()
            .chain(row.father.as_deref())
            .chain(row.mother.as_deref())
            .join("\t");
        writeln!(self.writer, "{line}")
    }

    /// Writes the header and every row of a report
    /// # Arguments
    /// * `vcf_filename` - the input VCF, echoed in the comments
    /// * `report` - the pipeline output
    pub fn write_report(&mut self, vcf_filename: &Path, report: &Report) -> std::io::Result<()> {
        self.write_header(vcf_filename, report.pedigree())?;
        for row in report.rows().iter() {
            self.write_row(row)?;
        }
        self.writer.flush()
    }

    /// Flushes and returns the underlying stream
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::candidate::{CandidateEntry, CandidateKey, RetainedVariant, TranscriptKey, VariantRole};
    use crate::data_types::genotype::Genotype;
    use crate::data_types::phase_enums::Chromatid;
    use crate::data_types::report::ReportTable;
    use crate::data_types::strand::Strand;

    fn row(position: u64, mutation: &str, role: VariantRole, has_father: bool) -> ReportRow {
        let group_key = TranscriptKey::new("GENE1".to_string(), "NM_1".to_string()).with_strand(Strand::Forward);
        let variant = RetainedVariant::new(
            CandidateKey::new("chr1".to_string(), position, ".".to_string(), "C".to_string(), "T".to_string(), 1),
            CandidateEntry::new(mutation.parse().unwrap(), "1|0".parse().unwrap(), Some(Genotype::Called(0, 1)), None),
            role
        );
        ReportRow::new(ReportTable::Phased, &group_key, &variant, Chromatid::Father, has_father, false)
    }

    fn render(pedigree: &Pedigree, rows: &[ReportRow]) -> String {
        let mut writer = ReportWriter::new(vec![]);
        writer.write_header(Path::new("trio.vcf.gz"), pedigree).unwrap();
        for r in rows.iter() {
            writer.write_row(r).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_child_only() {
        let pedigree = Pedigree::new(None, None, "kid".to_string());
        let text = render(&pedigree, &[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "## VCF file used trio.vcf.gz",
            "## Pedigree used kid",
            "## Details about list of variants downstream to FrameShift/StopGain Mutation.",
            "#CHROM\tPOS\tID\tREF\tALT\tALT_ID\tGENE\tTRANSCRIPT\tSTRAND\tMUTATION\tTYPE\tCHROMATID\tCHILD-kid"
        ]);
    }

    #[test]
    fn test_rows() {
        let pedigree = Pedigree::new(Some("dad".to_string()), None, "kid".to_string());
        let rows = vec![
            row(100, "StopGain", VariantRole::Trigger, true),
            row(200, "NonSynonymous", VariantRole::Downstream, true),
        ];
        let text = render(&pedigree, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "## Pedigree used dad,kid");
        assert!(lines[3].ends_with("CHILD-kid\tFATHER-dad"));
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "chr1\t100\t.\tC\tT\t1\tGENE1\tNM_1\t+\tStopGain\tSTOPGAIN\tFATHER_CHROM\t1|0\t0/1");
        assert_eq!(lines[6], "chr1\t200\t.\tC\tT\t1\tGENE1\tNM_1\t+\tNonSynonymous\tDOWNSTREAM\tFATHER_CHROM\t1|0\t0/1");
    }
}

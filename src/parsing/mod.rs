/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Parser for the per-allele functional annotation (ANN) field
pub mod annotation;
/// Loads transcript strands from a refGene / genePred table
pub mod strand_table;
/// Reads trio records out of a VCF via noodles
pub mod vcf_source;

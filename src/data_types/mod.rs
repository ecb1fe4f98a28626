
/// Candidate keys, buckets, and the retained variant table
pub mod candidate;
/// Diploid genotype calls and the gated trio genotypes
pub mod genotype;
/// Mutation classes and transcript-level annotations
pub mod mutation;
/// Phase calls and chromatid labels
pub mod phase_enums;
/// Rows of the final report
pub mod report;
/// Transcript strand orientation
pub mod strand;
/// Contains the variant record definition used by every stage
pub mod variants;

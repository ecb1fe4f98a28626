/*!
# Framewalk
Finds the coding variants that a child carries downstream of a frameshift or stop-gain on the same chromatid.
Records from a trio VCF are gated on genotype quality, phased against the parents, grouped per transcript, and walked in reading order.
*/

/// Collects coding candidates per transcript and chromatid
pub mod candidate_aggregator;
/// Labels reported alleles with their parental chromatid
pub mod chromatid_attributor;
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Genotype quality gate for trio calls
pub mod genotype_gate;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Trio phasing and phase token validation
pub mod phasing;
/// Ties every stage together over one pass of the input
pub mod pipeline;
/// Keeps candidate buckets that hold a qualifying trigger
pub mod trigger_filter;
/// Various utility functions that tend to be very generic
pub mod util;
/// Reading frame window walk over each bucket
pub mod window_filter;
/// All output writers
pub mod writers;

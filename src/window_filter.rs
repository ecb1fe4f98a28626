/*!
# Reading frame window filter
Walks a chromatid bucket in transcript order and keeps the variants that lie inside a downstream window.

A window opens on a stop-gain or frameshift ("the trigger").
A stop-gain window never closes since nothing after it is translated.
A frameshift window tracks the net base-pair displacement of every indel inside it, and closes once that displacement is a multiple of 3 (the original frame is restored).

| State | Class | Next state | Retained as |
|-------|-------|------------|-------------|
| Closed | StopGain | OpenStopGain | Trigger |
| Closed | FrameShift | OpenFrameShift(d) | Trigger |
| Closed | other | Closed | dropped |
| OpenStopGain | any | OpenStopGain | Downstream |
| OpenFrameShift(d) | FrameShift / NonFrameShift | Closed if (d + delta) % 3 == 0 | Downstream |
| OpenFrameShift(d) | other | OpenFrameShift(d) | Downstream |
*/
use log::{debug, trace};

use crate::candidate_aggregator::CandidateGroups;
use crate::data_types::candidate::{
    CandidateKey, CandidateSet, FilteredVariantTable, RetainedVariant, VariantRole
};
use crate::data_types::mutation::MutationClass;
use crate::data_types::strand::Strand;
use crate::parsing::strand_table::StrandLookup;

/// State of the downstream window while walking one bucket
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowState {
    Closed,
    OpenStopGain,
    /// Net displacement in bp accumulated since the frameshift trigger
    OpenFrameShift(i64)
}

impl WindowState {
    pub fn is_open(&self) -> bool {
        !matches!(self, WindowState::Closed)
    }

    /// Applies one variant to the window.
    /// Returns the next state and how the variant is retained, `None` if it is dropped.
    /// # Arguments
    /// * `key` - the candidate, used for its allele lengths
    /// * `mutation` - the candidate's mutation class on this transcript
    pub fn step(self, key: &CandidateKey, mutation: &MutationClass) -> (WindowState, Option<VariantRole>) {
        match (self, mutation) {
            (WindowState::Closed, MutationClass::StopGain) => {
                (WindowState::OpenStopGain, Some(VariantRole::Trigger))
            },
            (WindowState::Closed, MutationClass::FrameShift(kind)) => {
                let displacement = kind.displacement(key.reference(), key.alternate());
                (WindowState::OpenFrameShift(displacement), Some(VariantRole::Trigger))
            },
            (WindowState::Closed, _) => {
                (WindowState::Closed, None)
            },
            (WindowState::OpenStopGain, _) => {
                (WindowState::OpenStopGain, Some(VariantRole::Downstream))
            },
            (WindowState::OpenFrameShift(displacement), MutationClass::FrameShift(kind)) |
            (WindowState::OpenFrameShift(displacement), MutationClass::NonFrameShift(kind)) => {
                let displacement = displacement + kind.displacement(key.reference(), key.alternate());
                let next = if displacement % 3 == 0 {
                    WindowState::Closed
                } else {
                    WindowState::OpenFrameShift(displacement)
                };
                (next, Some(VariantRole::Downstream))
            },
            (WindowState::OpenFrameShift(displacement), _) => {
                (WindowState::OpenFrameShift(displacement), Some(VariantRole::Downstream))
            }
        }
    }
}

/// Walks one bucket in transcript order and returns everything inside a window.
/// # Arguments
/// * `bucket` - all candidates on one chromatid of one transcript
/// * `strand` - the transcript strand, which decides walk direction
pub fn walk_window(bucket: &CandidateSet, strand: Strand) -> Vec<RetainedVariant> {
    let mut ordered: Vec<_> = bucket.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| strand.transcript_order(*a, *b));

    let mut state = WindowState::Closed;
    let mut retained = vec![];
    for (key, entry) in ordered.into_iter() {
        let (next_state, role) = state.step(key, entry.mutation());
        trace!("\t{}:{} {} {state:?} -> {next_state:?}", key.chrom(), key.position(), entry.mutation());
        if let Some(role) = role {
            retained.push(RetainedVariant::new(key.clone(), entry.clone(), role));
        }
        state = next_state;
    }
    retained
}

/// Applies the window walk to every bucket that survived the trigger filter.
/// Transcripts without a known strand are skipped.
/// A bucket is reported only if something besides a lone trigger was retained, and only once per identical outcome.
/// # Arguments
/// * `groups` - the trigger-filtered candidate collection
/// * `strands` - strand source for transcripts
pub fn filter_downstream<S: StrandLookup + ?Sized>(groups: &CandidateGroups, strands: &S) -> FilteredVariantTable {
    let mut table = FilteredVariantTable::new();
    for (transcript_key, buckets) in groups.iter() {
        let Some(strand) = strands.strand(transcript_key.transcript()) else {
            debug!("No strand found for {}, skipping {}", transcript_key.transcript(), transcript_key.gene());
            continue;
        };

        let group_key = transcript_key.with_strand(strand);
        for bucket in buckets.iter() {
            let retained = walk_window(bucket, strand);
            if retained.len() <= 1 {
                continue;
            }

            let kept = table.entry(group_key.clone()).or_default();
            if kept.contains(&retained) {
                debug!("{}/{}: duplicate chromatid outcome ignored", group_key.gene(), group_key.transcript());
            } else {
                kept.push(retained);
            }
        }
    }
    table
}

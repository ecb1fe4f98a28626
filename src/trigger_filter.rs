/*!
# Trigger filter
Keeps only the chromatid buckets that could possibly produce a report:
at least two candidates, with at least one frameshift or stop-gain among them.
*/
use log::debug;

use crate::candidate_aggregator::CandidateGroups;
use crate::data_types::candidate::{CandidateEntry, CandidateSet};

/// How strictly a trigger is qualified
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerRule {
    /// Any frameshift / stop-gain counts
    Phased,
    /// The triggering entry must also be homozygous, since its chromatid cannot otherwise be known
    UnphasedHomozygous
}

impl TriggerRule {
    fn is_trigger(&self, entry: &CandidateEntry) -> bool {
        entry.mutation().is_trigger() && match self {
            TriggerRule::Phased => true,
            TriggerRule::UnphasedHomozygous => entry.phase().is_homozygous()
        }
    }

    /// Returns true if the bucket should be kept
    pub fn accepts(&self, bucket: &CandidateSet) -> bool {
        bucket.len() >= 2 && bucket.values().any(|e| self.is_trigger(e))
    }
}

/// Drops every bucket without a qualifying trigger; transcripts left with no buckets are removed.
/// # Arguments
/// * `groups` - the candidate collection from aggregation
/// * `rule` - which trigger rule applies to this collection
pub fn filter_triggers(groups: CandidateGroups, rule: TriggerRule) -> CandidateGroups {
    groups.into_iter()
        .filter_map(|(transcript_key, buckets)| {
            let total = buckets.len();
            let kept: Vec<CandidateSet> = buckets.into_iter()
                .filter(|b| rule.accepts(b))
                .collect();
            if kept.len() < total {
                debug!("{}/{}: dropped {} of {total} bucket(s) without a trigger", transcript_key.gene(), transcript_key.transcript(), total - kept.len());
            }
            if kept.is_empty() {
                None
            } else {
                Some((transcript_key, kept))
            }
        })
        .collect()
}

// src/classify/classify_stats.rs

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::lineage::resolve_to_rank;
use crate::taxdb::TaxonomyTree;
use crate::types::{ClassifiedRead, TaxonId};

/// Read counts per resolved taxon, in the order each taxon was first seen,
/// together with the run totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonCounts {
    counts: IndexMap<TaxonId, u64, ahash::RandomState>,
    /// Every read that was not marked unclassified, resolved or not.
    pub total_classified: u64,
    /// Reads that resolved to the target rank.
    pub resolved: u64,
}

impl TaxonCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one read. Reads labelled `unclassified_label` are ignored
    /// entirely; everything else contributes to `total_classified`.
    pub fn add_read(
        &mut self,
        read: &ClassifiedRead,
        tree: &TaxonomyTree,
        target_rank: &str,
        unclassified_label: &str,
    ) -> Result<()> {
        if read.seq_id == unclassified_label {
            return Ok(());
        }
        self.total_classified += 1;
        match resolve_to_rank(&read.taxon_id, tree, target_rank)? {
            Some(taxid) => self.increment(taxid, 1),
            None => log::trace!(
                "Read {} (taxon {}) has no {} ancestor",
                read.read_id,
                read.taxon_id,
                target_rank
            ),
        }
        Ok(())
    }

    fn increment(&mut self, taxid: TaxonId, by: u64) {
        *self.counts.entry(taxid).or_insert(0) += by;
        self.resolved += by;
    }

    /// Fold `other` into `self`. Taxa first seen in `other` are appended
    /// after the taxa already present.
    pub fn merge(&mut self, other: TaxonCounts) {
        self.counts.reserve(other.counts.len());
        for (taxid, count) in other.counts {
            *self.counts.entry(taxid).or_insert(0) += count;
        }
        self.total_classified += other.total_classified;
        self.resolved += other.resolved;
    }

    pub fn get(&self, taxid: &str) -> Option<u64> {
        self.counts.get(taxid).copied()
    }

    /// Reads that were classified but had no ancestor at the target rank.
    pub fn unresolved(&self) -> u64 {
        self.total_classified - self.resolved
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// (taxid, count) pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaxonId, u64)> + '_ {
        self.counts.iter().map(|(k, &v)| (k, v))
    }
}

/// Resolve every read to `target_rank` and count reads per resolved taxon.
/// Consumes `reads` in a single forward pass; the first error aborts.
pub fn aggregate<I>(
    reads: I,
    tree: &TaxonomyTree,
    target_rank: &str,
    unclassified_label: &str,
) -> Result<TaxonCounts>
where
    I: IntoIterator<Item = Result<ClassifiedRead>>,
{
    let mut counts = TaxonCounts::new();
    for read in reads {
        counts.add_read(&read?, tree, target_rank, unclassified_label)?;
    }
    Ok(counts)
}

/// Parallel version of [`aggregate`] over an in-memory batch of reads.
///
/// Each rayon worker keeps its own `TaxonCounts`; partial results are merged
/// left to right, so the first-seen order matches a sequential pass. On
/// failure the error is that of the first failing read in input order.
pub fn aggregate_parallel(
    reads: &[ClassifiedRead],
    tree: &TaxonomyTree,
    target_rank: &str,
    unclassified_label: &str,
) -> Result<TaxonCounts> {
    reads
        .par_iter()
        .try_fold(TaxonCounts::new, |mut acc, read| -> Result<TaxonCounts> {
            acc.add_read(read, tree, target_rank, unclassified_label)?;
            Ok(acc)
        })
        .try_reduce(TaxonCounts::new, |mut a, b| {
            a.merge(b);
            Ok(a)
        })
        .or_else(|err| -> Result<TaxonCounts> {
            // rayon stops at whichever worker fails first; rescan in order.
            let mut scan = TaxonCounts::new();
            for read in reads {
                scan.add_read(read, tree, target_rank, unclassified_label)?;
            }
            Err(err)
        })
}

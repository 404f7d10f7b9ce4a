use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ChunkResult;

/// Counters derived from the aggregator after a terminal chunk is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateCounts {
    pub total: usize,
    pub terminal: usize,
    pub failed: usize,
}

/// Collects chunk results in whatever order tasks finish and hands them
/// back ordered by chunk index.
pub struct ResultAggregator {
    total_chunks: usize,
    entries: Mutex<BTreeMap<usize, ChunkResult>>,
}

impl ResultAggregator {
    pub fn new(total_chunks: usize) -> Self {
        Self {
            total_chunks,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Stores the terminal result for a chunk. A second result for the same
    /// index replaces the first, so exactly one entry exists per index.
    pub fn record(&self, result: ChunkResult) -> AggregateCounts {
        let mut entries = self.lock();
        if result.chunk_index >= self.total_chunks {
            tracing::warn!(
                chunk_index = result.chunk_index,
                total_chunks = self.total_chunks,
                "Ignoring result for unknown chunk"
            );
        } else if entries.insert(result.chunk_index, result).is_some() {
            tracing::warn!("Chunk result recorded twice; keeping the latest");
        }
        Self::counts_of(&entries, self.total_chunks)
    }

    pub fn counts(&self) -> AggregateCounts {
        Self::counts_of(&self.lock(), self.total_chunks)
    }

    /// Current entries in ascending chunk order.
    pub fn snapshot(&self) -> Vec<ChunkResult> {
        self.lock().values().cloned().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.lock().len() == self.total_chunks
    }

    /// Ordered results, or `None` while any chunk is still missing.
    pub fn finalize(&self) -> Option<Vec<ChunkResult>> {
        let entries = self.lock();
        (entries.len() == self.total_chunks).then(|| entries.values().cloned().collect())
    }

    /// Ordered results with `placeholder` standing in for every chunk that
    /// never reached a terminal state.
    pub fn finalize_with(&self, placeholder: impl Fn(usize) -> ChunkResult) -> Vec<ChunkResult> {
        let mut entries = self.lock();
        for index in 0..self.total_chunks {
            entries
                .entry(index)
                .or_insert_with(|| placeholder(index));
        }
        entries.values().cloned().collect()
    }

    fn counts_of(entries: &BTreeMap<usize, ChunkResult>, total: usize) -> AggregateCounts {
        AggregateCounts {
            total,
            terminal: entries.len(),
            failed: entries.values().filter(|r| r.is_failed()).count(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<usize, ChunkResult>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

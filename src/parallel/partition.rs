//! Task partitioning strategies

use serde::Serialize;

/// How the executor hands tasks to its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Workers pull one task at a time from a shared queue. Uneven image
    /// sizes balance out, which keeps throughput measurements honest at
    /// higher worker counts.
    DynamicQueue,

    /// The task sequence is split up front into contiguous near-even chunks,
    /// one per worker; no coordination happens after that. The legacy two-way
    /// split is this strategy with two workers.
    StaticContiguous,
}

impl PartitionStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::DynamicQueue => "dynamic",
            Self::StaticContiguous => "split",
        }
    }
}

/// Split `items` into `count` contiguous chunks whose lengths differ by at
/// most one. Chunks may be empty when there are fewer items than workers.
pub fn contiguous_chunks<T>(items: &[T], count: usize) -> Vec<&[T]> {
    assert!(count > 0, "chunk count must be positive");

    let base = items.len() / count;
    let remainder = items.len() % count;

    let mut chunks = Vec::with_capacity(count);
    let mut offset = 0;
    for index in 0..count {
        let len = base + usize::from(index < remainder);
        chunks.push(&items[offset..offset + len]);
        offset += len;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let items: Vec<u32> = (0..10).collect();
        let chunks = contiguous_chunks(&items, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], &items[0..5]);
        assert_eq!(chunks[1], &items[5..10]);
    }

    #[test]
    fn test_uneven_split_spreads_remainder() {
        let items: Vec<u32> = (0..10).collect();
        let chunks = contiguous_chunks(&items, 3);
        let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 3, 3]);

        // chunks stay contiguous and cover everything exactly once
        let rejoined: Vec<u32> = chunks.into_iter().flatten().copied().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_more_workers_than_items() {
        let items = [1, 2];
        let chunks = contiguous_chunks(&items, 4);
        let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_single_chunk() {
        let items = [1, 2, 3];
        let chunks = contiguous_chunks(&items, 1);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], &items[..]);
    }

    #[test]
    fn test_empty_input() {
        let items: [u32; 0] = [];
        let chunks = contiguous_chunks(&items, 3);
        assert!(chunks.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(PartitionStrategy::DynamicQueue.label(), "dynamic");
        assert_eq!(PartitionStrategy::StaticContiguous.label(), "split");
    }
}

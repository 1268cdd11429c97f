//! Check number allocation.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::CheckRunError;
use crate::ports::CheckNumberSequence;

/// Issues batches of unique check numbers from the shared sequence.
///
/// There is no locking here: uniqueness comes from the sequence's atomic
/// increment. Numbers are burned once drawn, so a failed run leaves gaps,
/// never duplicates.
#[derive(Clone)]
pub struct CheckNumberAllocator {
    sequence: Arc<dyn CheckNumberSequence>,
}

impl CheckNumberAllocator {
    /// Creates an allocator over `sequence`.
    #[must_use]
    pub fn new(sequence: Arc<dyn CheckNumberSequence>) -> Self {
        Self { sequence }
    }

    /// Returns exactly `count` unique numbers in strictly increasing order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::Unexpected`] when `count` is zero or the
    /// sequence returns the wrong number of values or a repeated value.
    pub async fn allocate_batch(&self, count: usize) -> Result<Vec<i64>, CheckRunError> {
        if count == 0 {
            return Err(CheckRunError::Unexpected(
                "Cannot allocate an empty batch of check numbers.".to_string(),
            ));
        }

        let mut numbers = self.sequence.next_values(count).await?;
        numbers.sort_unstable();
        numbers.dedup();

        if numbers.len() != count {
            error!(
                requested = count,
                received = numbers.len(),
                "Check number sequence returned a short or repeated batch"
            );
            return Err(CheckRunError::Unexpected(
                "Failed to allocate check numbers.".to_string(),
            ));
        }

        debug!(
            count,
            first = numbers[0],
            last = numbers[count - 1],
            "Allocated check numbers"
        );

        Ok(numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCheckRunStore;
    use async_trait::async_trait;

    struct FixedSequence(Vec<i64>);

    #[async_trait]
    impl CheckNumberSequence for FixedSequence {
        async fn next_values(&self, _count: usize) -> Result<Vec<i64>, CheckRunError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_allocates_increasing_batch() {
        let store = Arc::new(InMemoryCheckRunStore::with_first_check_number(1000));
        let allocator = CheckNumberAllocator::new(store);

        let first = allocator.allocate_batch(3).await.unwrap();
        let second = allocator.allocate_batch(2).await.unwrap();

        assert_eq!(first, vec![1000, 1001, 1002]);
        assert_eq!(second, vec![1003, 1004]);
    }

    #[tokio::test]
    async fn test_sorts_out_of_order_values() {
        let allocator = CheckNumberAllocator::new(Arc::new(FixedSequence(vec![12, 10, 11])));
        assert_eq!(allocator.allocate_batch(3).await.unwrap(), vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_short_batch_is_unexpected() {
        let allocator = CheckNumberAllocator::new(Arc::new(FixedSequence(vec![10, 11])));
        let err = allocator.allocate_batch(3).await.unwrap_err();
        assert!(matches!(err, CheckRunError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_repeated_value_is_unexpected() {
        let allocator = CheckNumberAllocator::new(Arc::new(FixedSequence(vec![10, 10, 11])));
        let err = allocator.allocate_batch(3).await.unwrap_err();
        assert!(matches!(err, CheckRunError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_zero_count_rejected() {
        let allocator = CheckNumberAllocator::new(Arc::new(FixedSequence(vec![])));
        assert!(allocator.allocate_batch(0).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_callers_never_share_numbers() {
        let store = Arc::new(InMemoryCheckRunStore::with_first_check_number(1));
        let allocator = CheckNumberAllocator::new(store);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(
                async move { allocator.allocate_batch(25).await },
            ));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap().unwrap());
        }
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, 16 * 25);
    }
}

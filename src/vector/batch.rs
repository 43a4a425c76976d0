use super::types::StoredVector;

/// Wire-size ceiling per upsert call. Hosted vector backends reject
/// messages above 4 MiB; staying under it is this side's responsibility.
pub const MAX_BATCH_BYTES: usize = 4 * 1024 * 1024;

/// Split records into upsert batches whose estimated serialized size stays
/// under `max_bytes`. A batch is flushed as soon as the next record would
/// push it over the ceiling; the remainder ships at the end. A record that
/// alone exceeds the ceiling still ships, in a batch of its own.
pub fn plan_batches(records: Vec<StoredVector>, max_bytes: usize) -> Vec<Vec<StoredVector>> {
    let mut batches = Vec::new();
    let mut current: Vec<StoredVector> = Vec::new();
    let mut current_bytes = 0usize;

    for record in records {
        let record_bytes = record.estimated_bytes();
        if !current.is_empty() && current_bytes + record_bytes > max_bytes {
            batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += record_bytes;
        current.push(record);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::types::VectorMetadata;

    fn record(id: &str, dimension: usize) -> StoredVector {
        StoredVector {
            id: id.to_string(),
            values: vec![0.5; dimension],
            metadata: VectorMetadata {
                text: "t".repeat(64),
                filename: "doc.txt".to_string(),
                chunk_index: 0,
                total_chunks: 1,
                page_number: None,
                start_position: None,
                end_position: None,
            },
        }
    }

    #[test]
    fn empty_input_produces_no_batches() {
        assert!(plan_batches(Vec::new(), MAX_BATCH_BYTES).is_empty());
    }

    #[test]
    fn small_sets_stay_in_one_batch() {
        let records = vec![record("a", 8), record("b", 8)];
        let batches = plan_batches(records, MAX_BATCH_BYTES);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn no_batch_exceeds_the_ceiling() {
        // ~40 KiB per record against a 128 KiB ceiling forces several flushes.
        let records: Vec<StoredVector> =
            (0..50).map(|i| record(&format!("r{i}"), 10_000)).collect();
        let ceiling = 128 * 1024;
        let batches = plan_batches(records, ceiling);

        assert!(batches.len() > 1);
        for batch in &batches {
            let bytes: usize = batch.iter().map(StoredVector::estimated_bytes).sum();
            assert!(bytes <= ceiling, "batch of {bytes} bytes over ceiling");
        }
    }

    #[test]
    fn batching_preserves_every_record_exactly_once() {
        let records: Vec<StoredVector> =
            (0..37).map(|i| record(&format!("r{i}"), 5_000)).collect();
        let batches = plan_batches(records, 64 * 1024);

        let flattened: Vec<String> = batches
            .iter()
            .flatten()
            .map(|r| r.id.clone())
            .collect();
        let expected: Vec<String> = (0..37).map(|i| format!("r{i}")).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn oversized_record_ships_alone() {
        let records = vec![record("big", 100_000), record("small", 8)];
        let batches = plan_batches(records, 1024);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].id, "big");
    }
}

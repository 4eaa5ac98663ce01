//! Monitor log merger - bounded, newest-first accumulation.
//!
//! Unlike the perception and planning mergers, which replace their slice
//! of the world wholesale, monitor batches accumulate: the incoming batch
//! is stacked on top of the retained history and the combined list is cut
//! at capacity. An incoming batch always wins over history - a batch at
//! or above capacity evicts the entire prior log.

use tracing::trace;

use crate::messages::MonitorBatch;
use crate::world::SimulationWorld;

/// Merges an operator-log batch into the world.
///
/// Keeps the first `capacity` entries of `batch ++ existing`, preserving
/// each side's internal order, and stamps both the monitor header and the
/// world header with the batch header timestamp. The stamp is applied
/// unconditionally; ordering across batches is the transport's contract,
/// not checked here.
pub fn merge_monitor(world: &mut SimulationWorld, batch: &MonitorBatch, capacity: usize) {
    let retained = capacity.saturating_sub(batch.entries.len());

    let mut merged = Vec::with_capacity(capacity.min(batch.entries.len() + world.monitor.entries.len()));
    merged.extend(batch.entries.iter().take(capacity).cloned());
    merged.extend(world.monitor.entries.iter().take(retained).cloned());

    let evicted = (batch.entries.len() + world.monitor.entries.len()) - merged.len();
    if evicted > 0 {
        trace!(evicted, "monitor log at capacity, dropping oldest entries");
    }

    world.monitor.entries = merged;
    world.monitor.timestamp_sec = batch.timestamp_sec;
    world.timestamp_sec = batch.timestamp_sec;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::LogEntry;

    fn batch_of(messages: &[&str], timestamp_sec: f64) -> MonitorBatch {
        MonitorBatch {
            timestamp_sec,
            entries: messages
                .iter()
                .map(|m| LogEntry::new(*m, timestamp_sec))
                .collect(),
        }
    }

    fn seeded_world(messages: &[String], timestamp_sec: f64) -> SimulationWorld {
        let mut world = SimulationWorld::new();
        world.monitor.timestamp_sec = timestamp_sec;
        world.monitor.entries = messages
            .iter()
            .map(|m| LogEntry::new(m.clone(), timestamp_sec))
            .collect();
        world
    }

    #[test]
    fn test_merge_stacks_batch_on_top_of_history() {
        let mut world = seeded_world(&["I am the previous message.".to_string()], 1990.0);
        let batch = batch_of(&["I am the latest message."], 2000.0);

        merge_monitor(&mut world, &batch, 2);

        assert_eq!(world.monitor.entries.len(), 2);
        assert_eq!(world.monitor.entries[0].message, "I am the latest message.");
        assert_eq!(
            world.monitor.entries[1].message,
            "I am the previous message."
        );
        assert_eq!(world.monitor.timestamp_sec, 2000.0);
        assert_eq!(world.timestamp_sec, 2000.0);
    }

    #[test]
    fn test_merge_evicts_oldest_when_full() {
        let capacity = 30;
        let history: Vec<String> = (0..capacity).map(|i| format!("I am message {i}")).collect();
        let mut world = seeded_world(&history, 1990.0);
        let batch = batch_of(&["I am message -2", "I am message -1"], 2000.0);

        merge_monitor(&mut world, &batch, capacity);

        assert_eq!(world.monitor.entries.len(), capacity);
        assert_eq!(world.monitor.entries[0].message, "I am message -2");
        assert_eq!(world.monitor.entries[1].message, "I am message -1");
        // The two oldest history entries fell off the tail.
        assert_eq!(
            world.monitor.entries[capacity - 1].message,
            format!("I am message {}", capacity - 3)
        );
    }

    #[test]
    fn test_oversized_batch_evicts_everything_and_truncates() {
        let capacity = 30;
        let mut world = seeded_world(&[], 1990.0);
        let messages: Vec<String> = (0..capacity + 10).map(|i| format!("msg {i}")).collect();
        let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
        let batch = batch_of(&refs, 2000.0);

        merge_monitor(&mut world, &batch, capacity);

        assert_eq!(world.monitor.entries.len(), capacity);
        assert_eq!(world.monitor.entries[0].message, "msg 0");
        assert_eq!(
            world.monitor.entries[capacity - 1].message,
            format!("msg {}", capacity - 1)
        );
    }

    #[test]
    fn test_stale_batch_timestamp_still_applied() {
        // Merges apply regardless of timestamp ordering; the transport
        // owns delivery order.
        let mut world = seeded_world(&["fresh".to_string()], 2000.0);
        let batch = batch_of(&["late arrival"], 1500.0);

        merge_monitor(&mut world, &batch, 30);

        assert_eq!(world.monitor.timestamp_sec, 1500.0);
        assert_eq!(world.monitor.entries[0].message, "late arrival");
        assert_eq!(world.monitor.entries[1].message, "fresh");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn merged_log_is_bounded_batch_first(
                history_len in 0usize..80,
                batch_len in 0usize..80,
                capacity in 1usize..50,
            ) {
                let history: Vec<String> =
                    (0..history_len).map(|i| format!("old {i}")).collect();
                let mut world = seeded_world(&history, 0.0);
                let messages: Vec<String> =
                    (0..batch_len).map(|i| format!("new {i}")).collect();
                let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
                let batch = batch_of(&refs, 1.0);

                merge_monitor(&mut world, &batch, capacity);

                let merged = &world.monitor.entries;
                prop_assert_eq!(merged.len(), (batch_len + history_len).min(capacity));

                // Batch prefix survives verbatim.
                for (i, entry) in merged.iter().take(batch_len.min(capacity)).enumerate() {
                    prop_assert_eq!(&entry.message, &format!("new {i}"));
                }
                // Whatever remains is a prefix of the pre-merge history.
                for (i, entry) in merged.iter().skip(batch_len.min(capacity)).enumerate() {
                    prop_assert_eq!(&entry.message, &format!("old {i}"));
                }
            }
        }
    }
}

//! Process-wide progress store.

use parking_lot::RwLock;
use std::sync::Arc;

use super::types::ProgressSnapshot;

/// Holder of the single current [`ProgressSnapshot`].
///
/// Snapshots are immutable and replaced whole, so the lock is only held for
/// the duration of an `Arc` swap or clone.
#[derive(Debug)]
pub struct ProgressStore {
    current: RwLock<Arc<ProgressSnapshot>>,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore {
    /// Creates a store holding the idle snapshot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(ProgressSnapshot::idle())),
        }
    }

    /// Replaces the current snapshot.
    pub fn set(&self, snapshot: ProgressSnapshot) {
        let next = Arc::new(snapshot);
        *self.current.write() = next;
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> ProgressSnapshot {
        self.current.read().as_ref().clone()
    }

    /// Returns the current snapshot without copying it.
    pub fn get_shared(&self) -> Arc<ProgressSnapshot> {
        Arc::clone(&self.current.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressPhase;

    #[test]
    fn test_initial_value_is_idle() {
        let store = ProgressStore::new();
        let snapshot = store.get();
        assert_eq!(snapshot.phase, ProgressPhase::Idle);
        assert_eq!(snapshot.percent, 0);
        assert!(snapshot.message.is_empty());
    }

    #[test]
    fn test_set_is_visible_to_next_get() {
        let store = ProgressStore::new();
        store.set(ProgressSnapshot::new(
            ProgressPhase::Downloading,
            37,
            "Downloading...",
            Some("job-1".to_string()),
        ));

        let snapshot = store.get();
        assert_eq!(snapshot.phase, ProgressPhase::Downloading);
        assert_eq!(snapshot.percent, 37);
        assert_eq!(snapshot.job_id.as_deref(), Some("job-1"));
    }

    #[test]
    fn test_set_overwrites_without_history() {
        let store = ProgressStore::new();
        store.set(ProgressSnapshot::new(ProgressPhase::Resolving, 0, "a", None));
        store.set(ProgressSnapshot::new(ProgressPhase::Transcoding, 5, "b", None));
        assert_eq!(store.get().message, "b");
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(ProgressStore::new());

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for percent in 0..=100u8 {
                    store.set(ProgressSnapshot::new(
                        ProgressPhase::Downloading,
                        percent,
                        format!("{}", percent),
                        None,
                    ));
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move {
                for _ in 0..100 {
                    let snapshot = store.get_shared();
                    if snapshot.phase == ProgressPhase::Downloading {
                        assert_eq!(snapshot.message, snapshot.percent.to_string());
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(store.get().percent, 100);
    }
}

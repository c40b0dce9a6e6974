//! Periodic and shutdown saves.
//!
//! Writes run on the blocking pool and are serialized by an owned lock that
//! travels with the blocking closure: aborting the task that awaits a write
//! does not release the lock until the file is actually written.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hkgi_core::persistence::save_to_path;
use hkgi_core::prelude::*;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Snapshotter {
    engine: Arc<Engine>,
    path: PathBuf,
    writing: Arc<Mutex<()>>,
}

impl Snapshotter {
    pub fn new(engine: Arc<Engine>, path: PathBuf) -> Self {
        Self {
            engine,
            path,
            writing: Arc::new(Mutex::new(())),
        }
    }

    /// Clone the store and write it, after any write already in flight.
    pub async fn write(&self) -> Result<(), JoinError> {
        let guard = Arc::clone(&self.writing).lock_owned().await;
        let engine = Arc::clone(&self.engine);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let data = engine.save_data();
            match save_to_path(&data, &path) {
                Ok(()) => debug!(steads = data.steads.len(), path = %path.display(), "snapshot written"),
                Err(e) => warn!(error = %e, path = %path.display(), "snapshot failed"),
            }
        })
        .await
    }

    /// Write every `period`, skipping the immediate first interval tick.
    pub async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = self.write().await {
                warn!(error = %e, "snapshot task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkgi_core::persistence::load_from_path;

    fn engine_with_users(count: usize) -> Arc<Engine> {
        let engine = Engine::new(EngineConfig::default(), Manifest::bundled().unwrap()).unwrap();
        for i in 0..count {
            engine.signup(&format!("user{i:04}")).unwrap();
        }
        Arc::new(engine)
    }

    #[tokio::test]
    async fn test_aborted_and_overlapping_writes_leave_a_valid_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steads.bin");
        let snapshots = Snapshotter::new(engine_with_users(500), path.clone());

        let periodic = {
            let snapshots = snapshots.clone();
            tokio::spawn(async move { snapshots.write().await })
        };
        tokio::task::yield_now().await;
        periodic.abort();

        let (first, second) = tokio::join!(snapshots.write(), snapshots.write());
        first.unwrap();
        second.unwrap();

        let data = load_from_path(&path).unwrap().unwrap();
        assert_eq!(data.steads.len(), 500);
        assert!(!dir.path().join("steads.bin.tmp").exists());
    }
}

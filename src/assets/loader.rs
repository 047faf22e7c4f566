//! Background model loading
//!
//! Downloads and decoding run on one worker thread so the window keeps
//! rendering; results are drained once per frame with [`AssetLoader::poll`].
//! Dropping the loader closes the request channel, which ends the worker
//! after its current job.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::{load_model, AssetError, AssetSource, ModelData};
use crate::catalog::CatalogEntry;

/// A model the user asked to place
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: u64,
    pub entry: CatalogEntry,
    pub source: AssetSource,
}

/// Result of one [`LoadRequest`]
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: u64,
    pub entry: CatalogEntry,
    pub result: Result<ModelData, AssetError>,
}

pub struct AssetLoader {
    requests: Sender<LoadRequest>,
    outcomes: Receiver<LoadOutcome>,
    next_ticket: u64,
    pending: usize,
}

impl AssetLoader {
    pub fn new() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<LoadOutcome>();

        std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                for request in request_rx {
                    log::info!("Loading {} from {}", request.entry.file, request.source.describe());
                    let result = load_model(&request.source, request.entry.format);
                    match &result {
                        Ok(model) => log::info!(
                            "Loaded {} ({} parts, {} triangles)",
                            request.entry.file,
                            model.parts.len(),
                            model.triangle_count()
                        ),
                        Err(e) => log::warn!("Failed to load {}: {}", request.entry.file, e),
                    }

                    let outcome = LoadOutcome {
                        ticket: request.ticket,
                        entry: request.entry,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
            next_ticket: 0,
            pending: 0,
        })
    }

    /// Queues a load; the returned ticket comes back with the outcome
    pub fn request(&mut self, entry: CatalogEntry, source: AssetSource) -> Option<u64> {
        self.next_ticket += 1;
        let request = LoadRequest {
            ticket: self.next_ticket,
            entry,
            source,
        };

        if self.requests.send(request).is_err() {
            log::error!("Asset loader thread is gone");
            return None;
        }
        self.pending += 1;
        Some(self.next_ticket)
    }

    /// Everything finished since the last call
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut finished = Vec::new();
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => {
                    self.pending = self.pending.saturating_sub(1);
                    finished.push(outcome);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.pending = 0;
                    break;
                }
            }
        }
        finished
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut AssetLoader) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = loader.poll().pop() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_loads_local_obj() {
        let dir = std::env::temp_dir().join(format!("room-arranger-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stool.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut loader = AssetLoader::new().unwrap();
        let entry = CatalogEntry::from_file("stool.obj").unwrap();
        let ticket = loader.request(entry, AssetSource::Local(path)).unwrap();
        assert_eq!(loader.pending(), 1);

        let outcome = wait_for(&mut loader);
        assert_eq!(outcome.ticket, ticket);
        assert_eq!(outcome.entry.name, "Stool");
        assert_eq!(outcome.result.unwrap().triangle_count(), 1);
        assert_eq!(loader.pending(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failure_is_reported() {
        let mut loader = AssetLoader::new().unwrap();
        let entry = CatalogEntry::from_file("ghost_chair.glb").unwrap();
        loader
            .request(entry, AssetSource::Local("/nonexistent/ghost_chair.glb".into()))
            .unwrap();
        assert!(wait_for(&mut loader).result.is_err());
    }
}

//! Session - Async command surface over a shared race store
//!
//! Round-running commands simulate the round, release the store while the
//! round plays out, then record the result. Readers can watch the round in
//! flight; mutating commands issued meanwhile are rejected by the store.
//! A round cannot be cancelled once started; `reset` only makes its result
//! be discarded when the playback ends.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::game_server::error::RaceError;
use crate::game_server::horse::Horse;
use crate::game_server::race::RaceRound;
use crate::game_server::simulation::{RaceStore, RoundStart, SessionConfig, SessionSnapshot};

/// Cloneable handle to one race session
#[derive(Clone, Default)]
pub struct RaceSession {
    store: Arc<Mutex<RaceStore>>,
}

impl RaceSession {
    /// Create a session with the default configuration
    pub fn new() -> Self {
        Self::from_store(RaceStore::new())
    }

    /// Create a session with the given configuration
    pub fn with_config(config: SessionConfig) -> Result<Self, RaceError> {
        Ok(Self::from_store(RaceStore::with_config(config)?))
    }

    pub fn from_store(store: RaceStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Roll a new roster
    pub async fn generate_horses(&self) -> Result<Vec<Horse>, RaceError> {
        let mut store = self.store.lock().await;
        store.generate_horses().map(|horses| horses.to_vec())
    }

    /// Build the round schedule for the current roster
    pub async fn generate_schedule(&self) -> Result<Vec<RaceRound>, RaceError> {
        let mut store = self.store.lock().await;
        store.generate_schedule().map(|schedule| schedule.to_vec())
    }

    /// Start from the first round; resolves once that round is recorded
    pub async fn start_race(&self) -> Result<(), RaceError> {
        let start = self.store.lock().await.start_race()?;
        self.play(start).await;
        Ok(())
    }

    /// Run the next round; resolves once it is recorded or the session is finished
    pub async fn next_round(&self) -> Result<(), RaceError> {
        let start = self.store.lock().await.next_round()?;
        self.play(start).await;
        Ok(())
    }

    /// Return to the initial idle state
    pub async fn reset(&self) {
        self.store.lock().await.reset();
    }

    /// Let a started round play out, then record it
    async fn play(&self, start: RoundStart) {
        let RoundStart::Started(ticket) = start else {
            return;
        };

        tokio::time::sleep(ticket.delay).await;
        self.store.lock().await.finish_round(ticket);
    }

    /// Get complete session snapshot
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.store.lock().await.snapshot()
    }

    /// Read from the store without copying the whole session
    pub async fn read<T>(&self, f: impl FnOnce(&RaceStore) -> T) -> T {
        let store = self.store.lock().await;
        f(&store)
    }
}

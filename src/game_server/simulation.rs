//! Simulation - Race lifecycle store
//!
//! Owns all mutable session state and drives the sequence
//! generate horses -> build schedule -> run round -> advance -> finish.
//! Everything here is synchronous; the timed playback between
//! `begin_round` and `finish_round` is left to the caller.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game_server::error::RaceError;
use crate::game_server::horse::{generate_roster, Horse, RaceEntry};
use crate::game_server::race::{
    build_schedule, playback_delay, simulate_round_with, RaceResult, RaceRound, RaceSnapshot,
    RACE_DISTANCES,
};

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RaceStatus {
    Idle,
    Ready,
    Racing,
    RoundComplete,
    Finished,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Largest roster `generate_horses` may roll
    pub max_horses: u32,
    /// One round is scheduled per distance (meters)
    pub distances: Vec<u32>,
    /// Extra playback time after the slowest horse (milliseconds)
    pub playback_padding_ms: u64,
    /// Multiplier on the playback delay; 0 resolves rounds immediately
    pub playback_scale: f64,
    /// Seed for reproducible sessions; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_horses: 20,
            distances: RACE_DISTANCES.to_vec(),
            playback_padding_ms: 500,
            playback_scale: 1.0,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Reject configurations the store cannot run with
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.max_horses == 0 {
            return Err(RaceError::config("max_horses must be at least 1"));
        }
        if !self.playback_scale.is_finite() || self.playback_scale < 0.0 {
            return Err(RaceError::config(format!(
                "playback_scale must be a non-negative number, got {}",
                self.playback_scale
            )));
        }
        Ok(())
    }
}

/// Handle for a round whose playback is in flight.
///
/// Returned by `begin_round` and redeemed with `finish_round` once
/// `delay` has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTicket {
    epoch: u64,
    round_index: usize,
    /// How long the round plays out
    pub delay: Duration,
}

impl RoundTicket {
    pub fn round_index(&self) -> usize {
        self.round_index
    }
}

/// What `begin_round` did
#[derive(Debug, Clone, PartialEq)]
pub enum RoundStart {
    /// The round is playing; finish it after the ticket's delay
    Started(RoundTicket),
    /// No round left to run; the session is finished
    AllComplete,
}

/// Round summary for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub round: u32,
    pub distance: u32,
    pub total: u32,
}

/// Raw state plus every derived view, for handing to a UI in one piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub horses: Vec<Horse>,
    pub race_schedule: Vec<RaceRound>,
    pub current_round: usize,
    pub race_results: Vec<RaceResult>,
    pub is_racing: bool,
    pub race_status: RaceStatus,
    pub current_race_data: Option<RaceSnapshot>,
    pub completed_rounds: usize,
    pub total_rounds: usize,
    pub can_generate_schedule: bool,
    pub can_start_race: bool,
    pub can_advance_round: bool,
    pub is_complete: bool,
    pub current_round_info: Option<RoundInfo>,
}

/// Race lifecycle store
pub struct RaceStore {
    config: SessionConfig,
    rng: StdRng,
    horses: Vec<Horse>,
    race_schedule: Vec<RaceRound>,
    current_round: usize,
    race_results: Vec<RaceResult>,
    is_racing: bool,
    race_status: RaceStatus,
    current_race_data: Option<RaceSnapshot>,
    /// Bumped whenever in-flight rounds must be discarded
    epoch: u64,
}

impl RaceStore {
    /// Create an idle store with the default configuration
    pub fn new() -> Self {
        Self::build(SessionConfig::default())
    }

    /// Create an idle store with the given configuration
    pub fn with_config(config: SessionConfig) -> Result<Self, RaceError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng,
            horses: Vec::new(),
            race_schedule: Vec::new(),
            current_round: 0,
            race_results: Vec::new(),
            is_racing: false,
            race_status: RaceStatus::Idle,
            current_race_data: None,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_not_racing(&self, command: &str) -> Result<(), RaceError> {
        if self.is_racing {
            log::warn!("Rejected {} while round {} is playing", command, self.current_round + 1);
            return Err(RaceError::RaceInProgress);
        }
        Ok(())
    }

    fn ensure_roster(&self, command: &str) -> Result<(), RaceError> {
        if self.horses.is_empty() {
            log::warn!("Rejected {}: no horses generated", command);
            return Err(RaceError::EmptyRoster);
        }
        Ok(())
    }

    fn clear_race_data(&mut self) {
        self.race_schedule.clear();
        self.current_round = 0;
        self.race_results.clear();
        self.current_race_data = None;
    }

    /// Roll a fresh roster and make the session ready.
    ///
    /// Any schedule or results built for the previous roster are dropped.
    pub fn generate_horses(&mut self) -> Result<&[Horse], RaceError> {
        self.ensure_not_racing("generate_horses")?;

        self.horses = generate_roster(&mut self.rng, self.config.max_horses);
        self.clear_race_data();
        self.race_status = RaceStatus::Ready;
        self.epoch += 1;

        log::info!("Generated {} horses", self.horses.len());
        Ok(self.horses.as_slice())
    }

    /// Build one round per configured distance from the current roster
    pub fn generate_schedule(&mut self) -> Result<&[RaceRound], RaceError> {
        self.ensure_roster("generate_schedule")?;
        self.ensure_not_racing("generate_schedule")?;

        self.clear_race_data();
        self.race_schedule = build_schedule(&self.horses, &self.config.distances);
        self.race_status = RaceStatus::Ready;

        log::info!(
            "Scheduled {} rounds for {} horses",
            self.race_schedule.len(),
            self.horses.len()
        );
        Ok(self.race_schedule.as_slice())
    }

    /// Start the session from its first round.
    ///
    /// Builds the schedule when there is none, and starts over when rounds
    /// have already been played.
    pub fn start_race(&mut self) -> Result<RoundStart, RaceError> {
        self.ensure_roster("start_race")?;
        self.ensure_not_racing("start_race")?;

        if self.race_schedule.is_empty() || !self.race_results.is_empty() {
            self.generate_schedule()?;
        }

        log::info!("Race started");
        Ok(self.begin_round(0))
    }

    /// Run the round after `current_round`, or finish when none remain
    pub fn next_round(&mut self) -> Result<RoundStart, RaceError> {
        self.ensure_not_racing("next_round")?;
        self.ensure_roster("next_round")?;

        Ok(self.begin_round(self.current_round + 1))
    }

    /// Simulate round `index` and publish it as the current race.
    ///
    /// An index past the schedule completes the session instead.
    pub fn begin_round(&mut self, index: usize) -> RoundStart {
        let Some(round) = self.race_schedule.get(index) else {
            self.complete_all();
            return RoundStart::AllComplete;
        };

        let entries = simulate_round_with(&mut self.rng, &round.horses, round.distance);
        let snapshot = RaceSnapshot::new(round, entries);
        let delay = playback_delay(
            snapshot.max_duration,
            self.config.playback_padding_ms,
            self.config.playback_scale,
        );

        log::debug!(
            "Round {} ({}m): {} horses, playback {:?}",
            snapshot.round,
            snapshot.distance,
            snapshot.horses.len(),
            delay
        );

        self.current_round = index;
        self.current_race_data = Some(snapshot);
        self.is_racing = true;
        self.race_status = RaceStatus::Racing;

        RoundStart::Started(RoundTicket {
            epoch: self.epoch,
            round_index: index,
            delay,
        })
    }

    /// Record the result of a round whose playback has elapsed.
    ///
    /// Returns false when the ticket is stale (the session was reset or
    /// re-rolled meanwhile) and nothing was recorded.
    pub fn finish_round(&mut self, ticket: RoundTicket) -> bool {
        if ticket.epoch != self.epoch || !self.is_racing || ticket.round_index != self.current_round {
            log::debug!("Discarding stale result for round {}", ticket.round_index + 1);
            return false;
        }

        let Some(data) = &self.current_race_data else {
            return false;
        };
        let result = data.to_result();

        if let Some(winner) = result.results.first() {
            log::info!(
                "Round {} ({}m) won by {} in {:.2}s",
                result.round,
                result.distance,
                winner.horse.name,
                winner.finish_time
            );
        }

        self.race_results.push(result);
        self.is_racing = false;
        self.race_status = RaceStatus::RoundComplete;
        true
    }

    fn complete_all(&mut self) {
        self.race_status = RaceStatus::Finished;
        self.is_racing = false;
        log::info!("All {} rounds complete", self.race_results.len());
    }

    /// Back to the initial idle state; in-flight rounds are discarded
    pub fn reset(&mut self) {
        self.horses.clear();
        self.clear_race_data();
        self.is_racing = false;
        self.race_status = RaceStatus::Idle;
        self.epoch += 1;
        log::info!("Race reset");
    }

    pub fn horses(&self) -> &[Horse] {
        &self.horses
    }

    pub fn race_schedule(&self) -> &[RaceRound] {
        &self.race_schedule
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn race_results(&self) -> &[RaceResult] {
        &self.race_results
    }

    pub fn is_racing(&self) -> bool {
        self.is_racing
    }

    pub fn race_status(&self) -> RaceStatus {
        self.race_status
    }

    pub fn current_race_data(&self) -> Option<&RaceSnapshot> {
        self.current_race_data.as_ref()
    }

    pub fn available_horses(&self) -> &[Horse] {
        &self.horses
    }

    /// Sorted entries of the round on display, empty when none
    pub fn current_race_horses(&self) -> &[RaceEntry] {
        self.current_race_data
            .as_ref()
            .map(|data| data.horses.as_slice())
            .unwrap_or(&[])
    }

    pub fn completed_rounds(&self) -> usize {
        self.race_results.len()
    }

    pub fn total_rounds(&self) -> usize {
        self.race_schedule.len()
    }

    pub fn can_generate_schedule(&self) -> bool {
        !self.horses.is_empty() && !self.is_racing
    }

    pub fn can_start_race(&self) -> bool {
        !self.horses.is_empty()
            && !self.race_schedule.is_empty()
            && self.race_status == RaceStatus::Ready
            && !self.is_racing
    }

    pub fn can_advance_round(&self) -> bool {
        self.race_status == RaceStatus::RoundComplete
            && self.current_round + 1 < self.race_schedule.len()
    }

    pub fn is_complete(&self) -> bool {
        self.race_status == RaceStatus::Finished
    }

    pub fn current_round_info(&self) -> Option<RoundInfo> {
        self.current_race_data.as_ref().map(|data| RoundInfo {
            round: data.round,
            distance: data.distance,
            total: self.race_schedule.len() as u32,
        })
    }

    /// Get complete session snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            horses: self.horses.clone(),
            race_schedule: self.race_schedule.clone(),
            current_round: self.current_round,
            race_results: self.race_results.clone(),
            is_racing: self.is_racing,
            race_status: self.race_status,
            current_race_data: self.current_race_data.clone(),
            completed_rounds: self.completed_rounds(),
            total_rounds: self.total_rounds(),
            can_generate_schedule: self.can_generate_schedule(),
            can_start_race: self.can_start_race(),
            can_advance_round: self.can_advance_round(),
            is_complete: self.is_complete(),
            current_round_info: self.current_round_info(),
        }
    }
}

impl Default for RaceStore {
    fn default() -> Self {
        Self::new()
    }
}

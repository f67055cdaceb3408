//! Horse Race - Session engine
//!
//! Generates a horse roster, schedules rounds over increasing distances and
//! resolves them one at a time, accumulating results until the session ends.

pub mod game_server;

pub use game_server::color::{color_for_index, palette_of};
pub use game_server::race::{
    finish_time, format_duration, race_duration, random_condition, select_random,
    simulate_round, BASE_DURATION, RACE_DISTANCES,
};
pub use game_server::{
    Horse, RaceEntry, RaceError, RaceResult, RaceRound, RaceSession, RaceSnapshot, RaceStatus,
    RaceStore, RoundInfo, SessionConfig, SessionSnapshot,
};

/// Play a whole session: roll horses, run every round in order, and
/// return the final state.
pub async fn run_session(config: SessionConfig) -> Result<SessionSnapshot, RaceError> {
    let session = RaceSession::with_config(config)?;

    let horses = session.generate_horses().await?;
    for horse in &horses {
        log::debug!("{} ({}) condition {}", horse.name, horse.color, horse.condition);
    }

    let schedule = session.generate_schedule().await?;
    log::info!(
        "{} horses entered, {} rounds scheduled",
        horses.len(),
        schedule.len()
    );

    session.start_race().await?;
    while !session.read(|store| store.is_complete()).await {
        if let Some(info) = session.read(|store| store.current_round_info()).await {
            log::info!("Round {}/{} ({}m) complete", info.round, info.total, info.distance);
        }
        session.next_round().await?;
    }

    let snapshot = session.snapshot().await;
    for result in &snapshot.race_results {
        if let Some(winner) = result.results.first() {
            log::info!(
                "Round {} winner: {} in {}",
                result.round,
                winner.horse.name,
                format_duration(winner.finish_time)
            );
        }
    }
    Ok(snapshot)
}

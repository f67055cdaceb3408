//! Race - Round timing, schedule and result records
//!
//! Timing functions are pure apart from their random factor. Each one has a
//! `_with` variant taking an explicit RNG so seeded sessions are replayable.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game_server::horse::{Horse, RaceEntry};

/// Round distances in meters, one scheduled round each
pub const RACE_DISTANCES: [u32; 6] = [1200, 1400, 1600, 1800, 2000, 2200];

/// Playback seconds for a 1200m round at condition 100
pub const BASE_DURATION: f64 = 8.0;

/// Distance the base duration is calibrated against
const BASE_DISTANCE: f64 = 1200.0;

/// Highest condition a horse can roll
pub const MAX_CONDITION: u32 = 101;

/// One scheduled round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRound {
    /// Round number (1-based)
    pub round: u32,
    /// Distance in meters
    pub distance: u32,
    /// Roster snapshot taken when the schedule was built
    pub horses: Vec<Horse>,
}

/// Recorded outcome of a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub round: u32,
    pub distance: u32,
    /// Entries sorted by finish time, winner first
    pub results: Vec<RaceEntry>,
}

/// The round currently on display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub round: u32,
    pub distance: u32,
    /// Entries sorted by finish time, winner first
    pub horses: Vec<RaceEntry>,
    /// Slowest playback duration in the round (seconds)
    pub max_duration: f64,
}

impl RaceSnapshot {
    /// Build the display snapshot for a simulated round
    pub fn new(round: &RaceRound, horses: Vec<RaceEntry>) -> Self {
        let max_duration = max_duration(&horses);
        Self {
            round: round.round,
            distance: round.distance,
            horses,
            max_duration,
        }
    }

    /// Convert into the result record appended once playback ends
    pub fn to_result(&self) -> RaceResult {
        RaceResult {
            round: self.round,
            distance: self.distance,
            results: self.horses.clone(),
        }
    }

    /// Winning entry, if the round had any horses
    pub fn winner(&self) -> Option<&RaceEntry> {
        self.horses.first()
    }
}

/// Build one round per distance, each racing the full roster
pub fn build_schedule(horses: &[Horse], distances: &[u32]) -> Vec<RaceRound> {
    distances
        .iter()
        .enumerate()
        .map(|(i, &distance)| RaceRound {
            round: i as u32 + 1,
            distance,
            horses: horses.to_vec(),
        })
        .collect()
}

/// Uniform factor in [0.9, 1.1)
fn random_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    0.9 + rng.gen::<f64>() * 0.2
}

/// Playback duration in seconds for a horse over `distance` meters
pub fn race_duration_with<R: Rng + ?Sized>(rng: &mut R, condition: u32, distance: u32) -> f64 {
    let base = BASE_DURATION * (distance as f64 / BASE_DISTANCE);
    let condition_factor = 100.0 / condition as f64;

    base * condition_factor * random_factor(rng)
}

/// Playback duration in seconds, drawn from the thread RNG
pub fn race_duration(condition: u32, distance: u32) -> f64 {
    race_duration_with(&mut rand::thread_rng(), condition, distance)
}

/// Finish time in seconds for a horse over `distance` meters
pub fn finish_time_with<R: Rng + ?Sized>(rng: &mut R, condition: u32, distance: u32) -> f64 {
    let base = distance as f64 / 10.0;
    let condition_factor = 100.0 / condition as f64;

    base * condition_factor * random_factor(rng)
}

/// Finish time in seconds, drawn from the thread RNG
pub fn finish_time(condition: u32, distance: u32) -> f64 {
    finish_time_with(&mut rand::thread_rng(), condition, distance)
}

/// Simulate one round; entries come back sorted by finish time.
///
/// The sort is stable, so exact ties keep roster order.
pub fn simulate_round_with<R: Rng + ?Sized>(
    rng: &mut R,
    horses: &[Horse],
    distance: u32,
) -> Vec<RaceEntry> {
    let mut results: Vec<RaceEntry> = horses
        .iter()
        .map(|horse| {
            let finish = finish_time_with(rng, horse.condition, distance);
            let duration = race_duration_with(rng, horse.condition, distance);
            RaceEntry::new(horse, finish, duration)
        })
        .collect();

    results.sort_by(|a, b| a.finish_time.total_cmp(&b.finish_time));
    results
}

/// Simulate one round with the thread RNG
pub fn simulate_round(horses: &[Horse], distance: u32) -> Vec<RaceEntry> {
    simulate_round_with(&mut rand::thread_rng(), horses, distance)
}

/// Slowest playback duration among `entries`, 0 when empty
pub fn max_duration(entries: &[RaceEntry]) -> f64 {
    entries.iter().map(|e| e.duration).fold(0.0, f64::max)
}

/// How long a round plays out before its result is recorded.
///
/// `max_duration` seconds plus `padding_ms`, scaled by `scale`.
/// Saturates at `Duration::MAX`.
pub fn playback_delay(max_duration: f64, padding_ms: u64, scale: f64) -> Duration {
    let millis = (max_duration * 1000.0 + padding_ms as f64) * scale;
    Duration::try_from_secs_f64(millis.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

/// Format seconds for display: `45.67s` under a minute, `2:05.50` above.
pub fn format_duration(seconds: f64) -> String {
    let hundredths = (seconds * 100.0).round() as u64;
    let minutes = hundredths / 6000;
    let remainder = (hundredths % 6000) as f64 / 100.0;

    if minutes > 0 {
        format!("{}:{:05.2}", minutes, remainder)
    } else {
        format!("{:.2}s", remainder)
    }
}

/// Condition score uniform over [1, 101]
pub fn random_condition_with<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=MAX_CONDITION)
}

/// Condition score from the thread RNG
pub fn random_condition() -> u32 {
    random_condition_with(&mut rand::thread_rng())
}

/// Pick `min(count, horses.len())` horses at random without touching `horses`
pub fn select_random_with<R: Rng + ?Sized>(rng: &mut R, horses: &[Horse], count: usize) -> Vec<Horse> {
    let mut shuffled = horses.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count.min(horses.len()));
    shuffled
}

/// Random selection with the thread RNG
pub fn select_random(horses: &[Horse], count: usize) -> Vec<Horse> {
    select_random_with(&mut rand::thread_rng(), horses, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(n: u32) -> Vec<Horse> {
        (1..=n)
            .map(|id| Horse::new(id, format!("#{:06x}", id), 10 + id * 4))
            .collect()
    }

    #[test]
    fn test_timings_are_positive() {
        for condition in [1, 50, 101] {
            for distance in RACE_DISTANCES {
                assert!(race_duration(condition, distance) > 0.0);
                assert!(finish_time(condition, distance) > 0.0);
            }
        }
    }

    #[test]
    fn test_duration_grows_with_distance() {
        // 2200 / 1200 outweighs the widest noise ratio of 1.1 / 0.9
        for _ in 0..500 {
            assert!(race_duration(70, 1200) < race_duration(70, 2200));
        }
    }

    #[test]
    fn test_duration_shrinks_with_condition() {
        for _ in 0..500 {
            assert!(race_duration(40, 1600) > race_duration(90, 1600));
        }
    }

    #[test]
    fn test_duration_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let d = race_duration_with(&mut rng, 100, 1200);
            assert!((7.2..8.8).contains(&d), "duration {} out of range", d);

            let f = finish_time_with(&mut rng, 100, 1200);
            assert!((108.0..132.0).contains(&f), "finish time {} out of range", f);
        }
    }

    #[test]
    fn test_simulate_round_sorted_and_complete() {
        let horses = roster(12);
        let results = simulate_round(&horses, 1800);

        assert_eq!(results.len(), horses.len());
        for pair in results.windows(2) {
            assert!(pair[0].finish_time <= pair[1].finish_time);
        }
        assert!(results.iter().all(|e| e.finish_time > 0.0 && e.duration > 0.0));

        let ids: HashSet<u32> = results.iter().map(|e| e.horse.id).collect();
        assert_eq!(ids.len(), horses.len());
    }

    #[test]
    fn test_simulate_round_leaves_roster_untouched() {
        let horses = roster(5);
        let before = horses.clone();
        let _ = simulate_round(&horses, 1200);
        assert_eq!(horses, before);
    }

    #[test]
    fn test_simulate_empty_round() {
        assert!(simulate_round(&[], 1200).is_empty());
    }

    #[test]
    fn test_seeded_rounds_replay() {
        let horses = roster(8);
        let a = simulate_round_with(&mut StdRng::seed_from_u64(9), &horses, 2000);
        let b = simulate_round_with(&mut StdRng::seed_from_u64(9), &horses, 2000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0.00s");
        assert_eq!(format_duration(45.67), "45.67s");
        assert_eq!(format_duration(125.5), "2:05.50");
        assert_eq!(format_duration(60.0), "1:00.00");
        assert_eq!(format_duration(59.999), "1:00.00");
        assert_eq!(format_duration(3601.25), "60:01.25");
    }

    #[test]
    fn test_random_condition_range() {
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..20_000 {
            let c = random_condition();
            assert!((1..=MAX_CONDITION).contains(&c));
            seen_min |= c == 1;
            seen_max |= c == MAX_CONDITION;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_select_random_counts() {
        let horses = roster(6);
        assert_eq!(select_random(&horses, 3).len(), 3);
        assert_eq!(select_random(&horses, 6).len(), 6);
        assert_eq!(select_random(&horses, 10).len(), 6);
        assert!(select_random(&horses, 0).is_empty());
        assert!(select_random(&[], 4).is_empty());
    }

    #[test]
    fn test_select_random_does_not_mutate_input() {
        let horses = roster(10);
        let before = horses.clone();
        let picked = select_random(&horses, 4);

        assert_eq!(horses, before);
        let ids: HashSet<u32> = picked.iter().map(|h| h.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(picked.iter().all(|h| before.contains(h)));
    }

    #[test]
    fn test_build_schedule() {
        let horses = roster(3);
        let schedule = build_schedule(&horses, &RACE_DISTANCES);

        assert_eq!(schedule.len(), RACE_DISTANCES.len());
        for (i, round) in schedule.iter().enumerate() {
            assert_eq!(round.round, i as u32 + 1);
            assert_eq!(round.distance, RACE_DISTANCES[i]);
            assert_eq!(round.horses, horses);
        }
    }

    #[test]
    fn test_playback_delay() {
        assert_eq!(playback_delay(2.0, 500, 1.0), Duration::from_millis(2500));
        assert_eq!(playback_delay(2.0, 500, 0.0), Duration::ZERO);
        assert_eq!(playback_delay(0.0, 500, 2.0), Duration::from_millis(1000));
        assert_eq!(playback_delay(2.0, 500, 1e300), Duration::MAX);
        assert_eq!(playback_delay(f64::MAX, 500, 1.0), Duration::MAX);
    }

    #[test]
    fn test_snapshot_max_duration_and_result() {
        let horses = roster(4);
        let round = &build_schedule(&horses, &[1400])[0];
        let entries = simulate_round(&round.horses, round.distance);
        let slowest = entries.iter().map(|e| e.duration).fold(0.0, f64::max);

        let snapshot = RaceSnapshot::new(round, entries);
        assert_eq!(snapshot.max_duration, slowest);
        assert_eq!(snapshot.winner(), snapshot.horses.first());

        let result = snapshot.to_result();
        assert_eq!(result.round, 1);
        assert_eq!(result.distance, 1400);
        assert_eq!(result.results, snapshot.horses);
    }
}

//! Horse - Roster records and per-round race entries
//!
//! Horses are generated in bulk for a session and never change afterwards.
//! Each round derives `RaceEntry` copies that carry that round's timings.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game_server::color::palette_of;
use crate::game_server::race::random_condition_with;

/// A horse in the session roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    /// Unique horse ID (1-based, stable for the session)
    pub id: u32,
    /// Display name
    pub name: String,
    /// Hex color (`#rrggbb`)
    pub color: String,
    /// Fitness score in [1, 101]; lower is slower
    pub condition: u32,
}

impl Horse {
    /// Create a horse with the default `Horse #{id}` name
    pub fn new(id: u32, color: String, condition: u32) -> Self {
        Self {
            id,
            name: format!("Horse #{}", id),
            color,
            condition,
        }
    }
}

/// A horse's outcome in one round: a copy of the horse plus its timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEntry {
    /// Copy of the roster horse
    #[serde(flatten)]
    pub horse: Horse,
    /// Finish time in seconds; ranks the round
    pub finish_time: f64,
    /// Playback duration in seconds; paces the round delay
    pub duration: f64,
}

impl RaceEntry {
    /// Create an entry carrying a copy of `horse`
    pub fn new(horse: &Horse, finish_time: f64, duration: f64) -> Self {
        Self {
            horse: horse.clone(),
            finish_time,
            duration,
        }
    }
}

/// Roll a roster of between 1 and `max_horses` horses.
///
/// Ids run 1..=N, colors come from a palette sized to the roster and
/// conditions are drawn independently per horse.
pub fn generate_roster<R: Rng + ?Sized>(rng: &mut R, max_horses: u32) -> Vec<Horse> {
    let count = rng.gen_range(1..=max_horses.max(1));
    let colors = palette_of(count as usize);

    colors
        .into_iter()
        .enumerate()
        .map(|(i, color)| Horse::new(i as u32 + 1, color, random_condition_with(rng)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_horse_name_follows_id() {
        let horse = Horse::new(7, "#000000".to_string(), 50);
        assert_eq!(horse.name, "Horse #7");
    }

    #[test]
    fn test_roster_size_and_ids() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let roster = generate_roster(&mut rng, 20);
            assert!((1..=20).contains(&roster.len()));

            let ids: Vec<u32> = roster.iter().map(|h| h.id).collect();
            let expected: Vec<u32> = (1..=roster.len() as u32).collect();
            assert_eq!(ids, expected);

            let colors: HashSet<_> = roster.iter().map(|h| h.color.as_str()).collect();
            assert_eq!(colors.len(), roster.len());

            assert!(roster.iter().all(|h| (1..=101).contains(&h.condition)));
        }
    }

    #[test]
    fn test_roster_of_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let roster = generate_roster(&mut rng, 1);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, 1);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let horse = Horse::new(1, "#bd2828".to_string(), 80);
        let entry = RaceEntry::new(&horse, 12.5, 8.0);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "Horse #1");
        assert_eq!(value["finish_time"], 12.5);
        assert_eq!(value["duration"], 8.0);
    }
}

//! Leaderboards derived from finished matches.
//!
//! Only matches with a winner count. Ties are broken by ascending player id,
//! so the same match set always yields the same ranking.

use crate::{Match, MatchStatus, PlayerId};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Number of entries a leaderboard returns.
pub const LEADERBOARD_SIZE: usize = 3;

/// Wins recorded for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters, new)]
pub struct WinCount {
    player_id: PlayerId,
    win_count: u32,
}

/// Average move count across one player's wins. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Getters, new)]
pub struct Efficiency {
    player_id: PlayerId,
    efficiency: f64,
}

/// Move counts of every won match, grouped by winner in id order.
fn wins_by_player(matches: &[Match]) -> BTreeMap<PlayerId, Vec<u8>> {
    let mut grouped: BTreeMap<PlayerId, Vec<u8>> = BTreeMap::new();
    for game in matches {
        if let (MatchStatus::Finished, Some(winner)) = (game.status(), game.winner_id()) {
            grouped.entry(*winner).or_default().push(*game.move_count());
        }
    }
    grouped
}

/// Top players by number of wins, most wins first.
///
/// Players without a win never appear.
#[instrument(skip(matches), fields(match_count = matches.len()))]
pub fn leaderboard_by_wins(matches: &[Match]) -> Vec<WinCount> {
    let mut ranked: Vec<WinCount> = wins_by_player(matches)
        .into_iter()
        .map(|(player_id, wins)| WinCount::new(player_id, wins.len() as u32))
        .collect();

    // Stable sort keeps ascending id among equal counts.
    ranked.sort_by(|a, b| b.win_count.cmp(&a.win_count));
    ranked.truncate(LEADERBOARD_SIZE);

    debug!(entries = ranked.len(), "Wins leaderboard computed");
    ranked
}

/// Top players by average moves per win, fewest moves first.
///
/// Draws contribute to no one's figure.
#[instrument(skip(matches), fields(match_count = matches.len()))]
pub fn leaderboard_by_efficiency(matches: &[Match]) -> Vec<Efficiency> {
    let mut ranked: Vec<Efficiency> = wins_by_player(matches)
        .into_iter()
        .map(|(player_id, move_counts)| {
            let total: u32 = move_counts.iter().map(|count| u32::from(*count)).sum();
            Efficiency::new(player_id, f64::from(total) / move_counts.len() as f64)
        })
        .collect();

    ranked.sort_by(|a, b| a.efficiency.total_cmp(&b.efficiency));
    ranked.truncate(LEADERBOARD_SIZE);

    debug!(entries = ranked.len(), "Efficiency leaderboard computed");
    ranked
}

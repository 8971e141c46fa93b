//! Standings: sort players and assign display ranks with ties.

use crate::logic::points::format_points;
use crate::models::Player;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A player with their place in the standings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedPlayer {
    /// Shared by players with equal points; the next distinct total skips down (1, 2, 2, 4).
    pub rank: usize,
    /// True when another player anywhere in the standings has the same points.
    pub tied: bool,
    /// e.g. `"2nd"` or `"T2nd"`.
    pub rank_label: String,
    /// Points formatted for display.
    pub points: String,
    pub player: Player,
}

impl Serialize for RankedPlayer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RankedPlayer", 6)?;
        s.serialize_field("rank", &self.rank)?;
        s.serialize_field("tied", &self.tied)?;
        s.serialize_field("rank_label", &self.rank_label)?;
        s.serialize_field("name", &self.player.name)?;
        s.serialize_field("points", &self.points)?;
        s.serialize_field("results", &self.player.results)?;
        s.end()
    }
}

/// Standings order: most points first, then name case-insensitively, then exact name.
pub fn compare_players(a: &Player, b: &Player) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort players into standings order.
pub fn sort_players(players: &mut [Player]) {
    players.sort_by(compare_players);
}

/// Sort and rank players. Read-only with respect to the store.
pub fn rank_players(mut players: Vec<Player>) -> Vec<RankedPlayer> {
    sort_players(&mut players);

    let mut point_counts: HashMap<Decimal, usize> = HashMap::new();
    for p in &players {
        *point_counts.entry(p.points).or_default() += 1;
    }

    let mut rank = 0;
    let mut previous: Option<Decimal> = None;
    players
        .into_iter()
        .enumerate()
        .map(|(index, player)| {
            if previous != Some(player.points) {
                rank = index + 1;
            }
            previous = Some(player.points);
            let tied = point_counts.get(&player.points).copied().unwrap_or(0) > 1;
            RankedPlayer {
                rank,
                tied,
                rank_label: rank_label(rank, tied),
                points: format_points(player.points),
                player,
            }
        })
        .collect()
}

/// Ordinal text with a `T` prefix for shared ranks.
pub fn rank_label(rank: usize, tied: bool) -> String {
    if tied {
        format!("T{}", ordinal(rank))
    } else {
        ordinal(rank)
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, 111th.
pub fn ordinal(n: usize) -> String {
    let suffix = if (10..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (10, "10th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (20, "20th"),
            (21, "21st"),
            (22, "22nd"),
            (101, "101st"),
            (111, "111th"),
            (112, "112th"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal(n), expected);
        }
    }

    #[test]
    fn tie_labels() {
        assert_eq!(rank_label(2, true), "T2nd");
        assert_eq!(rank_label(2, false), "2nd");
    }
}

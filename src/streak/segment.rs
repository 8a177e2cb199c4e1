//! Move classification and streak segmentation

use rust_decimal::Decimal;

use super::types::{Direction, Streak};

/// Classify each adjacent pair of closes, yielding `closes.len() - 1` moves
pub fn classify_moves(closes: &[Decimal]) -> Vec<Direction> {
    closes
        .windows(2)
        .map(|pair| Direction::between(pair[0], pair[1]))
        .collect()
}

/// Split moves into maximal runs in a single left-to-right pass.
///
/// The returned streaks partition `moves`: they are contiguous, non-overlapping
/// and their lengths sum to `moves.len()`. The last element is the streak still
/// open at the most recent close.
pub fn segment(moves: &[Direction]) -> Vec<Streak> {
    let mut streaks: Vec<Streak> = Vec::new();

    for (index, &direction) in moves.iter().enumerate() {
        match streaks.last_mut() {
            Some(open) if open.direction == direction => {
                open.length += 1;
                open.end = index;
            }
            _ => streaks.push(Streak {
                direction,
                length: 1,
                start: index,
                end: index,
            }),
        }
    }

    streaks
}

//! Pure hand geometry helpers.

use crate::types::{Direction, Hand, Vector3};

/// Number of pointables flagged as extended.
pub fn extended_finger_count(hand: &Hand) -> usize {
    hand.pointables.iter().filter(|p| p.extended).count()
}

/// The open "control" pose: at least `min_fingers` extended.
pub fn is_open(hand: &Hand, min_fingers: usize) -> bool {
    extended_finger_count(hand) >= min_fingers
}

/// Absolute vertical travel from `a` to `b`.
pub fn vertical_displacement(a: Vector3, b: Vector3) -> f64 {
    (b.y - a.y).abs()
}

/// `Positive` when `current` exceeds `previous`, otherwise `Negative`.
///
/// A zero delta resolves to `Negative`.
// TODO: return Option<Direction> so a zero delta carries no direction, once
// recorded sessions no longer rely on the current behaviour.
pub fn direction_sign(current: f64, previous: f64) -> Direction {
    if current - previous > 0.0 {
        Direction::Positive
    } else {
        Direction::Negative
    }
}

//! Hand-built fixtures shared by the unit tests.

use crate::types::{
    FingerType, Frame, Gesture, GestureKind, GestureState, Hand, Pointable, Vector3,
};

const FINGERS: [FingerType; 5] = [
    FingerType::Thumb,
    FingerType::Index,
    FingerType::Middle,
    FingerType::Ring,
    FingerType::Pinky,
];

/// A hand with the given palm, thumb-tip and middle-tip heights and the
/// first `extended` fingers (thumb first) extended.
pub fn hand(palm_y: f64, thumb_y: f64, middle_y: f64, extended: usize) -> Hand {
    let pointables: Vec<Pointable> = FINGERS
        .iter()
        .enumerate()
        .map(|(i, &finger)| {
            let tip_y = match finger {
                FingerType::Thumb => thumb_y,
                FingerType::Middle => middle_y,
                _ => palm_y + 60.0,
            };
            Pointable {
                extended: i < extended,
                tip_position: Vector3::new(i as f64 * 20.0, tip_y, -10.0),
                direction: Vector3::new(0.0, 0.0, -1.0),
                finger: Some(finger),
            }
        })
        .collect();

    Hand {
        palm_position: Vector3::new(0.0, palm_y, 0.0),
        direction: Vector3::new(0.0, 0.0, -1.0),
        thumb: Some(pointables[0].clone()),
        middle_finger: Some(pointables[2].clone()),
        pinky: Some(pointables[4].clone()),
        pointables,
    }
}

/// An open hand with every landmark at the same height offsets.
pub fn open_hand(palm_y: f64) -> Hand {
    hand(palm_y, palm_y + 30.0, palm_y + 80.0, 5)
}

pub fn circle(state: GestureState, radius: f64, normal_z: f64) -> Gesture {
    Gesture {
        kind: GestureKind::Circle,
        state,
        radius,
        normal: Vector3::new(0.0, 0.0, normal_z),
    }
}

/// A finished clockwise circle big enough to count.
pub fn clockwise() -> Gesture {
    circle(GestureState::Stop, 50.0, -1.0)
}

/// A finished counter-clockwise circle big enough to count.
pub fn counter_clockwise() -> Gesture {
    circle(GestureState::Stop, 50.0, 1.0)
}

pub fn frame(hands: Vec<Hand>, gestures: Vec<Gesture>) -> Frame {
    Frame {
        id: 0,
        timestamp_us: 0,
        hands,
        gestures,
    }
}

//! Takeoff/land state machine driven by circle gestures.
//!
//! A clockwise circle (seen from above the sensor, normal pointing down)
//! arms the vehicle and, once repeated `takeoff_confirmations` times, takes
//! off. A counter-clockwise circle lands. Landing needs fewer confirmations
//! than takeoff so it stays reachable in a hurry.

use crate::config::PilotConfig;
use crate::types::{Command, FlightState, Gesture, GestureKind, GestureState};

/// Rotation sense of a qualifying circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Returns the rotation of `gesture` if it is a finished circle of at least
/// `min_radius`. Circles with a horizontal normal have no rotation.
pub fn recognize(gesture: &Gesture, min_radius: f64) -> Option<Rotation> {
    if gesture.kind != GestureKind::Circle
        || gesture.state != GestureState::Stop
        || gesture.radius < min_radius
    {
        return None;
    }
    if gesture.normal.z < 0.0 {
        Some(Rotation::Clockwise)
    } else if gesture.normal.z > 0.0 {
        Some(Rotation::CounterClockwise)
    } else {
        None
    }
}

/// Advance the flight state by one (optional) gesture.
///
/// Returns the next state and the command to emit, if any. The caller owns
/// the state and decides when to commit it.
pub fn transition(
    state: FlightState,
    gesture: Option<&Gesture>,
    config: &PilotConfig,
) -> (FlightState, Option<Command>) {
    let rotation = match gesture.and_then(|g| recognize(g, config.min_radius)) {
        Some(r) => r,
        None => return (state, None),
    };

    match (rotation, state) {
        (Rotation::Clockwise, FlightState::Landed) => arm(0, config),
        (Rotation::Clockwise, FlightState::TakeoffConfirming { seen }) => arm(seen, config),

        // Not airborne: a landing request just disarms.
        (Rotation::CounterClockwise, FlightState::Landed)
        | (Rotation::CounterClockwise, FlightState::TakeoffConfirming { .. }) => {
            (FlightState::Landed, Some(Command::Land))
        }

        (Rotation::CounterClockwise, FlightState::Flying) => disarm(0, config),
        (Rotation::CounterClockwise, FlightState::LandConfirming { seen }) => {
            disarm(seen, config)
        }

        (Rotation::Clockwise, FlightState::Flying)
        | (Rotation::Clockwise, FlightState::LandConfirming { .. }) => (state, None),
    }
}

fn arm(seen: u32, config: &PilotConfig) -> (FlightState, Option<Command>) {
    let seen = seen.saturating_add(1);
    if seen >= config.takeoff_confirmations {
        (FlightState::Flying, Some(Command::Takeoff))
    } else {
        (FlightState::TakeoffConfirming { seen }, None)
    }
}

fn disarm(seen: u32, config: &PilotConfig) -> (FlightState, Option<Command>) {
    let seen = seen.saturating_add(1);
    if seen >= config.land_confirmations {
        (FlightState::Landed, Some(Command::Land))
    } else {
        (FlightState::LandConfirming { seen }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{circle, clockwise, counter_clockwise};
    use crate::types::Vector3;

    fn run(state: FlightState, gestures: &[Gesture], cfg: &PilotConfig) -> (FlightState, Vec<Command>) {
        let mut state = state;
        let mut emitted = Vec::new();
        for g in gestures {
            let (next, cmd) = transition(state, Some(g), cfg);
            state = next;
            emitted.extend(cmd);
        }
        (state, emitted)
    }

    #[test]
    fn single_clockwise_only_arms() {
        let cfg = PilotConfig::default();
        let (state, cmd) = transition(FlightState::Landed, Some(&clockwise()), &cfg);
        assert_eq!(state, FlightState::TakeoffConfirming { seen: 1 });
        assert_eq!(cmd, None);
    }

    #[test]
    fn two_clockwise_take_off_once() {
        let cfg = PilotConfig::default();
        let (state, emitted) = run(FlightState::Landed, &[clockwise(), clockwise()], &cfg);
        assert_eq!(state, FlightState::Flying);
        assert_eq!(emitted, vec![Command::Takeoff]);

        // Further clockwise circles while flying do nothing.
        let (state, emitted) = run(state, &[clockwise(), clockwise()], &cfg);
        assert_eq!(state, FlightState::Flying);
        assert!(emitted.is_empty());
    }

    #[test]
    fn one_counter_clockwise_lands() {
        let cfg = PilotConfig::default();
        let (state, cmd) = transition(FlightState::Flying, Some(&counter_clockwise()), &cfg);
        assert_eq!(state, FlightState::Landed);
        assert_eq!(cmd, Some(Command::Land));
    }

    #[test]
    fn counter_clockwise_while_arming_cancels() {
        let cfg = PilotConfig::default();
        let (state, emitted) = run(
            FlightState::Landed,
            &[clockwise(), counter_clockwise(), clockwise()],
            &cfg,
        );
        assert_eq!(emitted, vec![Command::Land]);
        assert_eq!(state, FlightState::TakeoffConfirming { seen: 1 });
    }

    #[test]
    fn counter_clockwise_while_landed_still_lands() {
        let cfg = PilotConfig::default();
        let (state, cmd) = transition(FlightState::Landed, Some(&counter_clockwise()), &cfg);
        assert_eq!(state, FlightState::Landed);
        assert_eq!(cmd, Some(Command::Land));
    }

    #[test]
    fn unfinished_or_small_circles_ignored() {
        let cfg = PilotConfig::default();
        let ignored = [
            circle(GestureState::Start, 80.0, -1.0),
            circle(GestureState::Update, 80.0, -1.0),
            circle(GestureState::Stop, 39.9, -1.0),
            circle(GestureState::Stop, 10.0, 1.0),
            circle(GestureState::Stop, 80.0, 0.0),
        ];
        for state in [
            FlightState::Landed,
            FlightState::TakeoffConfirming { seen: 1 },
            FlightState::Flying,
            FlightState::LandConfirming { seen: 1 },
        ] {
            for g in &ignored {
                assert_eq!(transition(state, Some(g), &cfg), (state, None));
            }
        }
    }

    #[test]
    fn radius_at_minimum_counts() {
        let cfg = PilotConfig::default();
        let g = circle(GestureState::Stop, cfg.min_radius, -0.5);
        assert_eq!(recognize(&g, cfg.min_radius), Some(Rotation::Clockwise));
    }

    #[test]
    fn other_gesture_kinds_ignored() {
        let cfg = PilotConfig::default();
        let tap = Gesture {
            kind: GestureKind::KeyTap,
            state: GestureState::Stop,
            radius: 100.0,
            normal: Vector3::new(0.0, 0.0, -1.0),
        };
        assert_eq!(
            transition(FlightState::Landed, Some(&tap), &cfg),
            (FlightState::Landed, None)
        );
    }

    #[test]
    fn missing_gesture_keeps_confirmation() {
        let cfg = PilotConfig::default();
        let arming = FlightState::TakeoffConfirming { seen: 1 };
        assert_eq!(transition(arming, None, &cfg), (arming, None));
        let (state, cmd) = transition(arming, Some(&clockwise()), &cfg);
        assert_eq!(state, FlightState::Flying);
        assert_eq!(cmd, Some(Command::Takeoff));
    }

    #[test]
    fn single_confirmation_takes_off_immediately() {
        let cfg = PilotConfig {
            takeoff_confirmations: 1,
            ..PilotConfig::default()
        };
        let (state, cmd) = transition(FlightState::Landed, Some(&clockwise()), &cfg);
        assert_eq!(state, FlightState::Flying);
        assert_eq!(cmd, Some(Command::Takeoff));
    }

    #[test]
    fn two_confirmation_landing() {
        let cfg = PilotConfig {
            land_confirmations: 2,
            ..PilotConfig::default()
        };
        let (state, cmd) = transition(FlightState::Flying, Some(&counter_clockwise()), &cfg);
        assert_eq!(state, FlightState::LandConfirming { seen: 1 });
        assert_eq!(cmd, None);

        // Clockwise does not reset the landing count.
        let (state, cmd) = transition(state, Some(&clockwise()), &cfg);
        assert_eq!(state, FlightState::LandConfirming { seen: 1 });
        assert_eq!(cmd, None);

        let (state, cmd) = transition(state, Some(&counter_clockwise()), &cfg);
        assert_eq!(state, FlightState::Landed);
        assert_eq!(cmd, Some(Command::Land));
    }
}

//! Velocity commands from frame-to-frame hand movement.
//!
//! Only an open hand steers, and only while flying. Palm height drives
//! vertical motion and preempts everything else. Otherwise the thumb tip
//! steers laterally and the middle fingertip longitudinally. Anything
//! ambiguous resolves to `Hover`.

use crate::config::PilotConfig;
use crate::metrics::{direction_sign, is_open, vertical_displacement};
use crate::types::{Axis, Command, FlightState, Hand, Pointable};
use crate::{PilotError, Result};

bitflags::bitflags! {
    /// Axes whose landmark moved past its threshold between two frames.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Axes: u8 {
        const VERTICAL     = 1 << 0;
        const LATERAL      = 1 << 1;
        const LONGITUDINAL = 1 << 2;
    }
}

/// Vertical travel of the tracked landmarks between two hands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub palm: f64,
    pub thumb: f64,
    pub middle: f64,
}

impl Displacement {
    /// Axes over threshold, with vertical taking priority over the others.
    pub fn triggered(&self, config: &PilotConfig) -> Axes {
        if self.palm >= config.up_down_threshold {
            return Axes::VERTICAL;
        }
        let mut axes = Axes::empty();
        if self.thumb >= config.direction_threshold {
            axes |= Axes::LATERAL;
        }
        if self.middle >= config.direction_threshold {
            axes |= Axes::LONGITUDINAL;
        }
        if !config.allow_diagonal_motion && axes.contains(Axes::LATERAL | Axes::LONGITUDINAL) {
            axes.remove(Axes::LONGITUDINAL);
        }
        axes
    }
}

/// Measure landmark travel from `previous` to `current`.
///
/// Fails when either hand lacks the thumb or middle finger.
pub fn measure(previous: &Hand, current: &Hand) -> Result<Displacement> {
    let (prev_thumb, cur_thumb) = landmark_pair(previous, current, |h| &h.thumb, "thumb")?;
    let (prev_middle, cur_middle) =
        landmark_pair(previous, current, |h| &h.middle_finger, "middleFinger")?;

    Ok(Displacement {
        palm: vertical_displacement(previous.palm_position, current.palm_position),
        thumb: vertical_displacement(prev_thumb.tip_position, cur_thumb.tip_position),
        middle: vertical_displacement(prev_middle.tip_position, cur_middle.tip_position),
    })
}

/// Commands for this tick. Never empty: when nothing else applies the
/// result is `[Hover]`.
pub fn derive(
    state: FlightState,
    previous: Option<&Hand>,
    current: Option<&Hand>,
    config: &PilotConfig,
) -> Result<Vec<Command>> {
    let current = match current {
        Some(hand) if state.is_flying() && is_open(hand, config.min_fingers) => hand,
        _ => return Ok(vec![Command::Hover]),
    };
    let previous = match previous {
        Some(hand) => hand,
        None => return Ok(vec![Command::Hover]),
    };

    let displacement = measure(previous, current)?;
    let axes = displacement.triggered(config);
    log::trace!("displacement {:?} -> {:?}", displacement, axes);

    if axes.is_empty() {
        return Ok(vec![Command::Hover]);
    }

    let mut commands = Vec::with_capacity(2);
    if axes.contains(Axes::VERTICAL) {
        commands.push(Command::Move {
            axis: Axis::Vertical,
            direction: direction_sign(current.palm_position.y, previous.palm_position.y),
            speed: config.up_down_speed,
        });
    }
    if axes.contains(Axes::LATERAL) {
        let (prev, cur) = landmark_pair(previous, current, |h| &h.thumb, "thumb")?;
        commands.push(Command::Move {
            axis: Axis::Lateral,
            direction: direction_sign(cur.tip_position.y, prev.tip_position.y),
            speed: config.move_speed,
        });
    }
    if axes.contains(Axes::LONGITUDINAL) {
        let (prev, cur) = landmark_pair(previous, current, |h| &h.middle_finger, "middleFinger")?;
        // Dipping the middle finger drives forward.
        commands.push(Command::Move {
            axis: Axis::Longitudinal,
            direction: direction_sign(prev.tip_position.y, cur.tip_position.y),
            speed: config.move_speed,
        });
    }
    Ok(commands)
}

fn landmark_pair<'a>(
    previous: &'a Hand,
    current: &'a Hand,
    field: impl Fn(&Hand) -> &Option<Pointable>,
    name: &str,
) -> Result<(&'a Pointable, &'a Pointable)> {
    let prev = field(previous)
        .as_ref()
        .ok_or_else(|| PilotError::missing(format!("previous hand {}", name)))?;
    let cur = field(current)
        .as_ref()
        .ok_or_else(|| PilotError::missing(format!("current hand {}", name)))?;
    Ok((prev, cur))
}

//! Pilot tuning: gesture thresholds, speeds and confirmation counts.

use crate::{PilotError, Result};

/// Thresholds and speeds injected into the pilot at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotConfig {
    /// Minimum circle radius (mm) for a takeoff/land gesture.
    pub min_radius: f64,
    /// Extended fingers required for the open "control" pose.
    pub min_fingers: usize,
    /// Palm rise/fall (mm per frame) that triggers vertical motion.
    pub up_down_threshold: f64,
    /// Thumb/middle-tip rise/fall (mm per frame) that triggers lateral or
    /// longitudinal motion.
    pub direction_threshold: f64,
    pub up_down_speed: f64,
    pub move_speed: f64,
    /// Clockwise circles needed to take off.
    pub takeoff_confirmations: u32,
    /// Counter-clockwise circles needed to land while airborne.
    pub land_confirmations: u32,
    /// Emit lateral and longitudinal commands from the same frame pair.
    pub allow_diagonal_motion: bool,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            min_radius: 40.0,
            min_fingers: 5,
            up_down_threshold: 2.0,
            direction_threshold: 3.0,
            up_down_speed: 0.2,
            move_speed: 0.2,
            takeoff_confirmations: 2,
            land_confirmations: 1,
            allow_diagonal_motion: true,
        }
    }
}

impl PilotConfig {
    /// Defaults overridden by `HANDPILOT_*` environment variables.
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_radius: read_env_f64("HANDPILOT_MIN_RADIUS", d.min_radius),
            min_fingers: read_env_parsed("HANDPILOT_MIN_FINGERS", d.min_fingers),
            up_down_threshold: read_env_f64("HANDPILOT_UP_DOWN_THRESHOLD", d.up_down_threshold),
            direction_threshold: read_env_f64(
                "HANDPILOT_DIRECTION_THRESHOLD",
                d.direction_threshold,
            ),
            up_down_speed: read_env_f64("HANDPILOT_UP_DOWN_SPEED", d.up_down_speed),
            move_speed: read_env_f64("HANDPILOT_MOVE_SPEED", d.move_speed),
            takeoff_confirmations: read_env_parsed(
                "HANDPILOT_TAKEOFF_CONFIRMATIONS",
                d.takeoff_confirmations,
            ),
            land_confirmations: read_env_parsed(
                "HANDPILOT_LAND_CONFIRMATIONS",
                d.land_confirmations,
            ),
            allow_diagonal_motion: read_env_bool(
                "HANDPILOT_ALLOW_DIAGONAL",
                d.allow_diagonal_motion,
            ),
        }
    }

    /// Reject settings the pilot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.takeoff_confirmations == 0 {
            return Err(PilotError::InvalidConfig(
                "takeoff_confirmations must be at least 1".into(),
            ));
        }
        if self.land_confirmations == 0 {
            return Err(PilotError::InvalidConfig(
                "land_confirmations must be at least 1".into(),
            ));
        }
        let non_negative = [
            ("min_radius", self.min_radius),
            ("up_down_threshold", self.up_down_threshold),
            ("direction_threshold", self.direction_threshold),
            ("up_down_speed", self.up_down_speed),
            ("move_speed", self.move_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PilotError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn read_env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| {
            let v = v.trim().to_ascii_lowercase();
            match v.as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => {
                    log::warn!("Ignoring {}='{}' (expected a boolean)", name, v);
                    None
                }
            }
        })
        .unwrap_or(default)
}

fn read_env_f64(name: &str, default: f64) -> f64 {
    read_env_parsed(name, default)
}

fn read_env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                log::warn!("Ignoring unparseable {}='{}'", name, v);
                None
            }
        })
        .unwrap_or(default)
}

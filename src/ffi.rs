//! C FFI layer for handpilot.
//!
//! Hosts that read the tracker through its C SDK serialize each frame to the
//! service JSON shape and push it here; the commands for that frame come
//! back in a caller-provided array. The generated C header is written to
//! `include/handpilot.h` by cbindgen.

use crate::config::PilotConfig;
use crate::dispatcher::Dispatcher;
use crate::error::LastError;
use crate::protocol;
use crate::sink::RecordingSink;
use crate::types::{Axis, Command, Direction, FlightState};
use crate::PilotError;
use std::ffi::{c_char, c_int, CStr};

thread_local! {
    /// Per-thread last error message for C consumers.
    static LAST_ERROR: LastError = const { LastError::new() };
}

fn set_last_error(err: &PilotError) {
    LAST_ERROR.with(|last| last.set(err));
}

/// Opaque pilot handle for C consumers.
pub struct HpPilot(Dispatcher<RecordingSink>);

/// Pilot tuning in C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HpConfig {
    pub min_radius: f64,
    pub min_fingers: u32,
    pub up_down_threshold: f64,
    pub direction_threshold: f64,
    pub up_down_speed: f64,
    pub move_speed: f64,
    pub takeoff_confirmations: u32,
    pub land_confirmations: u32,
    pub allow_diagonal_motion: bool,
}

impl From<&PilotConfig> for HpConfig {
    fn from(c: &PilotConfig) -> Self {
        HpConfig {
            min_radius: c.min_radius,
            min_fingers: c.min_fingers as u32,
            up_down_threshold: c.up_down_threshold,
            direction_threshold: c.direction_threshold,
            up_down_speed: c.up_down_speed,
            move_speed: c.move_speed,
            takeoff_confirmations: c.takeoff_confirmations,
            land_confirmations: c.land_confirmations,
            allow_diagonal_motion: c.allow_diagonal_motion,
        }
    }
}

impl From<&HpConfig> for PilotConfig {
    fn from(c: &HpConfig) -> Self {
        PilotConfig {
            min_radius: c.min_radius,
            min_fingers: c.min_fingers as usize,
            up_down_threshold: c.up_down_threshold,
            direction_threshold: c.direction_threshold,
            up_down_speed: c.up_down_speed,
            move_speed: c.move_speed,
            takeoff_confirmations: c.takeoff_confirmations,
            land_confirmations: c.land_confirmations,
            allow_diagonal_motion: c.allow_diagonal_motion,
        }
    }
}

/// Command kind.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpCommandKind {
    Takeoff = 0,
    Land = 1,
    Hover = 2,
    Move = 3,
}

/// A command in C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HpCommand {
    pub kind: HpCommandKind,
    /// 0 = vertical, 1 = lateral, 2 = longitudinal; -1 unless `kind` is Move.
    pub axis: c_int,
    /// +1 or -1 for Move, otherwise 0.
    pub direction: c_int,
    /// Speed for Move, otherwise 0.
    pub speed: f64,
}

impl From<&Command> for HpCommand {
    fn from(cmd: &Command) -> Self {
        let fixed = |kind| HpCommand {
            kind,
            axis: -1,
            direction: 0,
            speed: 0.0,
        };
        match *cmd {
            Command::Takeoff => fixed(HpCommandKind::Takeoff),
            Command::Land => fixed(HpCommandKind::Land),
            Command::Hover => fixed(HpCommandKind::Hover),
            Command::Move {
                axis,
                direction,
                speed,
            } => HpCommand {
                kind: HpCommandKind::Move,
                axis: match axis {
                    Axis::Vertical => 0,
                    Axis::Lateral => 1,
                    Axis::Longitudinal => 2,
                },
                direction: match direction {
                    Direction::Positive => 1,
                    Direction::Negative => -1,
                },
                speed,
            },
        }
    }
}

/// Default tuning.
#[no_mangle]
pub extern "C" fn hp_config_default() -> HpConfig {
    HpConfig::from(&PilotConfig::default())
}

/// Create a pilot. `config` may be null for defaults.
/// Returns NULL on error (check hp_last_error()).
///
/// # Safety
/// `config` must point to a valid `HpConfig`, or be null.
#[no_mangle]
pub unsafe extern "C" fn hp_pilot_new(config: *const HpConfig) -> *mut HpPilot {
    let config = if config.is_null() {
        PilotConfig::default()
    } else {
        PilotConfig::from(&*config)
    };

    match Dispatcher::new(config, RecordingSink::new()) {
        Ok(dispatcher) => Box::into_raw(Box::new(HpPilot(dispatcher))),
        Err(e) => {
            set_last_error(&e);
            std::ptr::null_mut()
        }
    }
}

/// Free a pilot.
///
/// # Safety
/// `pilot` must be a pointer returned by `hp_pilot_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn hp_pilot_free(pilot: *mut HpPilot) {
    if !pilot.is_null() {
        drop(Box::from_raw(pilot));
    }
}

/// Dispatch one JSON message from the tracking service.
///
/// Writes up to `max` commands into `out` and returns how many commands the
/// frame produced (which may exceed `max`). Non-frame messages return 0.
/// Returns -1 on error; the pilot stays usable for the next frame.
///
/// # Safety
/// `pilot` must be a valid pilot pointer, `json` a null-terminated string,
/// and `out` an array of at least `max` elements (or null).
#[no_mangle]
pub unsafe extern "C" fn hp_pilot_push_json(
    pilot: *mut HpPilot,
    json: *const c_char,
    out: *mut HpCommand,
    max: c_int,
) -> c_int {
    if pilot.is_null() || json.is_null() {
        return -1;
    }
    let pilot = &mut *pilot;

    let text = match CStr::from_ptr(json).to_str() {
        Ok(t) => t,
        Err(_) => {
            set_last_error(&PilotError::missing("UTF-8 frame text"));
            return -1;
        }
    };

    let result = protocol::decode_message(text).and_then(|frame| match frame {
        Some(frame) => pilot.0.on_frame(frame),
        None => Ok(Vec::new()),
    });
    // The recording sink only mirrors what on_frame already returned.
    pilot.0.sink_mut().drain();

    match result {
        Ok(commands) => {
            if !out.is_null() && max > 0 {
                for (i, cmd) in commands.iter().take(max as usize).enumerate() {
                    out.add(i).write(HpCommand::from(cmd));
                }
            }
            LAST_ERROR.with(LastError::clear);
            commands.len() as c_int
        }
        Err(e) => {
            set_last_error(&e);
            -1
        }
    }
}

/// Current flight state: 0 = landed, 1 = confirming takeoff, 2 = flying,
/// 3 = confirming landing, -1 for a null pilot.
///
/// # Safety
/// `pilot` must be a valid pilot pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn hp_pilot_state(pilot: *const HpPilot) -> c_int {
    if pilot.is_null() {
        return -1;
    }
    match (*pilot).0.state() {
        FlightState::Landed => 0,
        FlightState::TakeoffConfirming { .. } => 1,
        FlightState::Flying => 2,
        FlightState::LandConfirming { .. } => 3,
    }
}

/// Get the last error message. Returns NULL if the last call succeeded.
/// The returned pointer is valid until the next handpilot API call.
#[no_mangle]
pub extern "C" fn hp_last_error() -> *const c_char {
    LAST_ERROR.with(LastError::as_ptr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const CIRCLE_CW: &str = r#"{"id":1,"timestamp":10,"hands":[],"pointables":[],
        "gestures":[{"type":"circle","state":"stop","radius":60.0,"normal":[0,0,-1]}]}"#;

    fn push(pilot: *mut HpPilot, json: &str, out: &mut [HpCommand]) -> c_int {
        let json = CString::new(json).unwrap();
        unsafe { hp_pilot_push_json(pilot, json.as_ptr(), out.as_mut_ptr(), out.len() as c_int) }
    }

    fn blank() -> HpCommand {
        HpCommand::from(&Command::Hover)
    }

    #[test]
    fn takeoff_through_c_api() {
        let pilot = unsafe { hp_pilot_new(std::ptr::null()) };
        assert!(!pilot.is_null());
        let mut out = [blank(); 4];

        assert_eq!(push(pilot, CIRCLE_CW, &mut out), 1);
        assert_eq!(out[0].kind, HpCommandKind::Hover);
        assert_eq!(unsafe { hp_pilot_state(pilot) }, 1);

        assert_eq!(push(pilot, CIRCLE_CW, &mut out), 2);
        assert_eq!(out[0].kind, HpCommandKind::Takeoff);
        assert_eq!(out[1].kind, HpCommandKind::Hover);
        assert_eq!(unsafe { hp_pilot_state(pilot) }, 2);

        unsafe { hp_pilot_free(pilot) };
    }

    #[test]
    fn handshake_and_errors() {
        let pilot = unsafe { hp_pilot_new(std::ptr::null()) };
        let mut out = [blank(); 2];
        assert_eq!(push(pilot, r#"{"serviceVersion":"2.3.1","version":6}"#, &mut out), 0);
        assert_eq!(push(pilot, "{broken", &mut out), -1);
        assert!(!hp_last_error().is_null());
        unsafe { hp_pilot_free(pilot) };
    }

    #[test]
    fn invalid_config_returns_null() {
        let mut cfg = hp_config_default();
        cfg.takeoff_confirmations = 0;
        let pilot = unsafe { hp_pilot_new(&cfg) };
        assert!(pilot.is_null());
        assert_eq!(unsafe { hp_pilot_state(pilot) }, -1);
    }

    #[test]
    fn move_command_layout() {
        let c = HpCommand::from(&Command::Move {
            axis: Axis::Longitudinal,
            direction: Direction::Negative,
            speed: 0.3,
        });
        assert_eq!(c.kind, HpCommandKind::Move);
        assert_eq!(c.axis, 2);
        assert_eq!(c.direction, -1);
        assert_eq!(c.speed, 0.3);
    }
}
